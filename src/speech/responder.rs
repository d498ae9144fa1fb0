//! Spoken and printed replies
//!
//! Every reply is echoed to stdout and, when a synthesizer is attached,
//! spoken aloud. The main loop and any number of reminder threads share one
//! responder, so output is serialized behind a mutex.

use crate::Result;
use parking_lot::Mutex;
use std::io::Write;
use tracing::warn;

/// Anything that can deliver a reply to the user
pub trait Responder: Send + Sync {
    fn say(&self, text: &str);
}

/// Turns text into audible speech, blocking until playback ends
pub trait SpeechSynthesizer: Send {
    fn speak(&mut self, text: &str) -> Result<()>;
}

pub struct SpeechResponder {
    synthesizer: Mutex<Option<Box<dyn SpeechSynthesizer>>>,
}

impl SpeechResponder {
    /// Console-only responder
    pub fn console() -> Self {
        Self {
            synthesizer: Mutex::new(None),
        }
    }

    /// Responder that also speaks through `synthesizer`
    pub fn with_synthesizer(synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        Self {
            synthesizer: Mutex::new(Some(synthesizer)),
        }
    }
}

impl Responder for SpeechResponder {
    fn say(&self, text: &str) {
        let mut synthesizer = self.synthesizer.lock();

        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "\nAssistant: {}", text);
        let _ = stdout.flush();
        drop(stdout);

        if let Some(synth) = synthesizer.as_mut() {
            if let Err(e) = synth.speak(text) {
                warn!("Speech output failed: {}", e);
            }
        }
    }
}

/// Rewrite symbols a TTS voice would mangle
pub fn normalize_for_speech(text: &str) -> String {
    let replacements = [
        ("°C", " degrees Celsius"),
        ("°F", " degrees Fahrenheit"),
        ("°", " degrees"),
        ("&", " and "),
        ("%", " percent"),
        ("e.g.", "for example"),
        ("i.e.", "that is"),
    ];

    let mut result = text.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}
