//! Turning the user's voice (or keyboard) into one normalized utterance
//!
//! A listen asks the recognizer for speech; if nothing usable comes back the
//! user is asked to type instead. Typed text is treated exactly like speech.

use crate::speech::responder::Responder;
use crate::{Result, SaysoError};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, warn};

/// One-shot speech recognition
pub trait Recognizer {
    /// Capture and transcribe one phrase
    ///
    /// `Ok(None)` means nothing was heard before the recognizer gave up.
    fn recognize(&mut self) -> Result<Option<String>>;
}

/// Line-oriented text input
pub trait TextInput {
    /// Show `prompt` and read one line; end of input is `SaysoError::InputClosed`
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Reads lines from stdin
#[derive(Debug, Default)]
pub struct KeyboardInput;

impl TextInput for KeyboardInput {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;
        drop(stdout);

        read_lossy_line(&mut std::io::stdin().lock())
    }
}

/// Read one line, replacing invalid UTF-8 instead of failing on it
fn read_lossy_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut bytes = Vec::new();
    if reader.read_until(b'\n', &mut bytes)? == 0 {
        return Err(SaysoError::InputClosed);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub struct Listener {
    recognizer: Option<Box<dyn Recognizer>>,
    keyboard: Box<dyn TextInput>,
    responder: Arc<dyn Responder>,
}

impl Listener {
    /// Create a listener; without a recognizer every listen is typed
    pub fn new(
        recognizer: Option<Box<dyn Recognizer>>,
        keyboard: Box<dyn TextInput>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            recognizer,
            keyboard,
            responder,
        }
    }

    /// Produce one normalized utterance, possibly empty
    pub fn listen(&mut self) -> Result<String> {
        if let Some(recognizer) = self.recognizer.as_mut() {
            self.responder.say("Listening now.");

            match recognizer.recognize() {
                Ok(Some(text)) => {
                    let utterance = normalize_utterance(&text);
                    if !utterance.is_empty() {
                        println!("You said: {}", utterance);
                        return Ok(utterance);
                    }
                    debug!("Recognizer returned no words");
                }
                Ok(None) => debug!("No speech before timeout"),
                Err(e) => warn!("Microphone / recognizer error: {}", e),
            }

            self.responder
                .say("I couldn't hear clearly. Please type your command:");
        }

        let typed = self.keyboard.read_line("Type your command: ")?;
        Ok(normalize_utterance(&typed))
    }

    /// Read free text from the keyboard, trimmed but not lowercased
    pub fn read_text(&mut self, prompt: &str) -> Result<String> {
        Ok(self.keyboard.read_line(prompt)?.trim().to_string())
    }
}

/// Lowercase, collapse whitespace, and drop punctuation at either end
///
/// Recognizers like to end sentences with a period, which would otherwise
/// break exact custom command matches.
pub fn normalize_utterance(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '\''))
        .to_lowercase()
}
