//! Text-to-speech with sherpa-rs (VITS models)
//!
//! The VITS engine lives on its own worker thread; `VitsSynthesizer` hands it
//! text and waits until the audio has finished playing.

use crate::integration::config::SpeechConfig;
use crate::speech::responder::{normalize_for_speech, SpeechSynthesizer};
use crate::{Result, SaysoError};
use crossbeam_channel::{bounded, Sender};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::path::Path;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// TTS engine wrapping sherpa-rs VitsTts
pub struct TTSEngine {
    tts: VitsTts,
    speaker_id: i32,
}

impl TTSEngine {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let model_path = config
            .model_path
            .as_deref()
            .ok_or_else(|| SaysoError::ConfigError("TTS model path is required".into()))?;
        let tokens_path = config
            .tokens_path
            .as_deref()
            .ok_or_else(|| SaysoError::ConfigError("TTS tokens path is required".into()))?;

        if !Path::new(model_path).exists() {
            return Err(SaysoError::ModelLoadError(format!(
                "TTS model not found: {}",
                model_path
            )));
        }
        if !Path::new(tokens_path).exists() {
            return Err(SaysoError::ModelLoadError(format!(
                "Tokens file not found: {}",
                tokens_path
            )));
        }

        info!("Loading VITS TTS model from: {}", model_path);

        let vits_config = VitsTtsConfig {
            model: model_path.to_string(),
            tokens: tokens_path.to_string(),
            length_scale: config.length_scale,
            ..Default::default()
        };

        let tts = VitsTts::new(vits_config);

        info!("TTS engine initialized successfully");

        Ok(Self {
            tts,
            speaker_id: config.speaker_id,
        })
    }

    /// Synthesize text to mono samples and their sample rate
    pub fn synthesize(&mut self, text: &str) -> Result<(Vec<f32>, u32)> {
        let normalized = normalize_for_speech(text);
        if normalized.is_empty() {
            return Ok((Vec::new(), 0));
        }

        debug!("Synthesizing: {}", normalized);

        let audio = self
            .tts
            .create(&normalized, self.speaker_id, 1.0)
            .map_err(|e| SaysoError::TTSError(format!("Synthesis failed: {}", e)))?;

        Ok((audio.samples, audio.sample_rate as u32))
    }
}

enum SpeechCommand {
    Speak {
        text: String,
        done: Sender<Result<()>>,
    },
    Shutdown,
}

/// Speaks through a VITS engine running on a dedicated thread
pub struct VitsSynthesizer {
    command_tx: Sender<SpeechCommand>,
    worker: Option<JoinHandle<()>>,
}

impl VitsSynthesizer {
    /// Load the model on a worker thread and wait until it is ready
    pub fn start(config: SpeechConfig) -> Result<Self> {
        let (command_tx, command_rx) = bounded::<SpeechCommand>(16);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let worker = thread::Builder::new()
            .name("tts-worker".to_string())
            .spawn(move || {
                let mut engine = match TTSEngine::new(&config) {
                    Ok(engine) => {
                        let _ = ready_tx.send(Ok(()));
                        engine
                    }
                    Err(e) => {
                        error!("Failed to initialize TTS engine: {}", e);
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                loop {
                    match command_rx.recv() {
                        Ok(SpeechCommand::Speak { text, done }) => {
                            let result = engine
                                .synthesize(&text)
                                .and_then(|(samples, sample_rate)| play(samples, sample_rate));
                            if let Err(e) = &result {
                                warn!("TTS failed: {}", e);
                            }
                            let _ = done.send(result);
                        }
                        Ok(SpeechCommand::Shutdown) => {
                            info!("TTS worker shutting down");
                            break;
                        }
                        Err(e) => {
                            error!("TTS command channel error: {}", e);
                            break;
                        }
                    }
                }
            })?;

        ready_rx
            .recv()
            .map_err(|e| SaysoError::ChannelError(format!("TTS worker exited early: {}", e)))??;

        Ok(Self {
            command_tx,
            worker: Some(worker),
        })
    }
}

impl SpeechSynthesizer for VitsSynthesizer {
    fn speak(&mut self, text: &str) -> Result<()> {
        let (done_tx, done_rx) = bounded(1);
        self.command_tx
            .send(SpeechCommand::Speak {
                text: text.to_string(),
                done: done_tx,
            })
            .map_err(|e| SaysoError::ChannelError(format!("Failed to send to TTS worker: {}", e)))?;

        done_rx
            .recv()
            .map_err(|e| SaysoError::ChannelError(format!("TTS worker dropped request: {}", e)))?
    }
}

impl Drop for VitsSynthesizer {
    fn drop(&mut self) {
        let _ = self.command_tx.send(SpeechCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Play mono samples on the default output device, blocking until done
fn play(samples: Vec<f32>, sample_rate: u32) -> Result<()> {
    if samples.is_empty() || sample_rate == 0 {
        return Ok(());
    }

    let (_stream, handle) = OutputStream::try_default()
        .map_err(|e| SaysoError::AudioDeviceError(format!("No output device: {}", e)))?;
    let sink = Sink::try_new(&handle)
        .map_err(|e| SaysoError::AudioDeviceError(format!("Failed to open sink: {}", e)))?;

    sink.append(SamplesBuffer::new(1, sample_rate, samples));
    sink.sleep_until_end();
    Ok(())
}
