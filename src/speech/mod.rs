//! Speech input and output
//!
//! This module provides:
//! - `Listener`: one normalized utterance per listen, with typed fallback
//! - `SpeechResponder`: console echo plus optional spoken output
//! - Whisper speech-to-text (feature `voice`)
//! - VITS text-to-speech (feature `speech-out`)

pub mod listener;
pub mod responder;
#[cfg(feature = "voice")]
pub mod stt;
#[cfg(feature = "speech-out")]
pub mod tts;

pub use listener::{normalize_utterance, KeyboardInput, Listener, Recognizer, TextInput};
pub use responder::{normalize_for_speech, Responder, SpeechResponder, SpeechSynthesizer};
#[cfg(feature = "voice")]
pub use stt::MicrophoneRecognizer;
#[cfg(feature = "speech-out")]
pub use tts::VitsSynthesizer;
