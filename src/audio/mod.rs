//! Microphone capture and audio conditioning for the speech recognizer
//!
//! Only compiled with the `voice` feature.

pub mod input;
pub mod resampler;
pub mod vad;

pub use input::MicrophoneCapture;
pub use resampler::StreamResampler;
pub use vad::VoiceActivityDetector;

/// Sample rate expected by Whisper and the VAD
pub const SPEECH_SAMPLE_RATE: u32 = 16000;
