//! Sayso - an offline voice command dispatcher
//!
//! Listens for a spoken (or typed) phrase, matches it against a fixed,
//! ordered set of intents plus user-defined custom commands, and performs
//! the matching action: speaking a reply, sending an email, scheduling a
//! reminder or persisting a new custom command.

#[cfg(feature = "voice")]
pub mod audio;
pub mod commands;
pub mod dispatch;
pub mod integration;
pub mod reminders;
pub mod services;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SaysoError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("Transcription error: {0}")]
    TranscriptionError(String),

    #[error("TTS error: {0}")]
    TTSError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Scheduler error: {0}")]
    SchedulerError(String),

    #[error("Input closed")]
    InputClosed,
}

impl From<std::io::Error> for SaysoError {
    fn from(e: std::io::Error) -> Self {
        SaysoError::IOError(e.to_string())
    }
}

impl SaysoError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            SaysoError::AudioDeviceError(_) => false,
            // Model errors require restarting
            SaysoError::ModelLoadError(_) => false,
            // These are typically transient errors
            SaysoError::TranscriptionError(_) => true,
            SaysoError::TTSError(_) => true,
            SaysoError::IOError(_) => true,
            SaysoError::AudioProcessingError(_) => true,
            SaysoError::ConfigError(_) => false,
            SaysoError::ChannelError(_) => false,
            SaysoError::SchedulerError(_) => true,
            // Nobody is left to talk to
            SaysoError::InputClosed => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            SaysoError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            SaysoError::ModelLoadError(_) => {
                "Failed to load the speech model. Please verify model files are present.".to_string()
            }
            SaysoError::TranscriptionError(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            SaysoError::TTSError(_) => {
                "Text-to-speech failed. Responses will be shown as text.".to_string()
            }
            SaysoError::IOError(_) => "File system error occurred.".to_string(),
            SaysoError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            SaysoError::ConfigError(_) => "Configuration error. Please check settings.".to_string(),
            SaysoError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            SaysoError::SchedulerError(_) => "Sorry, I couldn't set that reminder.".to_string(),
            SaysoError::InputClosed => "Input closed. Goodbye.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SaysoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SaysoError = io.into();
        assert!(matches!(err, SaysoError::IOError(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_recoverability() {
        assert!(!SaysoError::ModelLoadError("x".into()).is_recoverable());
        assert!(!SaysoError::InputClosed.is_recoverable());
        assert!(SaysoError::TranscriptionError("x".into()).is_recoverable());
        assert!(SaysoError::SchedulerError("x".into()).is_recoverable());
    }
}
