use crate::{Result, SaysoError};
use tracing::info;
use voice_activity_detector::VoiceActivityDetector as VadDetector;

/// Samples per VAD decision at 16kHz (32ms)
pub const VAD_CHUNK: usize = 512;

/// Voice Activity Detection using Silero VAD
pub struct VoiceActivityDetector {
    detector: VadDetector,
    threshold: f32,
}

impl VoiceActivityDetector {
    /// Create a 16kHz detector
    ///
    /// # Arguments
    /// * `threshold` - Probability threshold for speech detection (0.0-1.0)
    pub fn new(threshold: f32) -> Result<Self> {
        let detector = VadDetector::builder()
            .sample_rate(16000)
            .chunk_size(VAD_CHUNK)
            .build()
            .map_err(|e| {
                SaysoError::AudioProcessingError(format!("Failed to create VAD: {:?}", e))
            })?;

        info!("Initialized VAD with threshold: {}", threshold);

        Ok(Self {
            detector,
            threshold: threshold.clamp(0.0, 1.0),
        })
    }

    /// Detect if a 512-sample chunk contains speech
    pub fn is_speech(&mut self, audio: &[f32]) -> bool {
        self.detector.predict(audio.iter().copied()) >= self.threshold
    }

    /// Reset the session state between listens
    pub fn reset(&mut self) {
        self.detector.reset();
    }
}
