//! Offline speech-to-text with Whisper
//!
//! `MicrophoneRecognizer` records one phrase from the default microphone,
//! using Silero VAD to find where speech starts and stops, and transcribes it
//! with a local Whisper model.

use crate::audio::vad::VAD_CHUNK;
use crate::audio::{MicrophoneCapture, StreamResampler, VoiceActivityDetector, SPEECH_SAMPLE_RATE};
use crate::integration::config::RecognizerConfig;
use crate::speech::listener::Recognizer;
use crate::{Result, SaysoError};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Shortest phrase worth transcribing, in seconds
const MIN_PHRASE_SECS: f32 = 0.3;

/// Longest phrase before transcription is forced, in seconds
const MAX_PHRASE_SECS: f32 = 20.0;

/// Whisper speech-to-text engine
pub struct WhisperEngine {
    context: WhisperContext,
    language: String,
    n_threads: i32,
}

impl WhisperEngine {
    pub fn new(model_path: &Path, language: &str, n_threads: i32) -> Result<Self> {
        info!("Loading Whisper model from: {:?}", model_path);

        if !model_path.exists() {
            return Err(SaysoError::ModelLoadError(format!(
                "Model file not found: {:?}",
                model_path
            )));
        }

        let context = WhisperContext::new_with_params(
            model_path
                .to_str()
                .ok_or_else(|| SaysoError::ModelLoadError("Invalid model path".to_string()))?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| SaysoError::ModelLoadError(format!("Failed to load Whisper model: {:?}", e)))?;

        info!("Whisper model loaded successfully");

        Ok(Self {
            context,
            language: language.to_string(),
            n_threads,
        })
    }

    /// Transcribe 16kHz mono samples
    pub fn transcribe(&self, samples: &[f32]) -> Result<String> {
        if samples.is_empty() {
            return Err(SaysoError::TranscriptionError("Empty audio segment".to_string()));
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.n_threads);
        params.set_translate(false);
        params.set_print_timestamps(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_language(Some(&self.language));

        let mut state = self.context.create_state().map_err(|e| {
            SaysoError::TranscriptionError(format!("Failed to create state: {:?}", e))
        })?;

        state
            .full(params, samples)
            .map_err(|e| SaysoError::TranscriptionError(format!("Transcription failed: {:?}", e)))?;

        let num_segments = state.full_n_segments().map_err(|e| {
            SaysoError::TranscriptionError(format!("Failed to get segments: {:?}", e))
        })?;

        let mut text = String::new();
        for i in 0..num_segments {
            let segment_text = state.full_get_segment_text(i).map_err(|e| {
                SaysoError::TranscriptionError(format!("Failed to get segment text: {:?}", e))
            })?;
            text.push_str(&segment_text);
        }

        let text = strip_non_speech(&text);
        debug!("Transcription result: '{}'", text);
        Ok(text)
    }
}

/// Drop Whisper's bracketed annotations such as `[BLANK_AUDIO]` or `(wind)`
fn strip_non_speech(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => result.push(c),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a stream of VAD-labelled chunks into one phrase
struct PhraseSegmenter {
    buffer: Vec<f32>,
    in_speech: bool,
    silence: f32,
    silence_threshold: f32,
}

impl PhraseSegmenter {
    fn new(silence_threshold: f32) -> Self {
        Self {
            buffer: Vec::new(),
            in_speech: false,
            silence: 0.0,
            silence_threshold,
        }
    }

    /// Returns the finished phrase once trailing silence is long enough
    fn push(&mut self, chunk: &[f32], is_speech: bool) -> Option<Vec<f32>> {
        let chunk_secs = chunk.len() as f32 / SPEECH_SAMPLE_RATE as f32;

        if is_speech {
            self.in_speech = true;
            self.silence = 0.0;
            self.buffer.extend_from_slice(chunk);
        } else if self.in_speech {
            self.buffer.extend_from_slice(chunk);
            self.silence += chunk_secs;

            if self.silence >= self.silence_threshold {
                if self.duration() >= MIN_PHRASE_SECS + self.silence {
                    return Some(std::mem::take(&mut self.buffer));
                }
                debug!("Phrase too short ({:.2}s), discarding", self.duration());
                self.buffer.clear();
                self.in_speech = false;
                self.silence = 0.0;
            }
        }

        if self.duration() >= MAX_PHRASE_SECS {
            debug!("Maximum phrase duration reached");
            return Some(std::mem::take(&mut self.buffer));
        }

        None
    }

    fn in_speech(&self) -> bool {
        self.in_speech
    }

    fn duration(&self) -> f32 {
        self.buffer.len() as f32 / SPEECH_SAMPLE_RATE as f32
    }
}

/// Listens on the default microphone until one phrase is heard
pub struct MicrophoneRecognizer {
    engine: WhisperEngine,
    vad: VoiceActivityDetector,
    timeout: Duration,
    silence_secs: f32,
}

impl MicrophoneRecognizer {
    pub fn new(config: &RecognizerConfig) -> Result<Self> {
        let engine = WhisperEngine::new(&config.model_path, &config.language, config.n_threads)?;
        let vad = VoiceActivityDetector::new(config.vad_threshold)?;

        Ok(Self {
            engine,
            vad,
            timeout: Duration::from_secs(config.listen_timeout_secs),
            silence_secs: config.silence_secs,
        })
    }

    fn capture_phrase(&mut self) -> Result<Option<Vec<f32>>> {
        let (audio_tx, audio_rx) = bounded::<Vec<f32>>(512);
        let mut capture = MicrophoneCapture::new()?;
        let mut resampler = StreamResampler::new(capture.sample_rate(), SPEECH_SAMPLE_RATE)?;
        capture.start(audio_tx)?;

        self.vad.reset();
        let mut segmenter = PhraseSegmenter::new(self.silence_secs);
        let mut pending: Vec<f32> = Vec::with_capacity(VAD_CHUNK * 4);
        let deadline = Instant::now() + self.timeout;

        loop {
            // The timeout only bounds the wait for speech to begin
            if !segmenter.in_speech() && Instant::now() >= deadline {
                return Ok(None);
            }

            let samples = match audio_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(samples) => samples,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(SaysoError::AudioDeviceError(
                        "Microphone stream closed".to_string(),
                    ));
                }
            };

            pending.extend(resampler.push(&samples)?);

            while pending.len() >= VAD_CHUNK {
                let chunk: Vec<f32> = pending.drain(..VAD_CHUNK).collect();
                let is_speech = self.vad.is_speech(&chunk);
                if let Some(phrase) = segmenter.push(&chunk, is_speech) {
                    capture.stop();
                    return Ok(Some(phrase));
                }
            }
        }
    }
}

impl Recognizer for MicrophoneRecognizer {
    fn recognize(&mut self) -> Result<Option<String>> {
        let Some(phrase) = self.capture_phrase()? else {
            return Ok(None);
        };

        debug!(
            "Captured phrase: {} samples ({:.2}s)",
            phrase.len(),
            phrase.len() as f32 / SPEECH_SAMPLE_RATE as f32
        );

        let text = self.engine.transcribe(&phrase)?;
        Ok((!text.is_empty()).then_some(text))
    }
}
