//! Microphone audio capture
//!
//! Captures the default input device with cpal, downmixes to mono and sends
//! sample chunks through a crossbeam channel.

use crate::{Result, SaysoError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use tracing::{debug, error, info, warn};

pub struct MicrophoneCapture {
    stream: Option<Stream>,
    device: Device,
    config: StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl MicrophoneCapture {
    /// Open the default input device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| SaysoError::AudioDeviceError("No input device available".into()))?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        debug!("Using input device: {}", device_name);

        let supported_config = device.default_input_config().map_err(|e| {
            SaysoError::AudioDeviceError(format!("Failed to get input config: {}", e))
        })?;

        let config: StreamConfig = supported_config.into();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;

        Ok(Self {
            stream: None,
            device,
            config,
            sample_rate,
            channels,
        })
    }

    /// Start streaming mono chunks into `audio_tx`
    pub fn start(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
        if self.stream.is_some() {
            warn!("Microphone already capturing, ignoring start request");
            return Ok(());
        }

        let channels = self.channels as usize;
        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let samples = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    // A full channel means the listener stopped reading; drop the chunk
                    let _ = audio_tx.try_send(samples);
                },
                err_fn,
                None,
            )
            .map_err(|e| SaysoError::AudioDeviceError(format!("Failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| SaysoError::AudioDeviceError(format!("Failed to start input stream: {}", e)))?;

        info!(
            "Microphone capture started: {}Hz, {} channel(s)",
            self.sample_rate, self.channels
        );
        self.stream = Some(stream);
        Ok(())
    }

    /// Stop capturing; dropping the stream closes the device
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            debug!("Microphone capture stopped");
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for MicrophoneCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
