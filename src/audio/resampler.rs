use crate::{Result, SaysoError};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const CHUNK_FRAMES: usize = 1024;

/// Mono resampler that accepts arbitrarily sized chunks
///
/// Input is buffered until a full resampler chunk is available, so output
/// lags input by at most one chunk.
pub struct StreamResampler {
    resampler: Option<SincFixedIn<f32>>,
    pending: Vec<f32>,
}

impl StreamResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(SaysoError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        if input_rate == output_rate {
            return Ok(Self {
                resampler: None,
                pending: Vec::new(),
            });
        }

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let resampler = SincFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            2.0,
            params,
            CHUNK_FRAMES,
            1,
        )
        .map_err(|e| SaysoError::AudioProcessingError(format!("Failed to create resampler: {}", e)))?;

        debug!("Created resampler: {} Hz -> {} Hz", input_rate, output_rate);

        Ok(Self {
            resampler: Some(resampler),
            pending: Vec::with_capacity(CHUNK_FRAMES * 2),
        })
    }

    /// Feed samples in, get whatever output is ready
    pub fn push(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(input.to_vec());
        };

        self.pending.extend_from_slice(input);
        let mut output = Vec::new();

        while self.pending.len() >= CHUNK_FRAMES {
            let chunk: Vec<f32> = self.pending.drain(..CHUNK_FRAMES).collect();
            let processed = resampler
                .process(&[chunk], None)
                .map_err(|e| SaysoError::AudioProcessingError(format!("Resampling failed: {}", e)))?;
            if let Some(channel) = processed.into_iter().next() {
                output.extend(channel);
            }
        }

        Ok(output)
    }
}
