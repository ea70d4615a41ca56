//! Engine context: sample rate and the constants derived from it (Hz, sec).

use crate::synth::SynthError;

/// Largest block the resonator will render in one `process` call.
pub const MAX_BLOCK_SIZE: usize = 4096;

/// Default rate of the stereo-image LFO, in Hz.
pub const DEFAULT_MODULATION_HZ: f32 = 0.5;

/// Sample-rate dependent values shared by every component of one engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineContext {
    sample_rate: f32,
    inv_sample_rate: f32,
}

impl EngineContext {
    pub fn new(sample_rate: f32) -> Result<Self, SynthError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SynthError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            sample_rate,
            inv_sample_rate: 1.0 / sample_rate,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Reciprocal of the sample rate.
    pub fn inv_sample_rate(&self) -> f32 {
        self.inv_sample_rate
    }

    /// Convert Hz to cycles/sample.
    pub fn normalize(&self, hz: f32) -> f32 {
        hz * self.inv_sample_rate
    }

    /// Convert cycles/sample to Hz.
    pub fn to_hz(&self, normalized: f32) -> f32 {
        normalized * self.sample_rate
    }

    /// Validate a caller-chosen block size.
    pub fn check_block_size(&self, size: usize) -> Result<usize, SynthError> {
        if size == 0 || size > MAX_BLOCK_SIZE {
            return Err(SynthError::InvalidBlockSize {
                requested: size,
                max: MAX_BLOCK_SIZE,
            });
        }
        Ok(size)
    }
}
