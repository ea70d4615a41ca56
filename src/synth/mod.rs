//! Resonator synthesis primitives (normalized frequency = cycles/sample).

pub mod context;
pub mod control;
pub mod cosine;
pub mod filter;
pub mod modes;
pub mod resonator;
pub mod snapshot;
pub mod tables;
pub mod util;

use std::fmt;

/// Errors returned by synth primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthError {
    /// Sample rate is non-finite or not positive.
    InvalidSampleRate(f32),
    /// Block size is zero or larger than the renderer supports.
    InvalidBlockSize { requested: usize, max: usize },
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthError::InvalidSampleRate(fs) => write!(f, "invalid sample rate: {fs}"),
            SynthError::InvalidBlockSize { requested, max } => {
                write!(f, "invalid block size {requested} (expected 1..={max})")
            }
        }
    }
}

impl std::error::Error for SynthError {}
