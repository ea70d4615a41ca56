//! Per-mode tuning shared by both configuration paths.

use super::{MAX_BOWED_MODES, MAX_MODES};

/// Tuning of one modal filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeParams {
    /// Normalized center frequency, at most `NYQUIST_GUARD`.
    pub frequency: f32,
    /// Resonance of the band-pass.
    pub q: f32,
    /// Output gain.
    pub gain: f32,
}

impl Default for ModeParams {
    fn default() -> Self {
        Self {
            frequency: 0.01,
            q: 1.0,
            gain: 1.0,
        }
    }
}

/// Tuning of one banded waveguide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BowedParams {
    /// Loop delay in samples, `1..=MAX_DELAY`.
    pub delay: usize,
    /// Resonance of the loop band-pass.
    pub q: f32,
}

impl Default for BowedParams {
    fn default() -> Self {
        Self { delay: 100, q: 1.0 }
    }
}

/// Output of the coefficient computer for one configuration.
#[derive(Debug, Clone)]
pub struct ModeTable {
    pub modes: [ModeParams; MAX_MODES],
    pub bowed: [BowedParams; MAX_BOWED_MODES],
    /// Entries written by the last configuration (`min(resolution, MAX_MODES)`).
    pub configured: usize,
    /// Leading modes below the Nyquist guard: the ones that get rendered.
    pub num_modes: usize,
    /// Bit `i` set when mode `i` was rewritten by the last configuration.
    pub dirty: u64,
}

impl Default for ModeTable {
    fn default() -> Self {
        Self {
            modes: [ModeParams::default(); MAX_MODES],
            bowed: [BowedParams::default(); MAX_BOWED_MODES],
            configured: 0,
            num_modes: 0,
            dirty: 0,
        }
    }
}

impl ModeTable {
    /// Whether mode `i` was rewritten by the last configuration.
    #[inline]
    pub fn is_dirty(&self, i: usize) -> bool {
        i < MAX_MODES && self.dirty & (1u64 << i) != 0
    }

    /// Number of waveguides that get rendered.
    #[inline]
    pub fn num_bowed(&self) -> usize {
        self.num_modes.min(MAX_BOWED_MODES)
    }

    /// Active mode frequencies.
    pub fn frequencies(&self) -> impl Iterator<Item = f32> + '_ {
        self.modes[..self.num_modes].iter().map(|m| m.frequency)
    }
}
