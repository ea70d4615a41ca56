//! Caller-facing macro-parameters, read once per block.

use serde::{Deserialize, Serialize};

use super::{MAX_MODES, NYQUIST_GUARD};
use crate::synth::util::clamp_finite;

/// Lowest normalized base frequency accepted (about 0.05 Hz at 48 kHz).
pub const MIN_FREQUENCY: f32 = 1.0e-6;

/// Macro-parameters of one resonator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonatorParameters {
    /// Base frequency in cycles/sample.
    pub frequency: f32,
    /// Inharmonicity: 0 = harmonic string, 1 = bell/plate.
    pub geometry: f32,
    /// Spectral tilt: higher keeps upper partials resonant.
    pub brightness: f32,
    /// Resonance: 0 = dead, 1 = long ring.
    pub damping: f32,
    /// Pickup position along the object.
    pub position: f32,
    /// Requested mode count.
    pub resolution: usize,
}

impl Default for ResonatorParameters {
    fn default() -> Self {
        Self {
            frequency: 220.0 / 48_000.0,
            geometry: 0.25,
            brightness: 0.5,
            damping: 0.3,
            position: 0.999,
            resolution: MAX_MODES,
        }
    }
}

impl ResonatorParameters {
    /// Every field forced into its documented range; NaN falls back to the default.
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        Self {
            frequency: clamp_finite(self.frequency, MIN_FREQUENCY, NYQUIST_GUARD, d.frequency),
            geometry: clamp_finite(self.geometry, 0.0, 1.0, d.geometry),
            brightness: clamp_finite(self.brightness, 0.0, 1.0, d.brightness),
            damping: clamp_finite(self.damping, 0.0, 1.0, d.damping),
            position: clamp_finite(self.position, 0.0, 1.0, d.position),
            resolution: self.resolution.clamp(1, MAX_MODES),
        }
    }
}
