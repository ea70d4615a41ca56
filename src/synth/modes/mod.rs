//! Mode parameters and the coefficient computer (normalized frequency, cycles/sample).

mod coeffs;
mod compile;
mod params;

pub use coeffs::{BowedParams, ModeParams, ModeTable};
pub use compile::{Refresh, StretchSeries, bowed_delay, compute_modes, explicit_modes};
pub use params::ResonatorParameters;

/// Capacity of the modal bank.
pub const MAX_MODES: usize = 64;
/// Number of leading modes that also run as banded waveguides.
pub const MAX_BOWED_MODES: usize = 8;
/// Capacity of each waveguide delay line, in samples.
pub const MAX_DELAY: usize = 1024;
/// Highest normalized frequency a mode may take.
pub const NYQUIST_GUARD: f32 = 0.49;
/// Modes up to this index are refreshed on every configuration call.
pub const ALWAYS_REFRESHED_MODES: usize = 24;
