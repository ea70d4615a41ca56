//! Modal + banded-waveguide resonator for physically modeled plates, strings
//! and bars.

pub mod audio;
pub mod cli;
pub mod config;
pub mod excite;
pub mod synth;

pub use synth::SynthError;
pub use synth::context::EngineContext;
pub use synth::modes::ResonatorParameters;
pub use synth::resonator::Resonator;
