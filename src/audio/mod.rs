//! Output-side helpers: divergence monitoring and WAV rendering.

pub mod guard;
pub mod writer;
