use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Excitation {
    /// Single-sample strike
    Impulse,
    /// Decaying noise burst
    Noise,
    /// Sustained bow pressure
    Bow,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Output WAV path
    #[arg(value_name = "OUT_WAV")]
    pub output: PathBuf,

    /// Path to config TOML
    #[arg(long, default_value = "resonare.toml")]
    pub config: String,

    /// Excitation source
    #[arg(long, value_enum, default_value_t = Excitation::Impulse)]
    pub excitation: Excitation,

    /// Excitation strength (impulse energy, noise level or bow pressure)
    #[arg(long, default_value_t = 1.0)]
    pub strength: f32,

    /// Seed for the noise exciter
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Render length in seconds (overrides config)
    #[arg(long)]
    pub duration: Option<f32>,

    /// Base frequency in Hz (overrides config)
    #[arg(long)]
    pub frequency: Option<f32>,

    /// Geometry 0..1 (overrides config)
    #[arg(long)]
    pub geometry: Option<f32>,

    /// Brightness 0..1 (overrides config)
    #[arg(long)]
    pub brightness: Option<f32>,

    /// Damping 0..1 (overrides config)
    #[arg(long)]
    pub damping: Option<f32>,

    /// Pickup position 0..1 (overrides config)
    #[arg(long)]
    pub position: Option<f32>,

    /// Number of modes 1..64 (overrides config)
    #[arg(long)]
    pub resolution: Option<usize>,
}
