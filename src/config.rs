use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::audio::guard::GuardParams;
use crate::synth::modes::ResonatorParameters;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    #[serde(default = "AudioConfig::default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "AudioConfig::default_block_size")]
    pub block_size: usize,
    #[serde(default = "AudioConfig::default_duration_sec")]
    pub duration_sec: f32,
    #[serde(default = "AudioConfig::default_output_gain")]
    pub output_gain: f32,
}

impl AudioConfig {
    fn default_sample_rate() -> u32 {
        48_000
    }
    fn default_block_size() -> usize {
        256
    }
    fn default_duration_sec() -> f32 {
        4.0
    }
    fn default_output_gain() -> f32 {
        1.0
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: Self::default_sample_rate(),
            block_size: Self::default_block_size(),
            duration_sec: Self::default_duration_sec(),
            output_gain: Self::default_output_gain(),
        }
    }
}

/// Macro-parameters in user units (Hz instead of cycles/sample).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResonatorConfig {
    #[serde(default = "ResonatorConfig::default_frequency_hz")]
    pub frequency_hz: f32,
    #[serde(default = "ResonatorConfig::default_geometry")]
    pub geometry: f32,
    #[serde(default = "ResonatorConfig::default_brightness")]
    pub brightness: f32,
    #[serde(default = "ResonatorConfig::default_damping")]
    pub damping: f32,
    #[serde(default = "ResonatorConfig::default_position")]
    pub position: f32,
    #[serde(default = "ResonatorConfig::default_resolution")]
    pub resolution: usize,
    #[serde(default = "ResonatorConfig::default_modulation_hz")]
    pub modulation_hz: f32,
    #[serde(default)]
    pub staggered_refresh: bool,
}

impl ResonatorConfig {
    fn default_frequency_hz() -> f32 {
        220.0
    }
    fn default_geometry() -> f32 {
        ResonatorParameters::default().geometry
    }
    fn default_brightness() -> f32 {
        ResonatorParameters::default().brightness
    }
    fn default_damping() -> f32 {
        ResonatorParameters::default().damping
    }
    fn default_position() -> f32 {
        ResonatorParameters::default().position
    }
    fn default_resolution() -> usize {
        ResonatorParameters::default().resolution
    }
    fn default_modulation_hz() -> f32 {
        crate::synth::context::DEFAULT_MODULATION_HZ
    }

    /// Macro-parameters at `sample_rate`.
    pub fn parameters(&self, sample_rate: f32) -> ResonatorParameters {
        ResonatorParameters {
            frequency: self.frequency_hz / sample_rate,
            geometry: self.geometry,
            brightness: self.brightness,
            damping: self.damping,
            position: self.position,
            resolution: self.resolution,
        }
        .clamped()
    }
}

impl Default for ResonatorConfig {
    fn default() -> Self {
        Self {
            frequency_hz: Self::default_frequency_hz(),
            geometry: Self::default_geometry(),
            brightness: Self::default_brightness(),
            damping: Self::default_damping(),
            position: Self::default_position(),
            resolution: Self::default_resolution(),
            modulation_hz: Self::default_modulation_hz(),
            staggered_refresh: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuardConfig {
    #[serde(default = "GuardConfig::default_energy_ceiling")]
    pub energy_ceiling: f32,
    #[serde(default = "GuardConfig::default_leak")]
    pub leak: f32,
}

impl GuardConfig {
    fn default_energy_ceiling() -> f32 {
        GuardParams::default().energy_ceiling
    }
    fn default_leak() -> f32 {
        GuardParams::default().leak
    }

    pub fn params(&self) -> GuardParams {
        GuardParams {
            energy_ceiling: self.energy_ceiling,
            leak: self.leak,
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            energy_ceiling: Self::default_energy_ceiling(),
            leak: Self::default_leak(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RenderConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub resonator: ResonatorConfig,
    #[serde(default)]
    pub guard: GuardConfig,
}

impl RenderConfig {
    fn round_f32(x: f32) -> f32 {
        (x * 1_000_000.0).round() / 1_000_000.0
    }

    fn format_f32_compact(x: f32) -> String {
        let mut s = format!("{:.6}", x);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() { "0".to_string() } else { s }
    }

    fn rounded(mut self) -> Self {
        let r = &mut self.resonator;
        r.geometry = Self::round_f32(r.geometry);
        r.brightness = Self::round_f32(r.brightness);
        r.damping = Self::round_f32(r.damping);
        r.position = Self::round_f32(r.position);
        self.guard.leak = Self::round_f32(self.guard.leak);
        self
    }

    /// Render the defaults as TOML with every value commented out.
    fn commented_defaults(cfg: &Self) -> Option<String> {
        let text = toml::to_string_pretty(cfg).ok()?;
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
            } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                commented.push_str(line);
                commented.push('\n');
            } else {
                let mut out_line = line.to_string();
                if let Some((lhs, rhs)) = line.split_once('=') {
                    let rhs_trim = rhs.trim();
                    let has_decimal = rhs_trim.contains('.');
                    if (has_decimal || rhs_trim.contains('e') || rhs_trim.contains('E'))
                        && !rhs_trim.contains('"')
                        && rhs_trim != "true"
                        && rhs_trim != "false"
                    {
                        if let Ok(val) = rhs_trim.parse::<f32>() {
                            let mut formatted = Self::format_f32_compact(val);
                            if has_decimal && !formatted.contains('.') {
                                formatted.push_str(".0");
                            }
                            out_line = format!("{} = {}", lhs.trim(), formatted);
                        }
                    }
                }
                commented.push_str("# ");
                commented.push_str(&out_line);
                commented.push('\n');
            }
        }
        Some(commented)
    }

    /// Read `path`; on a read or parse failure fall back to defaults. A
    /// missing file is created with the defaults commented out.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!(path, %err, "failed to parse config; using defaults");
                    }
                },
                Err(err) => {
                    warn!(path, %err, "failed to read config; using defaults");
                }
            }
            return Self::default();
        }

        let default_cfg = Self::default().rounded();
        match Self::commented_defaults(&default_cfg) {
            Some(commented) => {
                if let Err(err) = fs::write(path_obj, commented) {
                    warn!(path, %err, "failed to write default config");
                }
            }
            None => warn!("failed to serialize default config; continuing with defaults"),
        }
        default_cfg
    }
}
