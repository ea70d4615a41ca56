//! Derive per-mode tuning from macro-parameters or from explicit arrays.
//!
//! partial_i = harmonic_i * stretch_i, harmonic_i = (i + 1) * f0,
//! Q_i = 1 + partial_i * q_i, q_{i+1} = q_i * q_loss_i,
//! gain_{i+1} = gain_i * q_loss_i^2.
//!
//! Gain falls faster than Q rises, so the band-pass peak (Q times gain)
//! falls with index.

use super::{
    ALWAYS_REFRESHED_MODES, BowedParams, MAX_BOWED_MODES, MAX_DELAY, MAX_MODES, ModeParams,
    ModeTable, NYQUIST_GUARD, ResonatorParameters,
};
use crate::synth::tables::{FOUR_DECADES, STIFFNESS, TABLE_SIZE};
use crate::synth::util::{clamp_finite, interpolate};

/// Base resonance scaled by the damping table.
const BASE_Q: f32 = 500.0;
/// Resonance slope of the waveguide loop filters.
const BOWED_Q: f32 = 1500.0;
const MIN_Q: f32 = 0.5;
const MAX_Q: f32 = 1.0e7;

/// Which modes a configuration call rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    All,
    /// Modes above `ALWAYS_REFRESHED_MODES` only when their parity matches the clock.
    Staggered(u32),
}

impl Refresh {
    #[inline]
    fn includes(self, i: usize) -> bool {
        match self {
            Refresh::All => true,
            Refresh::Staggered(clock) => {
                i <= ALWAYS_REFRESHED_MODES || (i & 1) == (clock & 1) as usize
            }
        }
    }
}

/// Stretch factor per mode for a given geometry.
///
/// Negative stiffness shrinks by 0.93 per mode so partials never fold below
/// zero; positive stiffness shrinks by 0.98 so the series cannot run away.
#[derive(Debug, Clone, Copy)]
pub struct StretchSeries {
    stretch: f32,
    stiffness: f32,
}

impl StretchSeries {
    pub fn new(geometry: f32) -> Self {
        let geometry = clamp_finite(geometry, 0.0, 1.0, 0.0);
        Self {
            stretch: 1.0,
            stiffness: interpolate(&STIFFNESS[..], geometry, TABLE_SIZE as f32),
        }
    }
}

impl Iterator for StretchSeries {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let current = self.stretch;
        self.stretch += self.stiffness;
        if self.stiffness < 0.0 {
            self.stiffness *= 0.93;
        } else {
            self.stiffness *= 0.98;
        }
        Some(current)
    }
}

/// Waveguide loop length for a mode: one acoustic period, halved until it
/// fits the delay line.
pub fn bowed_delay(frequency: f32) -> usize {
    let period = (1.0 / frequency).round();
    let mut delay = if period.is_finite() && period >= 1.0 {
        period.min(usize::MAX as f32) as usize
    } else if period.is_finite() {
        1
    } else {
        MAX_DELAY
    };
    while delay > MAX_DELAY {
        delay >>= 1;
    }
    delay.max(1)
}

/// Fill `table` from macro-parameters. Returns the active mode count.
pub fn compute_modes(params: &ResonatorParameters, refresh: Refresh, table: &mut ModeTable) -> usize {
    let p = params.clamped();
    let count = p.resolution.min(MAX_MODES);

    let mut q = BASE_Q * interpolate(&FOUR_DECADES[..], p.damping * 0.8, TABLE_SIZE as f32);

    // Very low geometry rings hot; narrow the brightness range there.
    let mut attenuation = 1.0 - p.geometry;
    attenuation *= attenuation;
    attenuation *= attenuation;
    attenuation *= attenuation;
    let brightness = p.brightness * (1.0 - 0.2 * attenuation);
    let mut q_loss = brightness * (2.0 - brightness) * 0.85 + 0.15;
    let q_loss_damping_rate = p.geometry * (2.0 - p.geometry) * 0.1;

    let mut harmonic = p.frequency;
    let mut stretch = StretchSeries::new(p.geometry);
    let mut num_modes = 0;
    let mut guard_hit = false;
    let mut dirty = 0u64;
    let mut gain = 1.0;

    for i in 0..count {
        let stretch_factor = stretch.next().unwrap_or(1.0);
        let mut partial = harmonic * stretch_factor;
        if guard_hit || !(partial < NYQUIST_GUARD) {
            partial = partial.min(NYQUIST_GUARD);
            guard_hit = true;
        } else {
            num_modes = i + 1;
        }

        if refresh.includes(i) {
            table.modes[i] = ModeParams {
                frequency: partial,
                q: (1.0 + partial * q).clamp(MIN_Q, MAX_Q),
                gain,
            };
            if i < MAX_BOWED_MODES {
                table.bowed[i] = BowedParams {
                    delay: bowed_delay(partial),
                    q: 1.0 + partial * BOWED_Q,
                };
            }
            dirty |= 1u64 << i;
        }

        gain *= q_loss * q_loss;
        // Keeps the top partials from decaying too fast.
        q_loss += q_loss_damping_rate * (1.0 - q_loss);
        harmonic += p.frequency;
        q *= q_loss;
    }

    table.configured = count;
    table.num_modes = num_modes;
    table.dirty = dirty;
    num_modes
}

/// Fill `table` from explicit per-mode arrays; the shortest array sets the
/// count. Returns the active mode count.
pub fn explicit_modes(
    frequencies: &[f32],
    qs: &[f32],
    gains: &[f32],
    table: &mut ModeTable,
) -> usize {
    let count = frequencies.len().min(qs.len()).min(gains.len()).min(MAX_MODES);
    let mut num_modes = 0;
    let mut guard_hit = false;
    let mut dirty = 0u64;

    for i in 0..count {
        let mut frequency = clamp_finite(frequencies[i], 0.0, f32::MAX, 0.0);
        if guard_hit || frequency <= 0.0 || frequency >= NYQUIST_GUARD {
            frequency = frequency.min(NYQUIST_GUARD);
            guard_hit = true;
        } else {
            num_modes = i + 1;
        }
        table.modes[i] = ModeParams {
            frequency,
            q: clamp_finite(qs[i], MIN_Q, MAX_Q, MIN_Q),
            gain: clamp_finite(gains[i], f32::MIN, f32::MAX, 0.0),
        };
        if i < MAX_BOWED_MODES {
            table.bowed[i] = BowedParams {
                delay: bowed_delay(frequency),
                q: 1.0 + frequency * BOWED_Q,
            };
        }
        dirty |= 1u64 << i;
    }

    table.configured = count;
    table.num_modes = num_modes;
    table.dirty = dirty;
    num_modes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(frequency: f32, geometry: f32, resolution: usize) -> ResonatorParameters {
        ResonatorParameters {
            frequency,
            geometry,
            resolution,
            ..Default::default()
        }
    }

    #[test]
    fn zero_geometry_keeps_stretch_at_one() {
        for s in StretchSeries::new(0.0).take(MAX_MODES) {
            assert_eq!(s, 1.0);
        }
    }

    #[test]
    fn zero_geometry_gives_harmonic_series() {
        let f0 = 110.0 / 48_000.0;
        let mut table = ModeTable::default();
        let n = compute_modes(&params(f0, 0.0, MAX_MODES), Refresh::All, &mut table);
        assert_eq!(n, MAX_MODES);
        for (i, f) in table.frequencies().enumerate() {
            let expected = f0 * (i + 1) as f32;
            assert!((f - expected).abs() <= expected * 1e-5, "i={i} f={f} expected={expected}");
        }
    }

    #[test]
    fn guard_truncates_active_modes() {
        let f0 = 0.1;
        let mut table = ModeTable::default();
        let n = compute_modes(&params(f0, 0.25, MAX_MODES), Refresh::All, &mut table);
        // 0.1, 0.2, 0.3, 0.4 fit below 0.49; 0.5 does not.
        assert_eq!(n, 4);
        assert_eq!(table.configured, MAX_MODES);
        for m in &table.modes[..table.configured] {
            assert!(m.frequency <= NYQUIST_GUARD);
        }
    }

    #[test]
    fn q_falls_with_mode_index_when_dark() {
        let mut table = ModeTable::default();
        let p = ResonatorParameters {
            brightness: 0.0,
            ..Default::default()
        };
        compute_modes(&p, Refresh::All, &mut table);
        let q_over_f: Vec<f32> = table.modes[..8]
            .iter()
            .map(|m| (m.q - 1.0) / m.frequency)
            .collect();
        assert!(q_over_f.windows(2).all(|w| w[1] < w[0]), "{q_over_f:?}");
    }

    #[test]
    fn gain_rolls_off_so_the_fundamental_peaks() {
        let mut table = ModeTable::default();
        compute_modes(&ResonatorParameters::default(), Refresh::All, &mut table);
        let modes = &table.modes[..16];
        assert_eq!(modes[0].gain, 1.0);
        assert!(modes.windows(2).all(|w| w[1].gain < w[0].gain));
        // Band-pass peak height is Q times gain.
        let peaks: Vec<f32> = modes.iter().map(|m| m.q * m.gain).collect();
        assert!(peaks.windows(2).all(|w| w[1] < w[0]), "{peaks:?}");
    }

    #[test]
    fn full_brightness_keeps_gain_flat() {
        let mut table = ModeTable::default();
        let p = ResonatorParameters {
            brightness: 1.0,
            geometry: 0.5,
            ..Default::default()
        };
        compute_modes(&p, Refresh::All, &mut table);
        for m in &table.modes[..table.num_modes] {
            assert!((m.gain - 1.0).abs() < 1e-4, "gain={}", m.gain);
        }
    }

    #[test]
    fn staggered_refresh_skips_odd_parity() {
        let mut table = ModeTable::default();
        compute_modes(&ResonatorParameters::default(), Refresh::Staggered(0), &mut table);
        assert!(table.is_dirty(ALWAYS_REFRESHED_MODES));
        assert!(table.is_dirty(26));
        assert!(!table.is_dirty(25));
        compute_modes(&ResonatorParameters::default(), Refresh::Staggered(1), &mut table);
        assert!(table.is_dirty(25));
        assert!(!table.is_dirty(26));
    }

    #[test]
    fn bowed_delay_folds_into_capacity() {
        assert_eq!(bowed_delay(0.25), 4);
        assert_eq!(bowed_delay(0.49), 2);
        assert_eq!(bowed_delay(1.0 / 1024.0), 1024);
        assert_eq!(bowed_delay(1.0 / 1500.0), 750);
        assert_eq!(bowed_delay(1.0 / 5000.0), 625);
        assert!(bowed_delay(0.0) <= MAX_DELAY);
        assert!(bowed_delay(f32::NAN) >= 1);
    }

    #[test]
    fn explicit_modes_sanitize_inputs() {
        let mut table = ModeTable::default();
        let n = explicit_modes(
            &[0.01, 0.02, f32::NAN, 0.03],
            &[10.0, f32::INFINITY, 5.0, 5.0],
            &[1.0, 0.5, 0.5],
            &mut table,
        );
        assert_eq!(table.configured, 3);
        assert_eq!(n, 2);
        assert_eq!(table.modes[1].q, MIN_Q);
        assert_eq!(table.modes[2].frequency, 0.0);
    }
}
