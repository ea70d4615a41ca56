//! Banded waveguides: the leading modes each get a delay loop closed through a
//! high-Q band-pass, driven by a shared stick-slip friction term.

use super::bank::INPUT_GAIN;
use super::panner::PanRamp;
use crate::synth::filter::{BandPassNormalized, Fast, FrequencyApprox, Svf};
use crate::synth::modes::{MAX_BOWED_MODES, MAX_DELAY, ModeTable};
use crate::synth::util::flush_denorm;

/// Loop attenuation applied on every read.
const LOOP_GAIN: f32 = 0.99;
/// Output level of the waveguides relative to the modal bank.
const BOWED_OUTPUT_GAIN: f32 = 8.0;
/// Smallest friction slope; keeps the loop excited far from stick.
const BOW_MIN: f32 = 0.002;
/// Largest friction slope, reached near zero relative velocity.
const BOW_MAX: f32 = 0.24;

/// Friction force from relative velocity `x` and bow pressure `strength`.
#[inline]
pub fn bow_table(x: f32, strength: f32) -> f32 {
    let x = 0.13 * strength - x;
    let mut bow = (x * 6.0).abs() + 0.75;
    bow *= bow;
    bow *= bow;
    bow = (0.25 / bow).clamp(BOW_MIN, BOW_MAX);
    x * bow
}

/// Fixed-capacity delay line. The write pointer walks backwards, so a read at
/// `delay` returns the sample written `delay` writes ago.
#[derive(Debug, Clone)]
pub struct DelayLine<const N: usize> {
    line: [f32; N],
    write_ptr: usize,
    delay: usize,
}

impl<const N: usize> Default for DelayLine<N> {
    fn default() -> Self {
        Self {
            line: [0.0; N],
            write_ptr: 0,
            delay: 1,
        }
    }
}

impl<const N: usize> DelayLine<N> {
    pub fn reset(&mut self) {
        self.line = [0.0; N];
        self.write_ptr = 0;
    }

    /// Loop length, clamped to `1..=N`.
    pub fn set_delay(&mut self, delay: usize) {
        self.delay = delay.clamp(1, N);
    }

    pub fn delay(&self) -> usize {
        self.delay
    }

    #[inline]
    pub fn read(&self) -> f32 {
        self.line[(self.write_ptr + self.delay) % N]
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.line[self.write_ptr] = sample;
        self.write_ptr = (self.write_ptr + N - 1) % N;
    }
}

/// The waveguide half of the resonator.
#[derive(Debug, Clone)]
pub struct BowedBank {
    filters: [Svf; MAX_BOWED_MODES],
    delays: [DelayLine<MAX_DELAY>; MAX_BOWED_MODES],
    gain: [f32; MAX_BOWED_MODES],
    active_len: usize,
    feedback: f32,
}

impl Default for BowedBank {
    fn default() -> Self {
        Self::new()
    }
}

impl BowedBank {
    pub fn new() -> Self {
        Self {
            filters: [Svf::new(); MAX_BOWED_MODES],
            delays: std::array::from_fn(|_| DelayLine::default()),
            gain: [0.0; MAX_BOWED_MODES],
            active_len: 0,
            feedback: 0.0,
        }
    }

    pub fn active_len(&self) -> usize {
        self.active_len
    }

    /// Loop length of waveguide `i`.
    pub fn delay(&self, i: usize) -> Option<usize> {
        (i < self.active_len).then(|| self.delays[i].delay())
    }

    pub fn filter(&self, i: usize) -> Option<&Svf> {
        (i < self.active_len).then(|| &self.filters[i])
    }

    /// Retune dirty waveguides; loop contents are kept.
    pub fn configure(&mut self, table: &ModeTable) {
        let configured = table.configured.min(MAX_BOWED_MODES);
        for i in 0..configured {
            if !table.is_dirty(i) {
                continue;
            }
            let g = Fast::tan(table.modes[i].frequency);
            self.filters[i].set_g_q(g, table.bowed[i].q);
            self.delays[i].set_delay(table.bowed[i].delay);
            self.gain[i] = table.modes[i].gain;
        }
        self.active_len = table.num_bowed();
    }

    /// Zero every loop, filter state and the pending friction term.
    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
        for delay in &mut self.delays {
            delay.reset();
        }
        self.feedback = 0.0;
    }

    /// Add the waveguide output to `center`, each loop weighted by its mode's
    /// gain. A missing `bow_strength` means no bow pressure.
    pub fn process(
        &mut self,
        ramp: &PanRamp,
        bow_strength: Option<&[f32]>,
        excitation: &[f32],
        center: &mut [f32],
    ) {
        let n = self.active_len;
        if n == 0 {
            return;
        }
        for (t, (&x, c)) in excitation.iter().zip(center.iter_mut()).enumerate() {
            let input = x * INPUT_GAIN + self.feedback;
            let mut windows = ramp.windows(t);
            let mut bow_signal = 0.0;
            let mut sum = 0.0;
            let loops = self.filters[..n]
                .iter_mut()
                .zip(&mut self.delays[..n])
                .zip(&self.gain[..n]);
            for ((filter, delay), &gain) in loops {
                let s = LOOP_GAIN * delay.read();
                bow_signal += s;
                let s = flush_denorm(filter.process::<BandPassNormalized>(input + s));
                delay.write(s);
                sum += s * gain * windows.next().0;
            }
            *c += sum * BOWED_OUTPUT_GAIN;
            let strength = bow_strength.and_then(|b| b.get(t)).copied().unwrap_or(0.0);
            self.feedback = bow_table(bow_signal, strength);
        }
    }
}
