//! Recursive quadrature generator: steps a unit phasor by a fixed angle, so a
//! run of `cos`/`sin` pairs costs one complex multiply per step.

use std::f32::consts::PI;

use crate::synth::util::wrap_unit;

/// How `cos(2*pi*x)` is obtained when a generator is initialized.
pub trait CosineInit {
    fn cos(cycles: f32) -> f32;

    #[inline(always)]
    fn sin(cycles: f32) -> f32 {
        Self::cos(cycles - 0.25)
    }
}

/// Piecewise parabola through the exact values at x = 0, 1/4, 1/2, 3/4, 1.
#[derive(Debug, Clone, Copy)]
pub struct Approximate;
/// Library `cos`.
#[derive(Debug, Clone, Copy)]
pub struct Exact;

impl CosineInit for Approximate {
    #[inline(always)]
    fn cos(cycles: f32) -> f32 {
        let mut sign = 8.0;
        let mut f = wrap_unit(cycles) - 0.25;
        if f < 0.0 {
            f = -f;
        } else if f > 0.5 {
            f -= 0.5;
        } else {
            sign = -8.0;
        }
        sign * f * (1.0 - 2.0 * f)
    }
}

impl CosineInit for Exact {
    #[inline(always)]
    fn cos(cycles: f32) -> f32 {
        (2.0 * PI * cycles).cos()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuadratureOscillator {
    step_re: f32,
    step_im: f32,
    start_re: f32,
    start_im: f32,
    re: f32,
    im: f32,
}

impl Default for QuadratureOscillator {
    fn default() -> Self {
        Self {
            step_re: 1.0,
            step_im: 0.0,
            start_re: 1.0,
            start_im: 0.0,
            re: 1.0,
            im: 0.0,
        }
    }
}

impl QuadratureOscillator {
    /// Angle `start` at step 0, advancing by `step` per step (both in
    /// cycles). The step rotor is renormalized so the phasor keeps unit
    /// length whatever `I` returns.
    #[inline]
    pub fn init<I: CosineInit>(&mut self, step: f32, start: f32) {
        let (re, im) = unit(I::cos(step), I::sin(step));
        self.step_re = re;
        self.step_im = im;
        let (re, im) = unit(I::cos(start), I::sin(start));
        self.start_re = re;
        self.start_im = im;
        self.start();
    }

    /// Rewind to step 0.
    #[inline]
    pub fn start(&mut self) {
        self.re = self.start_re;
        self.im = self.start_im;
    }

    /// `(cos, sin)` at the current step, then advance.
    #[inline(always)]
    pub fn next(&mut self) -> (f32, f32) {
        let current = (self.re, self.im);
        let re = self.re * self.step_re - self.im * self.step_im;
        self.im = self.re * self.step_im + self.im * self.step_re;
        self.re = re;
        current
    }
}

#[inline]
fn unit(re: f32, im: f32) -> (f32, f32) {
    let norm = (re * re + im * im).sqrt();
    if norm > 0.0 { (re / norm, im / norm) } else { (1.0, 0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_cosine_formula() {
        let mut osc = QuadratureOscillator::default();
        let (step, start) = (0.137, 0.06);
        osc.init::<Exact>(step, start);
        for n in 0..64 {
            let angle = 2.0 * PI * (start + step * n as f32);
            let (c, s) = osc.next();
            assert!((c - angle.cos()).abs() < 1e-4, "n={n} c={c}");
            assert!((s - angle.sin()).abs() < 1e-4, "n={n} s={s}");
        }
    }

    #[test]
    fn approximate_hits_anchor_points() {
        for (x, c) in [(0.0, 1.0), (0.25, 0.0), (0.5, -1.0), (0.75, 0.0), (1.0, 1.0)] {
            assert!((Approximate::cos(x) - c).abs() < 1e-6, "x={x}");
        }
        assert!((Approximate::sin(0.25) - 1.0).abs() < 1e-6);
        assert!((Approximate::sin(-0.25) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn phasor_keeps_unit_length() {
        let mut osc = QuadratureOscillator::default();
        for k in 0..=200 {
            let step = k as f32 / 200.0;
            osc.init::<Approximate>(step, 0.125);
            for _ in 0..64 {
                let (c, s) = osc.next();
                assert!((c * c + s * s - 1.0).abs() < 1e-4, "step={step} c={c} s={s}");
            }
        }
    }

    #[test]
    fn start_rewinds() {
        let mut osc = QuadratureOscillator::default();
        osc.init::<Approximate>(0.3, 0.125);
        let first: Vec<(f32, f32)> = (0..8).map(|_| osc.next()).collect();
        osc.start();
        let second: Vec<(f32, f32)> = (0..8).map(|_| osc.next()).collect();
        assert_eq!(first, second);
        assert!((first[0].0 - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }
}
