//! Zero-delay-feedback state variable filter (normalized frequency, cycles/sample).
//!
//! The response (low/band/high-pass) and the tangent approximation are type
//! parameters, so every call site compiles to a single straight-line update.

use std::f32::consts::PI;
#[cfg(feature = "simd-wide")]
use wide::f32x8;

/// Selects one output of the SVF update.
pub trait FilterMode {
    fn select(lp: f32, bp: f32, hp: f32, r: f32) -> f32;

    #[cfg(feature = "simd-wide")]
    fn select_x8(lp: f32x8, bp: f32x8, hp: f32x8, r: f32x8) -> f32x8;
}

/// One SVF update on raw coefficients: returns `(lp, bp, hp)` and advances
/// `s1`/`s2`.
#[inline(always)]
pub fn svf_tick(g: f32, r: f32, h: f32, s1: &mut f32, s2: &mut f32, input: f32) -> (f32, f32, f32) {
    let hp = (input - r * *s1 - g * *s1 - *s2) * h;
    let bp = g * hp + *s1;
    *s1 = g * hp + bp;
    let lp = g * bp + *s2;
    *s2 = g * bp + lp;
    (lp, bp, hp)
}

/// Eight-lane `svf_tick`, same operation order as the scalar update.
#[cfg(feature = "simd-wide")]
#[inline(always)]
pub fn svf_tick_x8(
    g: f32x8,
    r: f32x8,
    h: f32x8,
    s1: &mut f32x8,
    s2: &mut f32x8,
    input: f32x8,
) -> (f32x8, f32x8, f32x8) {
    let hp = (input - r * *s1 - g * *s1 - *s2) * h;
    let bp = g * hp + *s1;
    *s1 = g * hp + bp;
    let lp = g * bp + *s2;
    *s2 = g * bp + lp;
    (lp, bp, hp)
}

#[derive(Debug, Clone, Copy)]
pub struct LowPass;
#[derive(Debug, Clone, Copy)]
pub struct BandPass;
/// Band-pass with unity peak gain (output scaled by `1/Q`).
#[derive(Debug, Clone, Copy)]
pub struct BandPassNormalized;
#[derive(Debug, Clone, Copy)]
pub struct HighPass;

impl FilterMode for LowPass {
    #[inline(always)]
    fn select(lp: f32, _bp: f32, _hp: f32, _r: f32) -> f32 {
        lp
    }

    #[cfg(feature = "simd-wide")]
    #[inline(always)]
    fn select_x8(lp: f32x8, _bp: f32x8, _hp: f32x8, _r: f32x8) -> f32x8 {
        lp
    }
}

impl FilterMode for BandPass {
    #[inline(always)]
    fn select(_lp: f32, bp: f32, _hp: f32, _r: f32) -> f32 {
        bp
    }

    #[cfg(feature = "simd-wide")]
    #[inline(always)]
    fn select_x8(_lp: f32x8, bp: f32x8, _hp: f32x8, _r: f32x8) -> f32x8 {
        bp
    }
}

impl FilterMode for BandPassNormalized {
    #[inline(always)]
    fn select(_lp: f32, bp: f32, _hp: f32, r: f32) -> f32 {
        bp * r
    }

    #[cfg(feature = "simd-wide")]
    #[inline(always)]
    fn select_x8(_lp: f32x8, bp: f32x8, _hp: f32x8, r: f32x8) -> f32x8 {
        bp * r
    }
}

impl FilterMode for HighPass {
    #[inline(always)]
    fn select(_lp: f32, _bp: f32, hp: f32, _r: f32) -> f32 {
        hp
    }

    #[cfg(feature = "simd-wide")]
    #[inline(always)]
    fn select_x8(_lp: f32x8, _bp: f32x8, hp: f32x8, _r: f32x8) -> f32x8 {
        hp
    }
}

/// Maps normalized frequency to the prewarped gain `g = tan(pi*f)`.
pub trait FrequencyApprox {
    fn tan(f: f32) -> f32;
}

/// Polynomial fit, accurate over the audio band at 48 kHz.
#[derive(Debug, Clone, Copy)]
pub struct Fast;
/// Library `tan`.
#[derive(Debug, Clone, Copy)]
pub struct Accurate;

impl FrequencyApprox for Fast {
    #[inline(always)]
    fn tan(f: f32) -> f32 {
        const PI_POW_3: f32 = PI * PI * PI;
        const PI_POW_5: f32 = PI_POW_3 * PI * PI;
        let a = 3.260e-1 * PI_POW_3;
        let b = 1.823e-1 * PI_POW_5;
        let f2 = f * f;
        f * (PI + f2 * (a + b * f2))
    }
}

impl FrequencyApprox for Accurate {
    #[inline(always)]
    fn tan(f: f32) -> f32 {
        (PI * f).tan()
    }
}

/// Two-integrator SVF with its own coefficients and 2-element state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Svf {
    g: f32,
    r: f32,
    h: f32,
    state_1: f32,
    state_2: f32,
}

impl Svf {
    pub fn new() -> Self {
        let mut svf = Self::default();
        svf.set_g_q(0.01, 100.0);
        svf
    }

    /// Zero the integrator state, keeping coefficients.
    pub fn reset(&mut self) {
        self.state_1 = 0.0;
        self.state_2 = 0.0;
    }

    /// Tune from normalized frequency and resonance.
    #[inline]
    pub fn set_f_q<A: FrequencyApprox>(&mut self, f: f32, q: f32) {
        self.set_g_q(A::tan(f), q);
    }

    /// Tune from a precomputed gain (shares `g` between filters at one pitch).
    #[inline]
    pub fn set_g_q(&mut self, g: f32, q: f32) {
        self.g = g;
        self.r = 1.0 / q;
        self.h = 1.0 / (1.0 + self.r * self.g + self.g * self.g);
    }

    pub fn g(&self) -> f32 {
        self.g
    }

    /// Resonance (Q).
    pub fn q(&self) -> f32 {
        1.0 / self.r
    }

    /// Normalized frequency recovered from `g`.
    pub fn frequency(&self) -> f32 {
        self.g.atan() / PI
    }

    pub fn state(&self) -> (f32, f32) {
        (self.state_1, self.state_2)
    }

    #[inline(always)]
    pub fn process<M: FilterMode>(&mut self, input: f32) -> f32 {
        let (lp, bp, hp) = svf_tick(
            self.g,
            self.r,
            self.h,
            &mut self.state_1,
            &mut self.state_2,
            input,
        );
        M::select(lp, bp, hp, self.r)
    }
}
