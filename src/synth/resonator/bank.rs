//! Modal bank: independent band-pass SVFs in a struct-of-arrays layout.
//! hp = (u - (r + g)*s1 - s2)*h, bp = g*hp + s1, lp = g*bp + s2

use std::f32::consts::PI;

use super::panner::PanRamp;
use crate::synth::filter::{Fast, FilterMode, FrequencyApprox, svf_tick};
use crate::synth::modes::{MAX_MODES, ModeTable};
use crate::synth::util::flush_denorm;
#[cfg(feature = "simd-wide")]
use crate::synth::filter::svf_tick_x8;
#[cfg(feature = "simd-wide")]
use wide::f32x8;

/// Excitation scale into the modal bank.
pub const INPUT_GAIN: f32 = 0.125;

/// Read-only view of one mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mode {
    pub index: usize,
    /// Requested frequency, cycles/sample.
    pub frequency: f32,
    /// Frequency the filter actually resonates at, recovered from `g`.
    pub tuned_frequency: f32,
    pub q: f32,
    pub gain: f32,
    pub state: (f32, f32),
}

/// Bank of band-pass modes with fixed capacity.
#[derive(Debug, Clone)]
pub struct ModalBank {
    active_len: usize,
    frequency: [f32; MAX_MODES],
    g: [f32; MAX_MODES],
    r: [f32; MAX_MODES],
    h: [f32; MAX_MODES],
    gain: [f32; MAX_MODES],
    s1: [f32; MAX_MODES],
    s2: [f32; MAX_MODES],
    response: [f32; MAX_MODES],
}

impl Default for ModalBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalBank {
    pub fn new() -> Self {
        Self {
            active_len: 0,
            frequency: [0.0; MAX_MODES],
            g: [0.0; MAX_MODES],
            r: [1.0; MAX_MODES],
            h: [1.0; MAX_MODES],
            gain: [0.0; MAX_MODES],
            s1: [0.0; MAX_MODES],
            s2: [0.0; MAX_MODES],
            response: [0.0; MAX_MODES],
        }
    }

    /// Maximum number of modes.
    pub fn capacity(&self) -> usize {
        MAX_MODES
    }

    /// Active number of modes.
    pub fn active_len(&self) -> usize {
        self.active_len
    }

    /// Reset all internal states to zero.
    pub fn reset_state(&mut self) {
        self.s1 = [0.0; MAX_MODES];
        self.s2 = [0.0; MAX_MODES];
    }

    /// Retune the modes the table marks dirty; state is preserved.
    pub fn configure(&mut self, table: &ModeTable) {
        for i in 0..table.configured {
            if !table.is_dirty(i) {
                continue;
            }
            let mode = &table.modes[i];
            let g = Fast::tan(mode.frequency);
            let r = 1.0 / mode.q;
            self.frequency[i] = mode.frequency;
            self.g[i] = g;
            self.r[i] = r;
            self.h[i] = 1.0 / (1.0 + r * g + g * g);
            self.gain[i] = mode.gain;
        }
        self.active_len = table.num_modes;
    }

    pub fn mode(&self, index: usize) -> Option<Mode> {
        if index >= self.active_len {
            return None;
        }
        Some(Mode {
            index,
            frequency: self.frequency[index],
            tuned_frequency: self.g[index].atan() / PI,
            q: 1.0 / self.r[index],
            gain: self.gain[index],
            state: (self.s1[index], self.s2[index]),
        })
    }

    /// Run one input sample through every active mode; responses land in
    /// `self.response[..active_len]` (reference scalar).
    #[allow(dead_code)]
    fn respond_scalar<M: FilterMode>(&mut self, u: f32) {
        let n = self.active_len;
        for i in 0..n {
            let (lp, bp, hp) = svf_tick(
                self.g[i],
                self.r[i],
                self.h[i],
                &mut self.s1[i],
                &mut self.s2[i],
                u,
            );
            self.s1[i] = flush_denorm(self.s1[i]);
            self.s2[i] = flush_denorm(self.s2[i]);
            self.response[i] = M::select(lp, bp, hp, self.r[i]) * self.gain[i];
        }
    }

    #[cfg(feature = "simd-wide")]
    fn respond_simd_wide8<M: FilterMode>(&mut self, u: f32) {
        let n = self.active_len;
        let n8 = n & !7;
        let u_vec = f32x8::splat(u);

        for i in (0..n8).step_by(8) {
            let lanes = |a: &[f32; MAX_MODES]| {
                let mut arr = [0.0f32; 8];
                arr.copy_from_slice(&a[i..i + 8]);
                f32x8::from(arr)
            };
            let g = lanes(&self.g);
            let r = lanes(&self.r);
            let h = lanes(&self.h);
            let gain = lanes(&self.gain);
            let mut s1 = lanes(&self.s1);
            let mut s2 = lanes(&self.s2);

            let (lp, bp, hp) = svf_tick_x8(g, r, h, &mut s1, &mut s2, u_vec);
            let out = M::select_x8(lp, bp, hp, r) * gain;

            let mut s1_arr = s1.to_array();
            let mut s2_arr = s2.to_array();
            for lane in 0..8 {
                s1_arr[lane] = flush_denorm(s1_arr[lane]);
                s2_arr[lane] = flush_denorm(s2_arr[lane]);
            }
            self.s1[i..i + 8].copy_from_slice(&s1_arr);
            self.s2[i..i + 8].copy_from_slice(&s2_arr);
            self.response[i..i + 8].copy_from_slice(&out.to_array());
        }

        for i in n8..n {
            let (lp, bp, hp) = svf_tick(
                self.g[i],
                self.r[i],
                self.h[i],
                &mut self.s1[i],
                &mut self.s2[i],
                u,
            );
            self.s1[i] = flush_denorm(self.s1[i]);
            self.s2[i] = flush_denorm(self.s2[i]);
            self.response[i] = M::select(lp, bp, hp, self.r[i]) * self.gain[i];
        }
    }

    #[inline]
    fn respond<M: FilterMode>(&mut self, u: f32) {
        #[cfg(feature = "simd-wide")]
        {
            self.respond_simd_wide8::<M>(u);
        }
        #[cfg(not(feature = "simd-wide"))]
        {
            self.respond_scalar::<M>(u);
        }
    }

    /// Render one block into `center` and `sides` (mid-side: `sides` holds
    /// side-window sum minus center sum). All slices must be the same length.
    pub fn process<M: FilterMode>(
        &mut self,
        ramp: &PanRamp,
        excitation: &[f32],
        center: &mut [f32],
        sides: &mut [f32],
    ) {
        debug_assert_eq!(excitation.len(), center.len());
        debug_assert_eq!(excitation.len(), sides.len());
        let n = self.active_len;
        for (t, ((&x, c), s)) in excitation
            .iter()
            .zip(center.iter_mut())
            .zip(sides.iter_mut())
            .enumerate()
        {
            self.respond::<M>(x * INPUT_GAIN);

            let mut windows = ramp.windows(t);
            let mut sum_center = 0.0;
            let mut sum_side = 0.0;
            for &y in &self.response[..n] {
                let (center_weight, side_weight) = windows.next();
                sum_center += y * center_weight;
                sum_side += y * side_weight;
            }
            *c = sum_center;
            *s = sum_side - sum_center;
        }
    }
}
