//! Pickup-position weighting of modes into the center and side buses.
//!
//! Mode `i` sits at pan angle `a_i = pi/4 + pi*i*(position + modulation)` and
//! is weighted `|cos a_i|` into center and `|sin a_i|` into side, so its
//! combined power is 1 wherever the pickup is. The angles come from one
//! quadrature recursion per sample; the inner loop never calls a
//! transcendental. A comb filter would model the pickup exactly but flanges
//! audibly when the position moves.

use crate::synth::control::ControlRamp;
use crate::synth::cosine::{Approximate, QuadratureOscillator};
use crate::synth::util::{clamp_finite, wrap_unit};

/// Default modulation added to the position before it is spread over modes.
pub const DEFAULT_MODULATION_OFFSET: f32 = 0.1;
/// Pan angle of mode 0, in cycles: an equal split.
const PAN_ORIGIN: f32 = 0.125;

/// Per-block pan state; owned by the resonator.
#[derive(Debug, Clone, Copy)]
pub struct PositionPanner {
    previous_position: f32,
    position: f32,
    lfo_phase: f32,
    lfo_increment: f32,
    offset: f32,
}

/// Everything needed to reconstruct the windows at any sample of one block.
#[derive(Debug, Clone, Copy)]
pub struct PanRamp {
    position: ControlRamp,
    lfo: ControlRamp,
    offset: f32,
}

impl PositionPanner {
    /// `lfo_increment` is the stereo LFO rate in cycles/sample.
    pub fn new(position: f32, lfo_increment: f32) -> Self {
        let position = clamp_finite(position, 0.0, 1.0, 0.0);
        Self {
            previous_position: position,
            position,
            lfo_phase: 0.0,
            lfo_increment,
            offset: DEFAULT_MODULATION_OFFSET,
        }
    }

    pub fn set_position(&mut self, position: f32) {
        self.position = clamp_finite(position, 0.0, 1.0, self.position);
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn set_lfo_increment(&mut self, increment: f32) {
        self.lfo_increment = clamp_finite(increment, 0.0, 0.5, 0.0);
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.offset = clamp_finite(offset, 0.0, 1.0, DEFAULT_MODULATION_OFFSET);
    }

    /// Ramp from the previous block's position to the current one over `size` samples.
    pub fn begin_block(&self, size: usize) -> PanRamp {
        PanRamp {
            position: ControlRamp::for_len(self.previous_position, self.position, size),
            lfo: ControlRamp {
                start: self.lfo_phase,
                step: self.lfo_increment,
            },
            offset: self.offset,
        }
    }

    /// Jump to the target position and restart the LFO.
    pub fn rewind(&mut self) {
        self.previous_position = self.position;
        self.lfo_phase = 0.0;
    }

    /// Latch the end of the ramp.
    pub fn end_block(&mut self, size: usize) {
        self.previous_position = self.position;
        self.lfo_phase = wrap_unit(self.lfo_phase + self.lfo_increment * size as f32);
    }
}

impl PanRamp {
    /// Interpolated position at sample `t` (the ramp lands on the target at `t = size - 1`).
    #[inline]
    pub fn position_at(&self, t: usize) -> f32 {
        self.position.value_at(t + 1)
    }

    /// Offset plus a triangle LFO in `[0, 0.5]`.
    #[inline]
    pub fn modulation_at(&self, t: usize) -> f32 {
        let phase = wrap_unit(self.lfo.value_at(t + 1));
        let lfo = if phase > 0.5 { 1.0 - phase } else { phase };
        self.offset + lfo
    }

    /// Center/side weights for every mode at sample `t`, in mode order.
    #[inline]
    pub fn windows(&self, t: usize) -> PickupWindows {
        let spread = wrap_unit(self.position_at(t) + self.modulation_at(t));
        let mut phasor = QuadratureOscillator::default();
        phasor.init::<Approximate>(0.5 * spread, PAN_ORIGIN);
        PickupWindows { phasor }
    }
}

/// Walks the pan angles of consecutive modes.
#[derive(Debug, Clone, Copy)]
pub struct PickupWindows {
    phasor: QuadratureOscillator,
}

impl PickupWindows {
    /// `(center, side)` weights of the next mode, each in `[0, 1]`.
    #[inline(always)]
    pub fn next(&mut self) -> (f32, f32) {
        let (c, s) = self.phasor.next();
        (c.abs(), s.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_lands_on_target() {
        let mut panner = PositionPanner::new(0.2, 0.0);
        panner.set_position(0.6);
        let ramp = panner.begin_block(32);
        assert!((ramp.position_at(31) - 0.6).abs() < 1e-6);
        assert!(ramp.position_at(0) > 0.2 && ramp.position_at(0) < 0.22);
        panner.end_block(32);
        let ramp = panner.begin_block(32);
        assert!((ramp.position_at(0) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn lfo_stays_within_half_a_cycle() {
        let panner = PositionPanner::new(0.95, 0.01);
        let ramp = panner.begin_block(512);
        for t in 0..512 {
            let m = ramp.modulation_at(t) - DEFAULT_MODULATION_OFFSET;
            assert!((0.0..=0.5).contains(&m), "t={t} m={m}");
        }
    }

    #[test]
    fn no_spread_splits_every_mode_equally() {
        let mut panner = PositionPanner::new(0.0, 0.0);
        panner.set_offset(0.0);
        let mut w = panner.begin_block(1).windows(0);
        for _ in 0..64 {
            let (c, s) = w.next();
            assert!((c - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
            assert!((s - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
        }
    }

    #[test]
    fn mode_zero_stays_centered() {
        for step in 0..=20 {
            let panner = PositionPanner::new(step as f32 / 20.0, 0.0);
            let (c, s) = panner.begin_block(1).windows(0).next();
            assert!((c - s).abs() < 1e-6, "step={step}");
        }
    }

    #[test]
    fn end_block_advances_lfo() {
        let mut panner = PositionPanner::new(0.5, 0.25);
        panner.end_block(3);
        assert!((panner.lfo_phase - 0.75).abs() < 1e-6);
        panner.end_block(1);
        assert!(panner.lfo_phase.abs() < 1e-6);
    }
}
