//! Reference excitation sources driving the resonator.
//!
//! These stand in for a real voice's exciter: a strike impulse, a decaying
//! noise burst and a bow pressure envelope.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait Exciter {
    /// Start a new excitation with the given strength.
    fn trigger(&mut self, energy: f32);
    fn next_drive(&mut self) -> f32;

    fn fill(&mut self, out: &mut [f32]) {
        for s in out.iter_mut() {
            *s = self.next_drive();
        }
    }
}

/// Single-sample strike.
#[derive(Debug, Clone, Default)]
pub struct ImpulseExciter {
    pending: f32,
}

impl ImpulseExciter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Exciter for ImpulseExciter {
    fn trigger(&mut self, energy: f32) {
        if energy.is_finite() {
            self.pending += energy;
        }
    }

    fn next_drive(&mut self) -> f32 {
        let out = self.pending;
        self.pending = 0.0;
        out
    }
}

/// White noise under an exponential decay; reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct NoiseBurstExciter {
    rng: StdRng,
    level: f32,
    decay: f32,
}

impl NoiseBurstExciter {
    /// `decay_samples` is the time constant of the envelope.
    pub fn new(seed: u64, decay_samples: f32) -> Self {
        let decay = if decay_samples.is_finite() && decay_samples > 0.0 {
            (-1.0 / decay_samples).exp()
        } else {
            0.0
        };
        Self {
            rng: StdRng::seed_from_u64(seed),
            level: 0.0,
            decay,
        }
    }
}

impl Exciter for NoiseBurstExciter {
    fn trigger(&mut self, energy: f32) {
        if energy.is_finite() {
            self.level = energy.abs();
        }
    }

    fn next_drive(&mut self) -> f32 {
        if self.level < 1.0e-6 {
            self.level = 0.0;
            return 0.0;
        }
        let out = self.rng.gen_range(-1.0f32..=1.0) * self.level;
        self.level *= self.decay;
        out
    }
}

/// Bow pressure: linear attack to the triggered level, then held.
#[derive(Debug, Clone)]
pub struct BowExciter {
    pressure: f32,
    target: f32,
    step: f32,
}

impl BowExciter {
    pub fn new(attack_samples: usize) -> Self {
        Self {
            pressure: 0.0,
            target: 0.0,
            step: 1.0 / attack_samples.max(1) as f32,
        }
    }

    /// Lift the bow.
    pub fn release(&mut self) {
        self.target = 0.0;
        self.pressure = 0.0;
    }
}

impl Exciter for BowExciter {
    fn trigger(&mut self, energy: f32) {
        if energy.is_finite() {
            self.target = energy.clamp(0.0, 1.0);
        }
    }

    fn next_drive(&mut self) -> f32 {
        if self.pressure < self.target {
            self.pressure = (self.pressure + self.step * self.target).min(self.target);
        }
        self.pressure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_fires_once() {
        let mut ex = ImpulseExciter::new();
        ex.trigger(0.7);
        let mut out = [0.0; 4];
        ex.fill(&mut out);
        assert_eq!(out, [0.7, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn noise_is_seeded_and_decays() {
        let mut a = NoiseBurstExciter::new(7, 100.0);
        let mut b = NoiseBurstExciter::new(7, 100.0);
        a.trigger(1.0);
        b.trigger(1.0);
        let mut out_a = vec![0.0; 4000];
        let mut out_b = vec![0.0; 4000];
        a.fill(&mut out_a);
        b.fill(&mut out_b);
        assert_eq!(out_a, out_b);
        assert!(out_a[..100].iter().any(|v| v.abs() > 0.1));
        assert!(out_a[3000..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn bow_ramps_then_holds() {
        let mut bow = BowExciter::new(4);
        bow.trigger(0.8);
        let ramp: Vec<f32> = (0..6).map(|_| bow.next_drive()).collect();
        assert!((ramp[0] - 0.2).abs() < 1e-6);
        assert!((ramp[3] - 0.8).abs() < 1e-6);
        assert_eq!(ramp[5], 0.8);
        bow.release();
        assert_eq!(bow.next_drive(), 0.0);
    }
}
