//! Divergence monitor for rendered resonator blocks.
//!
//! Tracks a leaky mean of the squared output and flags blocks whose energy
//! exceeds a ceiling or that contain non-finite samples. The caller is
//! expected to reset the resonator on a trip.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuardParams {
    /// Leaky energy above which the block is considered diverged.
    pub energy_ceiling: f32,
    /// Per-sample leak of the energy average.
    pub leak: f32,
}

impl Default for GuardParams {
    fn default() -> Self {
        Self {
            energy_ceiling: 16.0,
            leak: 0.001,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GuardVerdict {
    Healthy,
    /// Energy over the ceiling; carries the peak leaky energy of the block.
    Diverged { energy: f32 },
    NonFinite,
}

impl GuardVerdict {
    pub fn tripped(self) -> bool {
        !matches!(self, GuardVerdict::Healthy)
    }
}

/// Shared trip counters, readable from another thread.
#[derive(Debug, Default)]
pub struct GuardMeter {
    trip_count: AtomicU64,
    non_finite_count: AtomicU64,
    max_energy_bits: AtomicU32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GuardStats {
    pub trips: u64,
    pub non_finite: u64,
    pub max_energy: f32,
}

impl GuardMeter {
    pub fn record(&self, verdict: GuardVerdict) {
        match verdict {
            GuardVerdict::Healthy => {}
            GuardVerdict::Diverged { energy } => {
                self.trip_count.fetch_add(1, Ordering::Relaxed);
                let prev = f32::from_bits(self.max_energy_bits.load(Ordering::Relaxed));
                if energy > prev {
                    self.max_energy_bits
                        .store(energy.to_bits(), Ordering::Relaxed);
                }
            }
            GuardVerdict::NonFinite => {
                self.trip_count.fetch_add(1, Ordering::Relaxed);
                self.non_finite_count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn take_snapshot(&self) -> Option<GuardStats> {
        let trips = self.trip_count.swap(0, Ordering::Relaxed);
        if trips == 0 {
            return None;
        }
        let non_finite = self.non_finite_count.swap(0, Ordering::Relaxed);
        let max_energy = f32::from_bits(self.max_energy_bits.swap(0, Ordering::Relaxed));
        Some(GuardStats {
            trips,
            non_finite,
            max_energy,
        })
    }
}

#[derive(Debug)]
pub struct DivergenceGuard {
    params: GuardParams,
    energy: f32,
    meter: Option<Arc<GuardMeter>>,
}

impl DivergenceGuard {
    pub fn new(params: GuardParams) -> Self {
        Self {
            params,
            energy: 0.0,
            meter: None,
        }
    }

    pub fn with_meter(mut self, meter: Arc<GuardMeter>) -> Self {
        self.meter = Some(meter);
        self
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Clear the energy average (call after resetting the resonator).
    pub fn reset(&mut self) {
        self.energy = 0.0;
    }

    /// Inspect one rendered block.
    pub fn check(&mut self, center: &[f32], sides: &[f32]) -> GuardVerdict {
        let leak = self.params.leak.clamp(0.0, 1.0);
        let mut peak = self.energy;
        let mut verdict = GuardVerdict::Healthy;
        for (&c, &s) in center.iter().zip(sides.iter()) {
            if !c.is_finite() || !s.is_finite() {
                verdict = GuardVerdict::NonFinite;
                break;
            }
            self.energy += leak * (c * c + s * s - self.energy);
            peak = peak.max(self.energy);
        }
        if verdict == GuardVerdict::Healthy && peak > self.params.energy_ceiling {
            verdict = GuardVerdict::Diverged { energy: peak };
        }
        if verdict.tripped() {
            self.energy = 0.0;
            if let Some(meter) = &self.meter {
                meter.record(verdict);
            }
        }
        verdict
    }
}
