//! Modal + banded-waveguide resonator (normalized frequency, cycles/sample).
//!
//! Configure once per block with [`Resonator::compute_filters`] or
//! [`Resonator::set_filters`], then render the block with
//! [`Resonator::process`]. Coefficients are latched for the whole block; only
//! the pickup position is interpolated per sample.

mod bank;
mod bowed;
mod panner;

pub use bank::{INPUT_GAIN, ModalBank, Mode};
pub use bowed::{BowedBank, DelayLine, bow_table};
pub use panner::{DEFAULT_MODULATION_OFFSET, PanRamp, PickupWindows, PositionPanner};

use tracing::debug;

use crate::synth::context::{DEFAULT_MODULATION_HZ, EngineContext};
use crate::synth::filter::BandPass;
use crate::synth::modes::{
    MAX_MODES, ModeTable, Refresh, ResonatorParameters, compute_modes, explicit_modes,
};
use crate::synth::util::clamp_finite;

/// One resonating object: modal bank, waveguides and the stereo pickup.
#[derive(Debug, Clone)]
pub struct Resonator {
    context: EngineContext,
    params: ResonatorParameters,
    table: ModeTable,
    modal: ModalBank,
    bowed: BowedBank,
    panner: PositionPanner,
    staggered_refresh: bool,
    clock: u32,
}

impl Resonator {
    /// Zeroed state, default parameters, filters already configured.
    pub fn new(context: &EngineContext) -> Self {
        let params = ResonatorParameters {
            frequency: context.normalize(220.0),
            ..Default::default()
        };
        let mut resonator = Self {
            context: *context,
            params,
            table: ModeTable::default(),
            modal: ModalBank::new(),
            bowed: BowedBank::new(),
            panner: PositionPanner::new(params.position, context.normalize(DEFAULT_MODULATION_HZ)),
            staggered_refresh: false,
            clock: 0,
        };
        let num_modes = resonator.compute_filters();
        debug!(
            sample_rate = context.sample_rate(),
            num_modes, "resonator initialized"
        );
        resonator
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn parameters(&self) -> ResonatorParameters {
        self.params
    }

    /// Replace every macro-parameter at once (one snapshot per block).
    pub fn apply_parameters(&mut self, params: ResonatorParameters) {
        self.params = params.clamped();
        self.panner.set_position(self.params.position);
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.params.frequency = frequency;
        self.params = self.params.clamped();
    }

    pub fn set_frequency_hz(&mut self, hz: f32) {
        self.set_frequency(self.context.normalize(hz));
    }

    pub fn set_geometry(&mut self, geometry: f32) {
        self.params.geometry = clamp_finite(geometry, 0.0, 1.0, self.params.geometry);
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.params.brightness = clamp_finite(brightness, 0.0, 1.0, self.params.brightness);
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.params.damping = clamp_finite(damping, 0.0, 1.0, self.params.damping);
    }

    pub fn set_position(&mut self, position: f32) {
        self.params.position = clamp_finite(position, 0.0, 1.0, self.params.position);
        self.panner.set_position(self.params.position);
    }

    pub fn set_resolution(&mut self, resolution: usize) {
        self.params.resolution = resolution.clamp(1, MAX_MODES);
    }

    /// Rate of the side-bus LFO.
    pub fn set_modulation_frequency_hz(&mut self, hz: f32) {
        self.panner.set_lfo_increment(self.context.normalize(hz));
    }

    /// Phase offset of the side window relative to the pickup position.
    pub fn set_modulation_offset(&mut self, offset: f32) {
        self.panner.set_offset(offset);
    }

    /// Refresh the upper modes every other configuration call only.
    pub fn set_staggered_refresh(&mut self, enabled: bool) {
        self.staggered_refresh = enabled;
    }

    /// Derive mode tuning from the macro-parameters. Returns the active
    /// mode count.
    pub fn compute_filters(&mut self) -> usize {
        let refresh = if self.staggered_refresh {
            Refresh::Staggered(self.clock)
        } else {
            Refresh::All
        };
        self.clock = self.clock.wrapping_add(1);
        let previous = self.table.num_modes;
        let num_modes = compute_modes(&self.params, refresh, &mut self.table);
        self.latch_table();
        if num_modes != previous {
            debug!(num_modes, previous, "active mode count changed");
        }
        num_modes
    }

    /// Tune the modes from explicit arrays; the shortest array sets the
    /// count. Returns the active mode count.
    pub fn set_filters(&mut self, frequencies: &[f32], qs: &[f32], gains: &[f32]) -> usize {
        let num_modes = explicit_modes(frequencies, qs, gains, &mut self.table);
        self.latch_table();
        num_modes
    }

    fn latch_table(&mut self) {
        self.modal.configure(&self.table);
        self.bowed.configure(&self.table);
    }

    pub fn num_modes(&self) -> usize {
        self.table.num_modes
    }

    pub fn table(&self) -> &ModeTable {
        &self.table
    }

    pub fn mode(&self, index: usize) -> Option<Mode> {
        self.modal.mode(index)
    }

    /// Loop length of waveguide `index`, in samples.
    pub fn bowed_delay(&self, index: usize) -> Option<usize> {
        self.bowed.delay(index)
    }

    /// Render one block. The block is the shortest of `excitation`, `center`
    /// and `sides`; `bow_strength` entries past its end count as zero.
    pub fn process(
        &mut self,
        bow_strength: Option<&[f32]>,
        excitation: &[f32],
        center: &mut [f32],
        sides: &mut [f32],
    ) {
        let size = excitation.len().min(center.len()).min(sides.len());
        if size == 0 {
            return;
        }
        let excitation = &excitation[..size];
        let center = &mut center[..size];
        let sides = &mut sides[..size];

        let ramp = self.panner.begin_block(size);
        self.modal.process::<BandPass>(&ramp, excitation, center, sides);
        self.bowed.process(&ramp, bow_strength, excitation, center);
        self.panner.end_block(size);
    }

    /// Zero every filter state and delay line; tuning is kept.
    pub fn panic(&mut self) {
        self.modal.reset_state();
        self.bowed.reset();
        debug!("resonator state cleared");
    }

    /// `panic` plus a rewind of the pickup ramp and stereo LFO.
    pub fn reset(&mut self) {
        self.panic();
        self.panner.rewind();
    }
}
