// Entry point: renders an excitation through the resonator into a WAV file.
use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use crossbeam_channel::bounded;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use resonare::audio::guard::{DivergenceGuard, GuardMeter};
use resonare::audio::writer::{StereoBlock, WavOutput};
use resonare::cli::{Args, Excitation};
use resonare::config::RenderConfig;
use resonare::excite::{BowExciter, Exciter, ImpulseExciter, NoiseBurstExciter};
use resonare::synth::snapshot::parameter_channel;
use resonare::{EngineContext, Resonator};

/// Rendered blocks allocated up front and cycled through the writer.
const BLOCKS_IN_FLIGHT: usize = 16;

fn apply_overrides(cfg: &mut RenderConfig, args: &Args) {
    let r = &mut cfg.resonator;
    if let Some(v) = args.frequency {
        r.frequency_hz = v;
    }
    if let Some(v) = args.geometry {
        r.geometry = v;
    }
    if let Some(v) = args.brightness {
        r.brightness = v;
    }
    if let Some(v) = args.damping {
        r.damping = v;
    }
    if let Some(v) = args.position {
        r.position = v;
    }
    if let Some(v) = args.resolution {
        r.resolution = v;
    }
    if let Some(v) = args.duration {
        cfg.audio.duration_sec = v;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut cfg = RenderConfig::load_or_default(&args.config);
    apply_overrides(&mut cfg, &args);

    let context = EngineContext::new(cfg.audio.sample_rate as f32)?;
    let block_size = context.check_block_size(cfg.audio.block_size)?;
    let total = (cfg.audio.duration_sec.max(0.0) * context.sample_rate()) as usize;

    let mut resonator = Box::new(Resonator::new(&context));
    resonator.set_modulation_frequency_hz(cfg.resonator.modulation_hz);
    resonator.set_staggered_refresh(cfg.resonator.staggered_refresh);

    let (publisher, parameters) = parameter_channel(4);
    publisher.publish(cfg.resonator.parameters(context.sample_rate()));

    let meter = Arc::new(GuardMeter::default());
    let mut guard = DivergenceGuard::new(cfg.guard.params()).with_meter(meter.clone());

    let mut exciter: Box<dyn Exciter> = match args.excitation {
        Excitation::Impulse => Box::new(ImpulseExciter::new()),
        Excitation::Noise => Box::new(NoiseBurstExciter::new(
            args.seed,
            0.01 * context.sample_rate(),
        )),
        Excitation::Bow => Box::new(BowExciter::new((0.05 * context.sample_rate()) as usize)),
    };
    exciter.trigger(args.strength);

    let (tx, rx) = bounded::<StereoBlock>(BLOCKS_IN_FLIGHT);
    let (recycle_tx, recycle_rx) = bounded::<StereoBlock>(BLOCKS_IN_FLIGHT);
    for _ in 0..BLOCKS_IN_FLIGHT {
        recycle_tx.send(StereoBlock::zeroed(block_size))?;
    }
    let writer = WavOutput::run(
        rx,
        recycle_tx,
        args.output.clone(),
        cfg.audio.sample_rate,
        cfg.audio.output_gain,
    );

    info!(
        output = %args.output.display(),
        excitation = ?args.excitation,
        frames = total,
        block_size,
        "rendering"
    );

    let mut drive = vec![0.0f32; block_size];
    let silence = vec![0.0f32; block_size];
    let mut rendered = 0usize;
    while rendered < total {
        let n = block_size.min(total - rendered);
        if let Some(params) = parameters.latest() {
            resonator.apply_parameters(params);
        }
        resonator.compute_filters();

        // Blocks until the writer hands one back; fails only once it has exited.
        let Ok(mut block) = recycle_rx.recv() else {
            break;
        };
        block.set_len(n);
        let StereoBlock { center, sides } = &mut block;

        exciter.fill(&mut drive[..n]);
        match args.excitation {
            Excitation::Bow => resonator.process(Some(&drive[..n]), &silence[..n], center, sides),
            _ => resonator.process(None, &drive[..n], center, sides),
        }

        let verdict = guard.check(center, sides);
        if verdict.tripped() {
            warn!(?verdict, frame = rendered, "output diverged; resetting resonator");
            resonator.panic();
            center.fill(0.0);
            sides.fill(0.0);
        }

        if tx.send(block).is_err() {
            break;
        }
        rendered += n;
    }
    drop(tx);

    let frames = writer
        .join()
        .map_err(|_| "wav writer thread panicked")??;
    if let Some(stats) = meter.take_snapshot() {
        warn!(trips = stats.trips, non_finite = stats.non_finite, "divergence guard engaged");
    }
    info!(frames, "done");
    Ok(())
}
