use resonare::excite::{Exciter, NoiseBurstExciter};
use resonare::synth::modes::ResonatorParameters;
use resonare::synth::resonator::PositionPanner;
use resonare::{EngineContext, Resonator};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

const FS: f32 = 48_000.0;
const BLOCK: usize = 240;

fn render_impulse(resonator: &mut Resonator, len: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(len);
    let mut excitation = vec![0.0f32; BLOCK];
    let mut center = vec![0.0f32; BLOCK];
    let mut sides = vec![0.0f32; BLOCK];
    excitation[0] = 1.0;
    while out.len() < len {
        resonator.compute_filters();
        resonator.process(None, &excitation, &mut center, &mut sides);
        excitation[0] = 0.0;
        out.extend_from_slice(&center);
    }
    out.truncate(len);
    out
}

fn magnitude_spectrum(x: &[f32]) -> Vec<f32> {
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(x.len());
    let mut buf: Vec<Complex<f32>> = x.iter().map(|&v| Complex::new(v, 0.0)).collect();
    fft.process(&mut buf);
    buf[..x.len() / 2].iter().map(|c| c.norm()).collect()
}

fn rms(x: &[f32]) -> f32 {
    (x.iter().map(|v| v * v).sum::<f32>() / x.len() as f32).sqrt()
}

#[test]
fn impulse_rings_at_the_fundamental_and_decays() {
    let ctx = EngineContext::new(FS).unwrap();
    let mut resonator = Resonator::new(&ctx);
    resonator.apply_parameters(ResonatorParameters {
        frequency: 220.0 / FS,
        geometry: 0.25,
        brightness: 0.5,
        damping: 0.3,
        position: 0.999,
        resolution: 64,
    });

    let out = render_impulse(&mut resonator, FS as usize);
    assert!(out.iter().all(|v| v.is_finite()));

    let head = rms(&out[..4_800]);
    let tail = rms(&out[out.len() - 4_800..]);
    assert!(head > 1.0e-4, "head={head}");
    assert!(tail < head * 1.0e-2, "head={head} tail={tail}");

    // One-second window: one bin per Hz.
    let spectrum = magnitude_spectrum(&out);
    let (peak_bin, _) = spectrum
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
    assert!(peak_bin.abs_diff(220) <= 1, "peak_bin={peak_bin}");
}

#[test]
fn explicit_modes_show_up_in_the_spectrum() {
    let ctx = EngineContext::new(FS).unwrap();
    let mut resonator = Resonator::new(&ctx);
    let frequencies = [0.01, 0.025, 0.04];
    let n = resonator.set_filters(&frequencies, &[200.0; 3], &[1.0; 3]);
    assert_eq!(n, 3);
    for (i, &f) in frequencies.iter().enumerate() {
        let mode = resonator.mode(i).unwrap();
        assert_eq!(mode.frequency, f);
        assert!(
            (mode.tuned_frequency - f).abs() <= f * 1.0e-3,
            "mode={i} tuned={} requested={f}",
            mode.tuned_frequency
        );
    }

    let mut out = Vec::new();
    let mut excitation = vec![0.0f32; BLOCK];
    let mut center = vec![0.0f32; BLOCK];
    let mut sides = vec![0.0f32; BLOCK];
    excitation[0] = 1.0;
    while out.len() < FS as usize {
        resonator.process(None, &excitation, &mut center, &mut sides);
        excitation[0] = 0.0;
        out.extend_from_slice(&center);
    }
    out.truncate(FS as usize);

    let spectrum = magnitude_spectrum(&out);
    // Peaks sit where the filters say they are tuned, not just where asked.
    for i in 0..n {
        let tuned_hz = resonator.mode(i).unwrap().tuned_frequency * FS;
        let bin = tuned_hz.round() as usize;
        let local = (bin - 3..=bin + 3)
            .max_by(|&a, &b| spectrum[a].total_cmp(&spectrum[b]))
            .unwrap();
        assert!(local.abs_diff(bin) <= 1, "mode={i} tuned_hz={tuned_hz} local={local}");
    }
    for hz in [480, 1200, 1920] {
        for gap in [200, 840, 1560, 3000] {
            assert!(
                spectrum[hz] > spectrum[gap] * 10.0,
                "hz={hz} gap={gap} {} {}",
                spectrum[hz],
                spectrum[gap]
            );
        }
    }
    // Reconfiguring from macro-parameters overwrites the explicit tuning.
    resonator.compute_filters();
    assert_ne!(resonator.mode(0).unwrap().frequency, 0.01);
}

#[test]
fn position_sweep_keeps_combined_power_constant() {
    let mut panner = PositionPanner::new(0.0, 0.0);
    let mut previous: Option<Vec<(f32, f32)>> = None;
    for step in 0..=10_000 {
        panner.set_position(step as f32 / 10_000.0);
        panner.end_block(1);
        let mut windows = panner.begin_block(1).windows(0);
        let weights: Vec<(f32, f32)> = (0..64).map(|_| windows.next()).collect();
        for (i, &(c, s)) in weights.iter().enumerate() {
            assert!((0.0..=1.0 + 1.0e-4).contains(&c), "step={step} mode={i} c={c}");
            assert!((0.0..=1.0 + 1.0e-4).contains(&s), "step={step} mode={i} s={s}");
            let power = c * c + s * s;
            assert!((power - 1.0).abs() < 1.0e-3, "step={step} mode={i} power={power}");
        }
        if let Some(prev) = &previous {
            for (i, (a, b)) in prev.iter().zip(&weights).enumerate() {
                assert!((a.0 - b.0).abs() < 0.05, "step={step} mode={i} {a:?} -> {b:?}");
                assert!((a.1 - b.1).abs() < 0.05, "step={step} mode={i} {a:?} -> {b:?}");
            }
        }
        previous = Some(weights);
    }
}

#[test]
fn noise_burst_renders_finite_stereo() {
    let ctx = EngineContext::new(FS).unwrap();
    let mut resonator = Resonator::new(&ctx);
    resonator.set_geometry(0.9);
    resonator.set_position(0.3);
    let mut exciter = NoiseBurstExciter::new(3, 480.0);
    exciter.trigger(1.0);

    let mut drive = vec![0.0f32; 256];
    let mut center = vec![0.0f32; 256];
    let mut sides = vec![0.0f32; 256];
    let mut side_energy = 0.0f32;
    for _ in 0..100 {
        resonator.compute_filters();
        exciter.fill(&mut drive);
        resonator.process(None, &drive, &mut center, &mut sides);
        assert!(center.iter().chain(&sides).all(|v| v.is_finite()));
        side_energy += sides.iter().map(|v| v * v).sum::<f32>();
    }
    assert!(side_energy > 0.0);
}
