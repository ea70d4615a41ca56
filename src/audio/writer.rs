use std::path::PathBuf;

use crossbeam_channel::{Receiver, Sender};
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

/// One rendered block in mid/side form.
#[derive(Debug, Clone)]
pub struct StereoBlock {
    pub center: Vec<f32>,
    pub sides: Vec<f32>,
}

impl StereoBlock {
    pub fn zeroed(len: usize) -> Self {
        Self {
            center: vec![0.0; len],
            sides: vec![0.0; len],
        }
    }

    /// Change the frame count without giving back capacity.
    pub fn set_len(&mut self, len: usize) {
        self.center.resize(len, 0.0);
        self.sides.resize(len, 0.0);
    }
}

pub struct WavOutput {
    // Writer is kept alive in the thread
}

impl WavOutput {
    /// Drain blocks from `rx` into a 16-bit stereo WAV until the sender is
    /// dropped. Left is the center bus, right is the side bus
    /// (`center + sides`), so each mode lands at its pan angle. The thread
    /// returns the number of frames written. Written blocks go back through
    /// `recycle` for the renderer to refill.
    pub fn run(
        rx: Receiver<StereoBlock>,
        recycle: Sender<StereoBlock>,
        path: PathBuf,
        sample_rate: u32,
        gain: f32,
    ) -> std::thread::JoinHandle<Result<u64, hound::Error>> {
        std::thread::spawn(move || {
            let spec = WavSpec {
                channels: 2,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            };
            let mut writer = WavWriter::create(&path, spec)?;
            let mut frames = 0u64;

            while let Ok(block) = rx.recv() {
                for (&c, &s) in block.center.iter().zip(block.sides.iter()) {
                    writer.write_sample(to_i16(c * gain))?;
                    writer.write_sample(to_i16((c + s) * gain))?;
                }
                frames += block.center.len().min(block.sides.len()) as u64;
                let _ = recycle.try_send(block);
            }

            writer.finalize()?;
            debug!(path = %path.display(), frames, "wav written");
            Ok(frames)
        })
    }
}

#[inline]
fn to_i16(s: f32) -> i16 {
    let s = if s.is_finite() { s } else { 0.0 };
    (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
