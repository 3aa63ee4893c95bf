//! Deterministic wavetable frame synthesis.

use std::f32::consts::PI;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

use crate::features::DerivedStats;

/// Closed set of synthesizable waveform shapes. Tags the selector does
/// not recognize fall back to [`Shape::Sine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)] // tags mirror the configuration strings
pub enum Shape {
    Sine,
    Saw,
    Square,
    Triangle,
    Pulse,
    Folded,
    Chaotic,
    HarmonicBuzz,
    Off,
    /// `custom_N`: harmonic stack with N partials.
    Custom(u32),
}

impl Shape {
    /// Parse a shape tag. Unknown tags silently fall back to sine so a
    /// stale configuration value never breaks a conversion.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "sine" => Shape::Sine,
            "saw" => Shape::Saw,
            "square" => Shape::Square,
            "triangle" => Shape::Triangle,
            "pulse" => Shape::Pulse,
            "folded" => Shape::Folded,
            "chaotic" => Shape::Chaotic,
            "harmonic_buzz" => Shape::HarmonicBuzz,
            "off" => Shape::Off,
            _ => {
                if let Some(n) = tag
                    .strip_prefix("custom_")
                    .and_then(|n| n.parse::<u32>().ok())
                {
                    Shape::Custom(n)
                } else {
                    Shape::Sine
                }
            }
        }
    }
}

/// Linear congruential generator for harmonic jitter, seeded purely
/// from derived statistics so identical input regenerates identical
/// frames. Same recurrence as the classic Numerical Recipes LCG.
struct JitterRng {
    state: u32,
}

impl JitterRng {
    fn from_stats(stats: DerivedStats) -> Self {
        Self {
            state: (stats.avg_pitch * 1000.0) as u32,
        }
    }

    fn next_f32(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state as f32 / 4294967296.0
    }
}

/// Generate one frame of `frame_size` float32 samples for `shape`,
/// peak-normalized to at most 1.0, and return it base64-encoded as
/// little-endian bytes.
///
/// Deterministic given `(shape, stats, frame_size)`.
pub fn generate(shape: Shape, stats: DerivedStats, frame_size: usize) -> String {
    let mut frame = render(shape, stats, frame_size);
    normalize(&mut frame);
    encode_frame(&frame)
}

fn render(shape: Shape, stats: DerivedStats, frame_size: usize) -> Vec<f32> {
    let mut frame = vec![0.0f32; frame_size];

    match shape {
        Shape::Off => {}
        Shape::Sine => {
            for (i, sample) in frame.iter_mut().enumerate() {
                let t = i as f32 / frame_size as f32;
                *sample = (2.0 * PI * t).sin();
            }
        }
        Shape::Saw => {
            for (i, sample) in frame.iter_mut().enumerate() {
                let t = i as f32 / frame_size as f32;
                *sample = 2.0 * t - 1.0;
            }
        }
        Shape::Square => {
            for (i, sample) in frame.iter_mut().enumerate() {
                let t = i as f32 / frame_size as f32;
                *sample = if t < 0.5 { 1.0 } else { -1.0 };
            }
        }
        Shape::Triangle => {
            for (i, sample) in frame.iter_mut().enumerate() {
                let t = i as f32 / frame_size as f32;
                *sample = 4.0 * (t - (t + 0.5).floor()).abs() - 1.0;
            }
        }
        Shape::Pulse => {
            // duty cycle follows how hard the performance was played
            let duty = 0.15 + 0.35 * (stats.avg_velocity / 127.0).clamp(0.0, 1.0);
            for (i, sample) in frame.iter_mut().enumerate() {
                let t = i as f32 / frame_size as f32;
                *sample = if t < duty { 1.0 } else { -1.0 };
            }
        }
        Shape::Folded => {
            // sine pushed through a wavefolder; wider pitch range folds harder
            let drive = 1.0 + stats.pitch_range / 12.0;
            for (i, sample) in frame.iter_mut().enumerate() {
                let t = i as f32 / frame_size as f32;
                *sample = ((2.0 * PI * t).sin() * drive * PI).sin();
            }
        }
        Shape::Chaotic => {
            let mut rng = JitterRng::from_stats(stats);
            let partials = 16;
            for harmonic in 1..=partials {
                let phase = rng.next_f32() * 2.0 * PI;
                let amp = rng.next_f32() / harmonic as f32;
                for (i, sample) in frame.iter_mut().enumerate() {
                    let t = i as f32 / frame_size as f32;
                    *sample += amp * (2.0 * PI * harmonic as f32 * t + phase).sin();
                }
            }
        }
        Shape::HarmonicBuzz => {
            // lower average pitch leaves room for more partials
            let partials = (64.0 * (1.0 - stats.avg_pitch / 127.0)).max(4.0) as usize;
            for harmonic in 1..=partials {
                let amp = 1.0 / harmonic as f32;
                for (i, sample) in frame.iter_mut().enumerate() {
                    let t = i as f32 / frame_size as f32;
                    *sample += amp * (2.0 * PI * harmonic as f32 * t).sin();
                }
            }
        }
        Shape::Custom(n) => {
            let mut rng = JitterRng::from_stats(stats);
            let partials = n.clamp(1, 64);
            for harmonic in 1..=partials {
                let detune = 1.0 + (rng.next_f32() - 0.5) * 0.01;
                let amp = 1.0 / harmonic as f32;
                for (i, sample) in frame.iter_mut().enumerate() {
                    let t = i as f32 / frame_size as f32;
                    *sample += amp * (2.0 * PI * harmonic as f32 * detune * t).sin();
                }
            }
        }
    }

    frame
}

/// Scale so the peak magnitude is at most 1.0; an all-zero frame is
/// left untouched.
fn normalize(frame: &mut [f32]) {
    let peak = frame.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 0.0 {
        for sample in frame.iter_mut() {
            *sample /= peak;
        }
    }
}

/// Little-endian float32 bytes, base64-encoded.
pub fn encode_frame(frame: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(frame.len() * 4);
    for sample in frame {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    B64.encode(bytes)
}
