//! Performance statistics and the heuristics derived from them.

use crate::wavetable::Shape;

/// One note with absolute times in seconds.
#[derive(Debug, Clone, Copy)]
pub struct Note {
    /// MIDI key number.
    pub pitch: u8,
    /// Note-on velocity.
    pub velocity: u8,
    /// Note-on time in seconds.
    pub start: f64,
    /// Note-off time in seconds.
    pub end: f64,
}

/// One control-change event.
#[derive(Debug, Clone, Copy)]
pub struct ControlChange {
    /// Controller number.
    pub controller: u8,
    /// Controller value.
    pub value: u8,
    /// Event time in seconds.
    pub time: f64,
}

/// One pitch-bend event, centered at 0.
#[derive(Debug, Clone, Copy)]
pub struct PitchBend {
    /// Bend offset from center.
    pub value: i16,
    /// Event time in seconds.
    pub time: f64,
}

/// Flat performance tables handed over by the MIDI reader.
#[derive(Debug, Clone, Default)]
pub struct MidiData {
    /// All notes, sorted by start time.
    pub notes: Vec<Note>,
    /// All control-change events.
    pub control_changes: Vec<ControlChange>,
    /// All pitch-bend events.
    pub pitch_bends: Vec<PitchBend>,
}

/// Aggregate statistics over one performance, computed once and passed
/// by value to every heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStats {
    /// Mean MIDI pitch.
    pub avg_pitch: f32,
    /// Highest minus lowest pitch.
    pub pitch_range: f32,
    /// Mean note-on velocity.
    pub avg_velocity: f32,
    /// Highest minus lowest velocity.
    pub velocity_range: f32,
    /// Population standard deviation of velocities.
    pub velocity_std: f32,
    /// Notes per second over the span of the performance.
    pub note_density: f32,
}

impl Default for DerivedStats {
    /// Documented fallbacks for an empty performance: middle C, a
    /// moderate velocity, and zero for every spread measure.
    fn default() -> Self {
        Self {
            avg_pitch: 60.0,
            pitch_range: 0.0,
            avg_velocity: 80.0,
            velocity_range: 0.0,
            velocity_std: 0.0,
            note_density: 0.0,
        }
    }
}

/// Compute [`DerivedStats`] from a performance. Empty inputs fall back
/// field by field to the defaults rather than failing.
pub fn compute(midi: &MidiData) -> DerivedStats {
    let mut stats = DerivedStats::default();
    if midi.notes.is_empty() {
        return stats;
    }

    let n = midi.notes.len() as f32;
    let pitches: Vec<f32> = midi.notes.iter().map(|note| note.pitch as f32).collect();
    let velocities: Vec<f32> = midi.notes.iter().map(|note| note.velocity as f32).collect();

    stats.avg_pitch = pitches.iter().sum::<f32>() / n;
    stats.avg_velocity = velocities.iter().sum::<f32>() / n;

    let pitch_min = pitches.iter().cloned().fold(f32::INFINITY, f32::min);
    let pitch_max = pitches.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    stats.pitch_range = pitch_max - pitch_min;

    let vel_min = velocities.iter().cloned().fold(f32::INFINITY, f32::min);
    let vel_max = velocities.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    stats.velocity_range = vel_max - vel_min;

    let variance = velocities
        .iter()
        .map(|v| (v - stats.avg_velocity).powi(2))
        .sum::<f32>()
        / n;
    stats.velocity_std = variance.sqrt();

    let first_start = midi
        .notes
        .iter()
        .map(|note| note.start)
        .fold(f64::INFINITY, f64::min);
    let last_end = midi
        .notes
        .iter()
        .map(|note| note.end)
        .fold(f64::NEG_INFINITY, f64::max);
    let span = last_end - first_start;
    // a single chord has zero span; fall back instead of dividing
    if span > 0.0 {
        stats.note_density = n / span as f32;
    }

    stats
}

/// Unison voices per oscillator from note density: sparse lines get a
/// single voice, busy ones stack up.
pub fn unison_voices(stats: DerivedStats) -> f32 {
    if stats.note_density < 1.0 {
        1.0
    } else if stats.note_density < 4.0 {
        2.0
    } else {
        4.0
    }
}

/// Amp envelope scaled from velocity statistics. Hard, even playing
/// gets a snappy envelope; soft, varied playing gets a slow pad shape.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level, 0 to 1.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

/// Derive an amp envelope from velocity statistics.
pub fn envelope_from_stats(stats: DerivedStats) -> Envelope {
    let hardness = (stats.avg_velocity / 127.0).clamp(0.0, 1.0);
    let spread = (stats.velocity_std / 40.0).clamp(0.0, 1.0);
    Envelope {
        attack: 0.05 + (1.0 - hardness) * 1.5,
        decay: 0.5 + spread * 2.0,
        sustain: 0.4 + hardness * 0.5,
        release: 0.2 + (1.0 - hardness) * 2.0,
    }
}

/// Pick a wavetable shape from the performance character: wide pitch
/// movement sounds best on brighter tables, heavy controller use asks
/// for a morphing one.
pub fn select_shape(stats: DerivedStats, midi: &MidiData) -> Shape {
    let cc_activity = midi.control_changes.len();
    let bends = midi.pitch_bends.len();

    if cc_activity > 64 {
        Shape::Chaotic
    } else if bends > 16 {
        Shape::Folded
    } else if stats.pitch_range > 24.0 {
        Shape::Saw
    } else if stats.note_density > 4.0 {
        Shape::Pulse
    } else if stats.avg_velocity > 100.0 {
        Shape::Square
    } else if stats.pitch_range > 7.0 {
        Shape::Triangle
    } else {
        Shape::Sine
    }
}

/// Choose an LFO destination from the most-used controller, if any
/// controller saw meaningful use.
pub fn lfo_destination(midi: &MidiData) -> Option<&'static str> {
    let mut counts = [0usize; 128];
    for cc in &midi.control_changes {
        counts[cc.controller as usize] += 1;
    }
    let (controller, count) = counts
        .iter()
        .enumerate()
        .max_by_key(|&(_, &count)| count)?;
    if *count < 4 {
        return None;
    }
    Some(match controller as u8 {
        1 => "osc_1_wave_frame",  // mod wheel
        10 => "osc_1_pan",        // pan
        71 => "filter_1_resonance",
        74 => "filter_1_cutoff",
        _ => "filter_1_cutoff",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(pitch: u8, velocity: u8, start: f64, end: f64) -> Note {
        Note {
            pitch,
            velocity,
            start,
            end,
        }
    }

    #[test]
    fn empty_performance_uses_documented_fallbacks() {
        let stats = compute(&MidiData::default());
        assert_eq!(stats.avg_pitch, 60.0);
        assert_eq!(stats.avg_velocity, 80.0);
        assert_eq!(stats.pitch_range, 0.0);
        assert_eq!(stats.velocity_range, 0.0);
        assert_eq!(stats.velocity_std, 0.0);
        assert_eq!(stats.note_density, 0.0);
    }

    #[test]
    fn zero_span_does_not_divide_by_zero() {
        let midi = MidiData {
            notes: vec![note(60, 100, 1.0, 1.0), note(64, 100, 1.0, 1.0)],
            ..Default::default()
        };
        let stats = compute(&midi);
        assert_eq!(stats.note_density, 0.0);
        assert_eq!(stats.avg_pitch, 62.0);
    }

    #[test]
    fn stats_match_hand_computed_values() {
        let midi = MidiData {
            notes: vec![
                note(60, 60, 0.0, 1.0),
                note(72, 100, 1.0, 2.0),
                note(48, 80, 2.0, 4.0),
            ],
            ..Default::default()
        };
        let stats = compute(&midi);
        assert_eq!(stats.avg_pitch, 60.0);
        assert_eq!(stats.pitch_range, 24.0);
        assert_eq!(stats.avg_velocity, 80.0);
        assert_eq!(stats.velocity_range, 40.0);
        // population std-dev of {60, 100, 80}
        assert!((stats.velocity_std - 16.329932).abs() < 1e-3);
        // 3 notes over 4 seconds
        assert!((stats.note_density - 0.75).abs() < 1e-6);
    }

    #[test]
    fn dominant_controller_picks_the_lfo_target() {
        let mut midi = MidiData::default();
        for i in 0..6 {
            midi.control_changes.push(ControlChange {
                controller: 74,
                value: 64,
                time: i as f64,
            });
        }
        assert_eq!(lfo_destination(&midi), Some("filter_1_cutoff"));

        // too little movement: no LFO route at all
        let quiet = MidiData::default();
        assert_eq!(lfo_destination(&quiet), None);
    }
}
