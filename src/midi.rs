//! Standard MIDI File boundary: demultiplexes tracks into the flat
//! tables the converter consumes.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::features::{ControlChange, MidiData, Note, PitchBend};
use crate::sysex::{EventKind, TrackEvent};

/// Microseconds per beat before any tempo event, per the MIDI spec.
const DEFAULT_TEMPO: f64 = 500_000.0;

/// Read a Standard MIDI File and demultiplex it into the flat event and
/// performance tables the converter consumes.
pub fn read_file(path: &Path) -> Result<(Vec<TrackEvent>, MidiData)> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read MIDI file '{}'", path.display()))?;
    read_bytes(&bytes)
}

/// Parse raw MIDI file bytes. Sysex payloads are returned verbatim (sans
/// the 0xF0 status byte, as framed on the wire); notes, control changes
/// and pitch bends land in [`MidiData`] with absolute times in seconds.
pub fn read_bytes(bytes: &[u8]) -> Result<(Vec<TrackEvent>, MidiData)> {
    let smf = Smf::parse(bytes).context("not a standard MIDI file")?;

    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(tpb) => Some(tpb.as_int() as f64),
        Timing::Timecode(..) => None,
    };
    let fixed_tick_seconds = match smf.header.timing {
        Timing::Metrical(_) => None,
        Timing::Timecode(fps, subframe) => Some(1.0 / (fps.as_f32() as f64 * subframe as f64)),
    };

    let mut events = Vec::new();
    let mut midi = MidiData::default();

    for track in &smf.tracks {
        let mut time = 0.0f64;
        let mut tempo = DEFAULT_TEMPO;
        // (channel, key) -> (start time, velocity)
        let mut open_notes: HashMap<(u8, u8), (f64, u8)> = HashMap::new();

        for event in track {
            let tick_seconds = fixed_tick_seconds
                .unwrap_or_else(|| tempo / 1_000_000.0 / ticks_per_beat.unwrap_or(480.0));
            time += event.delta.as_int() as f64 * tick_seconds;

            match event.kind {
                TrackEventKind::SysEx(data) => {
                    events.push(TrackEvent {
                        kind: EventKind::SysEx,
                        data: data.to_vec(),
                    });
                }
                TrackEventKind::Meta(MetaMessage::Tempo(us_per_beat)) => {
                    tempo = us_per_beat.as_int() as f64;
                }
                TrackEventKind::Midi { channel, message } => {
                    let channel = channel.as_int();
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            open_notes.insert((channel, key.as_int()), (time, vel.as_int()));
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            if let Some((start, velocity)) =
                                open_notes.remove(&(channel, key.as_int()))
                            {
                                midi.notes.push(Note {
                                    pitch: key.as_int(),
                                    velocity,
                                    start,
                                    end: time,
                                });
                            }
                        }
                        MidiMessage::Controller { controller, value } => {
                            midi.control_changes.push(ControlChange {
                                controller: controller.as_int(),
                                value: value.as_int(),
                                time,
                            });
                        }
                        MidiMessage::PitchBend { bend } => {
                            midi.pitch_bends.push(PitchBend {
                                value: bend.as_int(),
                                time,
                            });
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // close notes left hanging at end of track
        for ((_, key), (start, velocity)) in open_notes {
            midi.notes.push(Note {
                pitch: key,
                velocity,
                start,
                end: time,
            });
        }
    }

    midi.notes
        .sort_by(|a, b| a.start.partial_cmp(&b.start).expect("note times are finite"));

    Ok((events, midi))
}
