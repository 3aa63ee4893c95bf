use midly::{
    num::*, Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, TrackEvent,
    TrackEventKind,
};

use virus2vital::{midi, sysex};

#[test]
fn smf_demultiplexes_into_sysex_events_and_performance_tables() {
    let mut dump = vec![0u8; 266];
    dump[5] = sysex::SINGLE_DUMP_ID;
    for (i, byte) in dump[8..264].iter_mut().enumerate() {
        *byte = (i % 128) as u8;
    }

    let track = vec![
        TrackEvent {
            delta: u28::from(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::from(500_000))),
        },
        TrackEvent {
            delta: u28::from(0),
            kind: TrackEventKind::SysEx(&dump),
        },
        TrackEvent {
            delta: u28::from(0),
            kind: TrackEventKind::Midi {
                channel: u4::from(0),
                message: MidiMessage::NoteOn {
                    key: u7::from(60),
                    vel: u7::from(100),
                },
            },
        },
        TrackEvent {
            delta: u28::from(240),
            kind: TrackEventKind::Midi {
                channel: u4::from(0),
                message: MidiMessage::Controller {
                    controller: u7::from(74),
                    value: u7::from(90),
                },
            },
        },
        TrackEvent {
            delta: u28::from(0),
            kind: TrackEventKind::Midi {
                channel: u4::from(0),
                message: MidiMessage::PitchBend {
                    bend: PitchBend(u14::from(10000)),
                },
            },
        },
        TrackEvent {
            // 480 ticks at 120 BPM and 480 tpb is half a second total
            delta: u28::from(240),
            kind: TrackEventKind::Midi {
                channel: u4::from(0),
                message: MidiMessage::NoteOff {
                    key: u7::from(60),
                    vel: u7::from(0),
                },
            },
        },
        TrackEvent {
            delta: u28::from(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ];

    let header = Header::new(Format::SingleTrack, Timing::Metrical(u15::from(480)));
    let mut smf = Smf::new(header);
    smf.tracks.push(track);

    let path = std::env::temp_dir().join("virus2vital_smf_test.mid");
    smf.save(&path).unwrap();
    let (events, data) = midi::read_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let blocks = sysex::extract_blocks(&events);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].get(0), 0);
    assert_eq!(blocks[0].get(5), 5);

    assert_eq!(data.notes.len(), 1);
    let note = data.notes[0];
    assert_eq!(note.pitch, 60);
    assert_eq!(note.velocity, 100);
    assert!((note.end - note.start - 0.5).abs() < 1e-6);

    assert_eq!(data.control_changes.len(), 1);
    assert_eq!(data.control_changes[0].controller, 74);

    assert_eq!(data.pitch_bends.len(), 1);
    assert_eq!(data.pitch_bends[0].value, 10000 - 8192);
}

#[test]
fn garbage_bytes_are_not_a_midi_file() {
    assert!(midi::read_bytes(b"definitely not midi").is_err());
}
