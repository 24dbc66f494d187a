use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use music_composer::renderers::midi::{ChannelSubstitution, PERCUSSION_CHANNEL};
use music_composer::{description_to_midi, MusicDescription, SequenceReport, SequencerOptions};

/// Channel messages of one track with their delta times
type Track = Vec<(u32, u8, MidiMessage)>;

/// Helper: sequence a description JSON and parse the written bytes back
fn render(json: &str) -> (Vec<Track>, SequenceReport, Vec<u8>) {
    render_with(json, &SequencerOptions::default())
}

fn render_with(json: &str, options: &SequencerOptions) -> (Vec<Track>, SequenceReport, Vec<u8>) {
    let description = MusicDescription::from_json(json).expect("description should parse");
    let (bytes, report) = description_to_midi(&description, options).expect("sequencing failed");

    let smf = Smf::parse(&bytes).expect("written MIDI should parse");
    let tracks = smf
        .tracks
        .iter()
        .skip(1)
        .map(|track| {
            assert!(
                matches!(track.last().map(|e| e.kind), Some(TrackEventKind::Meta(MetaMessage::EndOfTrack))),
                "every track ends with End-of-Track"
            );
            track
                .iter()
                .filter_map(|event| match event.kind {
                    TrackEventKind::Midi { channel, message } => {
                        Some((event.delta.as_int(), channel.as_int(), message))
                    }
                    _ => None,
                })
                .collect()
        })
        .collect();

    (tracks, report, bytes)
}

fn song(notes: &str) -> String {
    format!(
        r#"{{"key_signature": "C major", "tempo": 120, "time_signature": "4/4", "notes": [{}]}}"#,
        notes
    )
}

fn absolute_ticks(track: &Track) -> Vec<u32> {
    track
        .iter()
        .scan(0u32, |tick, (delta, _, _)| {
            *tick += delta;
            Some(*tick)
        })
        .collect()
}

#[test]
fn test_single_note_reference_output() {
    let (tracks, _, bytes) = render(&song(r#"{"type": "note", "pitch": "C4"}"#));
    let smf = Smf::parse(&bytes).unwrap();

    assert_eq!(smf.header.timing, Timing::Metrical(midly::num::u15::new(480)));
    assert_eq!(smf.tracks.len(), 2);
    assert_eq!(
        tracks[0],
        vec![
            (0, 0, MidiMessage::ProgramChange { program: 0.into() }),
            (0, 0, MidiMessage::NoteOn { key: 60.into(), vel: 64.into() }),
            (480, 0, MidiMessage::NoteOff { key: 60.into(), vel: 0.into() }),
        ]
    );
}

#[test]
fn test_conductor_track() {
    let json = r#"{"key_signature": "D major", "tempo": 90, "time_signature": "6/8", "notes": []}"#;
    let description = MusicDescription::from_json(json).unwrap();
    let (bytes, _) = description_to_midi(&description, &SequencerOptions::default()).unwrap();
    let smf = Smf::parse(&bytes).unwrap();

    let metas: Vec<MetaMessage> = smf.tracks[0]
        .iter()
        .filter_map(|e| match e.kind {
            TrackEventKind::Meta(meta) => Some(meta),
            _ => None,
        })
        .collect();
    assert!(metas.contains(&MetaMessage::Tempo(midly::num::u24::new(666_667))));
    assert!(metas.contains(&MetaMessage::TimeSignature(6, 3, 24, 8)));
    assert!(metas.contains(&MetaMessage::KeySignature(2, false)));
}

#[test]
fn test_unparseable_time_signature_defaults_to_four_four() {
    let json = r#"{"key_signature": "C major", "tempo": 120, "time_signature": "waltz", "notes": []}"#;
    let description = MusicDescription::from_json(json).unwrap();
    let (bytes, _) = description_to_midi(&description, &SequencerOptions::default()).unwrap();
    let smf = Smf::parse(&bytes).unwrap();

    assert!(smf.tracks[0].iter().any(|e| matches!(
        e.kind,
        TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8))
    )));
}

#[test]
fn test_chord_delta_layout() {
    let (tracks, _, _) = render(&song(
        r#"{"type": "note", "pitch": "A3"},
           {"type": "chord", "pitches": ["C4", "E4", "G4"], "offset": 2, "duration": 1.5}"#,
    ));
    let chord: Vec<(u32, MidiMessage)> = tracks[0][3..].iter().map(|(d, _, m)| (*d, *m)).collect();

    assert_eq!(
        chord,
        vec![
            (480, MidiMessage::NoteOn { key: 60.into(), vel: 64.into() }),
            (0, MidiMessage::NoteOn { key: 64.into(), vel: 64.into() }),
            (0, MidiMessage::NoteOn { key: 67.into(), vel: 64.into() }),
            (720, MidiMessage::NoteOff { key: 60.into(), vel: 0.into() }),
            (0, MidiMessage::NoteOff { key: 64.into(), vel: 0.into() }),
            (0, MidiMessage::NoteOff { key: 67.into(), vel: 0.into() }),
        ]
    );
}

#[test]
fn test_absolute_times_non_decreasing_with_overlaps() {
    let (tracks, _, _) = render(&song(
        r#"{"type": "note", "pitch": "C4", "offset": 3, "duration": 1},
           {"type": "note", "pitch": "E4", "offset": 0, "duration": 8},
           {"type": "chord", "pitch": "Am", "offset": 1, "duration": 0.5},
           {"type": "note", "pitch": "G4", "offset": 1, "duration": 4}"#,
    ));
    let ticks = absolute_ticks(&tracks[0]);

    assert!(ticks.windows(2).all(|w| w[0] <= w[1]), "ticks went backwards: {:?}", ticks);
    assert_eq!(ticks.last(), Some(&3840));
}

#[test]
fn test_sequential_notes_do_not_drift() {
    let notes: Vec<String> = (0..16)
        .map(|i| format!(r#"{{"type": "note", "pitch": "C4", "offset": {}, "duration": 0.5}}"#, i as f64 * 0.5))
        .collect();
    let (tracks, _, _) = render(&song(&notes.join(",")));

    let note_on_ticks: Vec<u32> = absolute_ticks(&tracks[0])
        .into_iter()
        .zip(&tracks[0])
        .filter(|(_, (_, _, m))| matches!(m, MidiMessage::NoteOn { .. }))
        .map(|(tick, _)| tick)
        .collect();
    let expected: Vec<u32> = (0..16).map(|i| i * 240).collect();
    assert_eq!(note_on_ticks, expected);
}

#[test]
fn test_percussion_forced_to_channel_nine() {
    let (tracks, _, _) = render(&song(
        r#"{"type": "note", "pitch": "C4", "instrument": "Snare", "channel": 3, "duration": 0.25}"#,
    ));

    assert_eq!(tracks.len(), 1);
    assert!(tracks[0].iter().all(|(_, channel, _)| *channel == PERCUSSION_CHANNEL));
    assert!(!tracks[0]
        .iter()
        .any(|(_, _, m)| matches!(m, MidiMessage::ProgramChange { .. })));
    assert_eq!(
        tracks[0][0].2,
        MidiMessage::NoteOn { key: 38.into(), vel: 64.into() }
    );
}

#[test]
fn test_melodic_instrument_moved_off_channel_nine() {
    let json = song(
        r#"{"type": "note", "pitch": "C4", "instrument": "piano", "channel": 0},
           {"type": "note", "pitch": "E4", "instrument": "violin", "channel": 9}"#,
    );

    for policy in [ChannelSubstitution::LowestAvailable, ChannelSubstitution::Random] {
        let options = SequencerOptions {
            channel_substitution: policy,
            ..SequencerOptions::default()
        };
        let (tracks, _, _) = render_with(&json, &options);
        let violin_channel = tracks[1][0].1;

        assert_ne!(violin_channel, PERCUSSION_CHANNEL);
        assert!(violin_channel <= 15);
        assert_eq!(tracks[1][0].2, MidiMessage::ProgramChange { program: 40.into() });
    }

    let (tracks, _, _) = render(&json);
    assert_eq!(tracks[1][0].1, 1);
}

#[test]
fn test_unknown_instrument_uses_program_zero() {
    let (tracks, _, _) = render(&song(
        r#"{"type": "note", "pitch": "C4", "instrument": "hurdy gurdy deluxe"}"#,
    ));
    assert_eq!(tracks[0][0].2, MidiMessage::ProgramChange { program: 0.into() });
}

#[test]
fn test_tracks_in_first_appearance_order() {
    let (tracks, _, _) = render(&song(
        r#"{"type": "note", "pitch": "C3", "instrument": "cello", "channel": 2},
           {"type": "note", "pitch": "C4", "instrument": "kick"},
           {"type": "note", "pitch": "C5", "instrument": "flute", "channel": 4},
           {"type": "note", "pitch": "D3", "instrument": "Cello", "channel": 2, "offset": 1}"#,
    ));
    let channels: Vec<u8> = tracks.iter().map(|t| t[0].1).collect();

    assert_eq!(channels, vec![2, 9, 4]);
    let cello_notes = tracks[0]
        .iter()
        .filter(|(_, _, m)| matches!(m, MidiMessage::NoteOn { .. }))
        .count();
    assert_eq!(cello_notes, 2);
}

#[test]
fn test_effects_and_bends_on_the_wire() {
    let (tracks, report, _) = render(&song(
        r#"{"type": "note", "pitch": "C4", "duration": 1,
            "effects": [{"type": "modulation", "value": 90}, {"type": "wah"}],
            "pitch_bend": {"start": -1, "end": 1, "steps": 2}}"#,
    ));
    let messages: Vec<(u32, MidiMessage)> = tracks[0].iter().map(|(d, _, m)| (*d, *m)).collect();

    assert_eq!(report.effects_dropped, 1);
    assert_eq!(
        messages[1],
        (0, MidiMessage::Controller { controller: 1.into(), value: 90.into() })
    );
    let bends: Vec<(u32, u16)> = messages
        .iter()
        .filter_map(|(d, m)| match m {
            MidiMessage::PitchBend { bend } => Some((*d, bend.0.as_int())),
            _ => None,
        })
        .collect();
    assert_eq!(bends, vec![(0, 1), (240, 0x2000), (240, 0x3FFF), (0, 0x2000)]);
}

#[test]
fn test_effects_none_spellings() {
    let (tracks, report, _) = render(&song(
        r#"{"type": "note", "pitch": "C4", "effects": "none"},
           {"type": "note", "pitch": "D4", "effects": [], "offset": 1},
           {"type": "note", "pitch": "E4", "effects": null, "offset": 2}"#,
    ));

    assert_eq!(report.events_sequenced, 3);
    assert!(!tracks[0]
        .iter()
        .any(|(_, _, m)| matches!(m, MidiMessage::Controller { .. })));
}

#[test]
fn test_bad_events_are_skipped_not_fatal() {
    let (tracks, report, _) = render(&song(
        r#"{"type": "note", "pitch": "not a pitch"},
           {"type": "rest", "duration": 1},
           {"type": "note", "pitch": "C4", "velocity": 300, "offset": 1},
           {"type": "note", "pitch": "didgeridoo", "instrument": "drums", "offset": 2}"#,
    ));

    assert_eq!(
        report,
        SequenceReport {
            events_total: 4,
            events_sequenced: 1,
            events_skipped: 3,
            effects_dropped: 0,
        }
    );
    assert_eq!(tracks.len(), 1);
    assert_eq!(
        tracks[0][1],
        (480, 0, MidiMessage::NoteOn { key: 60.into(), vel: 127.into() })
    );
}

#[test]
fn test_invalid_tempo_rejected() {
    let json = r#"{"key_signature": "C major", "tempo": -5, "time_signature": "4/4", "notes": []}"#;
    assert!(MusicDescription::from_json(json).is_err());
}

#[test]
fn test_resolution_follows_options() {
    let options = SequencerOptions {
        ticks_per_beat: 96,
        ..SequencerOptions::default()
    };
    let (tracks, _, bytes) = render_with(&song(r#"{"type": "note", "pitch": "C4", "duration": 2}"#), &options);
    let smf = Smf::parse(&bytes).unwrap();

    assert_eq!(smf.header.timing, Timing::Metrical(midly::num::u15::new(96)));
    assert_eq!(tracks[0][2].0, 192);
}

#[test]
fn test_resolution_outside_header_range_is_an_error() {
    let description = MusicDescription::from_json(&song(r#"{"type": "note", "pitch": "C4"}"#)).unwrap();

    for ticks_per_beat in [0u16, 40_000] {
        let options = SequencerOptions {
            ticks_per_beat,
            ..SequencerOptions::default()
        };
        assert!(
            matches!(
                description_to_midi(&description, &options),
                Err(music_composer::ComposerError::Config(_))
            ),
            "ticks_per_beat {} should not produce a file",
            ticks_per_beat
        );
    }
}
