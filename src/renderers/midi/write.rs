use std::path::Path;

use midly::num::u14;
use midly::{
    Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, Track, TrackEvent,
    TrackEventKind,
};

use super::defaults::MAX_TPQ;
use super::model::{ChannelMessage, SequencedScore, SequencedTrack};
use crate::error::{ComposerError, Result};

/// Write a sequenced score as a Standard MIDI File (SMF) Format 1
pub fn write_smf(score: &SequencedScore, out: &mut Vec<u8>) -> Result<()> {
    if score.ticks_per_beat == 0 || score.ticks_per_beat > MAX_TPQ {
        return Err(ComposerError::Midi(format!(
            "division of {} ticks per beat does not fit the header",
            score.ticks_per_beat
        )));
    }

    let mut tracks = Vec::with_capacity(score.tracks.len() + 1);

    // Track 0: Tempo, time signature and key signature
    tracks.push(build_conductor_track(score));

    // Tracks 1+: One per (instrument, channel) group
    for track in &score.tracks {
        tracks.push(build_channel_track(track));
    }

    let header = Header {
        format: Format::Parallel,
        timing: Timing::Metrical(score.ticks_per_beat.into()),
    };

    let smf = Smf { header, tracks };

    smf.write(out)
        .map_err(|e| ComposerError::Midi(format!("Failed to write MIDI: {}", e)))?;

    Ok(())
}

/// Serialize `score` and write it to `path`, replacing any previous file
pub fn save_smf(score: &SequencedScore, path: &Path) -> Result<()> {
    let mut out = Vec::new();
    write_smf(score, &mut out)?;
    std::fs::write(path, &out).map_err(|e| ComposerError::io(path, e))?;
    log::info!("MIDI file created: {}", path.display());
    Ok(())
}

fn build_conductor_track<'a>(score: &SequencedScore) -> Track<'a> {
    let time_signature = score.time_signature;
    let key_signature = score.key_signature;

    vec![
        TrackEvent {
            delta: 0.into(),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(score.microseconds_per_beat().into())),
        },
        TrackEvent {
            delta: 0.into(),
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
                time_signature.numerator,
                time_signature.denominator_power(),
                24, // MIDI clocks per metronome click
                8,  // 32nd notes per quarter note
            )),
        },
        TrackEvent {
            delta: 0.into(),
            kind: TrackEventKind::Meta(MetaMessage::KeySignature(
                key_signature.sharps,
                key_signature.minor,
            )),
        },
        end_of_track(),
    ]
}

fn build_channel_track<'a>(track: &SequencedTrack) -> Track<'a> {
    let channel = track.channel().into();

    let mut events: Vec<TrackEvent<'a>> = track
        .events
        .iter()
        .map(|event| TrackEvent {
            delta: event.delta.into(),
            kind: TrackEventKind::Midi {
                channel,
                message: midi_message(event.message),
            },
        })
        .collect();

    events.push(end_of_track());
    events
}

fn midi_message(message: ChannelMessage) -> MidiMessage {
    match message {
        ChannelMessage::ProgramChange { program } => MidiMessage::ProgramChange {
            program: program.into(),
        },
        ChannelMessage::ControlChange { controller, value } => MidiMessage::Controller {
            controller: controller.into(),
            value: value.into(),
        },
        ChannelMessage::PitchBend { value } => MidiMessage::PitchBend {
            bend: pitch_bend(value),
        },
        ChannelMessage::NoteOn { key, velocity } => MidiMessage::NoteOn {
            key: key.into(),
            vel: velocity.into(),
        },
        ChannelMessage::NoteOff { key } => MidiMessage::NoteOff {
            key: key.into(),
            vel: 0.into(),
        },
    }
}

/// Signed wheel value (-8192..=8191) to the 14-bit wire value (center 0x2000)
fn pitch_bend(value: i16) -> PitchBend {
    let raw = (value.clamp(-8192, 8191) as i32 + 0x2000) as u16;
    PitchBend(u14::new(raw))
}

fn end_of_track<'a>() -> TrackEvent<'a> {
    TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}
