//! Lean Internal Representation for description → MIDI conversion
//!
//! Holds exactly what the SMF writer needs: conductor metadata and, per
//! track, the channel messages with their delta times already computed.

use crate::models::{KeySignature, TimeSignature};

use super::router::TrackKey;

#[derive(Debug, Clone, PartialEq)]
pub struct SequencedScore {
    pub ticks_per_beat: u16,
    pub tempo_bpm: f64,
    pub time_signature: TimeSignature,
    pub key_signature: KeySignature,
    pub tracks: Vec<SequencedTrack>, // Creation order = file order
}

impl SequencedScore {
    /// Tempo meta-event value, limited to what the 24-bit field can hold
    pub fn microseconds_per_beat(&self) -> u32 {
        (60_000_000.0 / self.tempo_bpm).round().clamp(1.0, 0x00FF_FFFF as f64) as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequencedTrack {
    pub key: TrackKey,
    pub percussion: bool,
    pub events: Vec<TimedEvent>,
}

impl SequencedTrack {
    pub fn channel(&self) -> u8 {
        self.key.channel
    }

    /// Absolute tick of every event, recovered from the deltas
    pub fn absolute_ticks(&self) -> Vec<u64> {
        self.events
            .iter()
            .scan(0u64, |tick, event| {
                *tick += event.delta as u64;
                Some(*tick)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub delta: u32, // Ticks since the previous event on the same track
    pub message: ChannelMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMessage {
    ProgramChange { program: u8 },
    ControlChange { controller: u8, value: u8 },
    PitchBend { value: i16 }, // -8192..=8191, 0 = center
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8 },
}

/// Convert a length in beats to MIDI ticks
///
/// # Arguments
/// * `beats` - Length or position in beats (negative values count as 0)
/// * `ticks_per_beat` - MIDI ticks per quarter note
///
/// # Returns
/// Ticks, rounded to the nearest tick
pub fn beats_to_ticks(beats: f64, ticks_per_beat: u16) -> u64 {
    if !beats.is_finite() || beats <= 0.0 {
        return 0;
    }
    (beats * ticks_per_beat as f64).round() as u64
}
