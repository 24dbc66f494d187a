//! Structured music description, as produced by the description generator

use serde::{Deserialize, Serialize};

use super::serde_helpers::{effects_list, lenient_integer, pitch_list, pitch_string};
use super::signature::{KeySignature, TimeSignature};
use crate::error::{ComposerError, Result};

pub const DEFAULT_DURATION_BEATS: f64 = 1.0;
pub const DEFAULT_NOTE_VELOCITY: i64 = 64;
pub const DEFAULT_INSTRUMENT: &str = "acoustic_grand";
pub const DEFAULT_EFFECT_VALUE: i64 = 64;
pub const DEFAULT_BEND_STEPS: i64 = 8;
pub const DEFAULT_VIBRATO_STEPS: i64 = 32;

/// Root of a description: global metadata plus a flat list of note events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicDescription {
    pub key_signature: String,
    pub tempo: f64,
    pub time_signature: String,
    pub notes: Vec<NoteEvent>,
}

impl MusicDescription {
    /// Parse and validate a description from generator JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let description: MusicDescription = serde_json::from_str(json)
            .map_err(|e| ComposerError::Description(e.to_string()))?;
        description.validate()?;
        Ok(description)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tempo.is_finite() || self.tempo <= 0.0 {
            return Err(ComposerError::Description(format!(
                "tempo must be a positive number, got {}",
                self.tempo
            )));
        }
        Ok(())
    }

    /// Time signature, falling back to 4/4 when the string does not parse
    pub fn time_signature(&self) -> TimeSignature {
        TimeSignature::parse(&self.time_signature).unwrap_or_else(|| {
            log::warn!(
                "Unparseable time signature {:?}, using 4/4",
                self.time_signature
            );
            TimeSignature::default()
        })
    }

    /// Key signature, falling back to C major when the string does not parse
    pub fn key_signature(&self) -> KeySignature {
        KeySignature::parse(&self.key_signature).unwrap_or_else(|| {
            log::warn!(
                "Unparseable key signature {:?}, using C major",
                self.key_signature
            );
            KeySignature::default()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Note,
    Chord,
    /// Anything else the generator invents; skipped by the sequencer
    #[serde(other)]
    Unknown,
}

/// One note or chord with its placement and expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,

    #[serde(default, deserialize_with = "pitch_string", skip_serializing_if = "Option::is_none")]
    pub pitch: Option<String>,

    #[serde(default, deserialize_with = "pitch_list", skip_serializing_if = "Vec::is_empty")]
    pub pitches: Vec<String>,

    /// Length in beats
    #[serde(default = "default_duration")]
    pub duration: f64,

    #[serde(default = "default_velocity", deserialize_with = "lenient_integer")]
    pub velocity: i64,

    #[serde(default = "default_instrument")]
    pub instrument: String,

    #[serde(default, deserialize_with = "lenient_integer")]
    pub channel: i64,

    /// Start position in beats from the beginning of the track
    #[serde(default)]
    pub offset: f64,

    #[serde(default, deserialize_with = "effects_list", skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_bend: Option<PitchBend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrato: Option<Vibrato>,
}

/// Borrowed view of whatever pitch data an event carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchInput<'a> {
    Single(&'a str),
    List(&'a [String]),
}

impl NoteEvent {
    /// A plain single note with every optional field at its default
    pub fn note(pitch: &str) -> Self {
        NoteEvent {
            kind: EventKind::Note,
            pitch: Some(pitch.to_string()),
            pitches: Vec::new(),
            duration: DEFAULT_DURATION_BEATS,
            velocity: DEFAULT_NOTE_VELOCITY,
            instrument: DEFAULT_INSTRUMENT.to_string(),
            channel: 0,
            offset: 0.0,
            effects: Vec::new(),
            pitch_bend: None,
            vibrato: None,
        }
    }

    /// A chord built from explicit spellings
    pub fn chord(pitches: &[&str]) -> Self {
        NoteEvent {
            kind: EventKind::Chord,
            pitch: None,
            pitches: pitches.iter().map(|p| p.to_string()).collect(),
            ..NoteEvent::note("")
        }
    }

    /// Pitch data to resolve: chords prefer `pitches`, notes prefer `pitch`,
    /// each falling back to the other field
    pub fn pitch_input(&self) -> Option<PitchInput<'_>> {
        let single = self
            .pitch
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PitchInput::Single);
        let list = (!self.pitches.is_empty()).then(|| PitchInput::List(&self.pitches));

        match self.kind {
            EventKind::Chord => list.or(single),
            _ => single.or(list),
        }
    }

    pub fn velocity(&self) -> u8 {
        self.velocity.clamp(0, 127) as u8
    }

    /// Declared channel, or None when outside 0..=15
    pub fn declared_channel(&self) -> Option<u8> {
        (0..=15).contains(&self.channel).then_some(self.channel as u8)
    }

    pub fn offset_beats(&self) -> f64 {
        non_negative(self.offset)
    }

    pub fn duration_beats(&self) -> f64 {
        non_negative(self.duration)
    }
}

/// Controller effect applied at the start of a note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default = "default_effect_value", deserialize_with = "lenient_integer")]
    pub value: i64,
}

impl Effect {
    pub fn value(&self) -> u8 {
        self.value.clamp(0, 127) as u8
    }
}

/// Linear pitch-wheel glide across the note
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchBend {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default = "default_bend_steps", deserialize_with = "lenient_integer")]
    pub steps: i64,
}

/// Sinusoidal pitch-wheel modulation across the note
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vibrato {
    #[serde(default)]
    pub depth: f64,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub speed: i64,
    #[serde(default = "default_vibrato_steps", deserialize_with = "lenient_integer")]
    pub steps: i64,
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn default_duration() -> f64 {
    DEFAULT_DURATION_BEATS
}

fn default_velocity() -> i64 {
    DEFAULT_NOTE_VELOCITY
}

fn default_instrument() -> String {
    DEFAULT_INSTRUMENT.to_string()
}

fn default_effect_value() -> i64 {
    DEFAULT_EFFECT_VALUE
}

fn default_bend_steps() -> i64 {
    DEFAULT_BEND_STEPS
}

fn default_vibrato_steps() -> i64 {
    DEFAULT_VIBRATO_STEPS
}
