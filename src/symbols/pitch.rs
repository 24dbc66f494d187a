//! Pitch spellings and chord names to MIDI note numbers
//!
//! Accepted forms:
//!   "60"            → [60]            (bare note number)
//!   "C4", "F#3"     → [60], [54]      (letter, accidental, octave; octave defaults to 4)
//!   "B-4", "Ebb5"   → [70], [74]      ('-' is a flat, as in music21 spellings)
//!   "Cmaj7", "Am"   → [60, 64, 67, 71], [69, 72, 76]  (chord names, root in octave 4)
//!   "C4 E4 G4"      → [60, 64, 67]    (space or comma separated)
//!
//! Any token that fails to parse makes the whole input resolve to nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::PitchInput;

/// Octave used when a spelling or chord root does not name one
pub const DEFAULT_OCTAVE: i32 = 4;

static SPELLING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Ga-g])(##|bb|--|#|b|-|x|♯|♭)?(\d{1,2})?$").expect("valid spelling pattern")
});

static CHORD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Ga-g])(#|b|-|♯|♭)?(.*)$").expect("valid chord pattern"));

/// Chord qualities as semitone offsets from the root
const CHORD_QUALITIES: &[(&str, &[i32])] = &[
    ("", &[0, 4, 7]),
    ("maj", &[0, 4, 7]),
    ("M", &[0, 4, 7]),
    ("major", &[0, 4, 7]),
    ("m", &[0, 3, 7]),
    ("min", &[0, 3, 7]),
    ("minor", &[0, 3, 7]),
    ("dim", &[0, 3, 6]),
    ("°", &[0, 3, 6]),
    ("aug", &[0, 4, 8]),
    ("+", &[0, 4, 8]),
    ("sus2", &[0, 2, 7]),
    ("sus4", &[0, 5, 7]),
    ("sus", &[0, 5, 7]),
    ("maj6", &[0, 4, 7, 9]),
    ("m6", &[0, 3, 7, 9]),
    ("dom7", &[0, 4, 7, 10]),
    ("maj7", &[0, 4, 7, 11]),
    ("M7", &[0, 4, 7, 11]),
    ("m7", &[0, 3, 7, 10]),
    ("min7", &[0, 3, 7, 10]),
    ("mmaj7", &[0, 3, 7, 11]),
    ("dim7", &[0, 3, 6, 9]),
    ("°7", &[0, 3, 6, 9]),
    ("m7b5", &[0, 3, 6, 10]),
    ("ø", &[0, 3, 6, 10]),
    ("aug7", &[0, 4, 8, 10]),
    ("add9", &[0, 4, 7, 14]),
    ("dom9", &[0, 4, 7, 10, 14]),
    ("maj9", &[0, 4, 7, 11, 14]),
    ("m9", &[0, 3, 7, 10, 14]),
];

fn step_semitone(step: char) -> i32 {
    match step.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => 0,
    }
}

fn accidental_offset(accidental: &str) -> i32 {
    match accidental {
        "#" | "♯" => 1,
        "##" | "x" => 2,
        "b" | "-" | "♭" => -1,
        "bb" | "--" => -2,
        _ => 0,
    }
}

/// MIDI note number with C4 = 60, or None outside 0..=127
fn midi_number(step: char, alter: i32, octave: i32) -> Option<u8> {
    let number = step_semitone(step) + alter + (octave + 1) * 12;
    u8::try_from(number).ok().filter(|n| *n <= 127)
}

/// Parse anything shaped like a spelling. The outer None means the text is
/// not a spelling at all; the inner None means its note is out of range.
fn parse_spelling(spelling: &str) -> Option<Option<u8>> {
    let caps = SPELLING.captures(spelling.trim())?;
    let step = caps[1].chars().next()?;
    let alter = caps.get(2).map_or(0, |m| accidental_offset(m.as_str()));
    let octave = match caps.get(3) {
        Some(m) => m.as_str().parse::<i32>().ok()?,
        None => DEFAULT_OCTAVE,
    };
    Some(midi_number(step, alter, octave))
}

/// Convert a single spelling such as "C#4" to its note number
pub fn spelling_to_midi(spelling: &str) -> Option<u8> {
    parse_spelling(spelling).flatten()
}

/// Expand a chord name such as "Dm7" with its root in [`DEFAULT_OCTAVE`]
pub fn chord_name_to_midi(name: &str) -> Option<Vec<u8>> {
    let caps = CHORD_NAME.captures(name.trim())?;
    let step = caps[1].chars().next()?;
    let alter = caps.get(2).map_or(0, |m| accidental_offset(m.as_str()));
    let root = midi_number(step, alter, DEFAULT_OCTAVE)?;

    let quality = caps.get(3).map_or("", |m| m.as_str());
    let (_, intervals) = CHORD_QUALITIES.iter().find(|(q, _)| *q == quality)?;

    intervals
        .iter()
        .map(|interval| u8::try_from(root as i32 + interval).ok().filter(|n| *n <= 127))
        .collect()
}

fn resolve_token(token: &str) -> Option<Vec<u8>> {
    if let Ok(number) = token.parse::<i64>() {
        return (0..=127).contains(&number).then(|| vec![number as u8]);
    }
    // Spellings take precedence over chord names: "C7" is a note in octave
    // 7, and an out-of-range spelling such as "A9" is a miss, not a chord
    if let Some(number) = parse_spelling(token) {
        return number.map(|n| vec![n]);
    }
    chord_name_to_midi(token)
}

/// Resolve pitch data to note numbers; empty when anything fails to parse
pub fn resolve_pitch(input: PitchInput<'_>) -> Vec<u8> {
    let tokens: Vec<&str> = match input {
        PitchInput::Single(text) => split_tokens(text).collect(),
        PitchInput::List(items) => items.iter().flat_map(|item| split_tokens(item)).collect(),
    };

    let mut notes = Vec::with_capacity(tokens.len());
    for token in tokens {
        match resolve_token(token) {
            Some(numbers) => notes.extend(numbers),
            None => {
                log::debug!("Unparseable pitch token {:?}", token);
                return Vec::new();
            }
        }
    }
    notes
}

pub(crate) fn split_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
}
