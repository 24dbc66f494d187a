//! General MIDI percussion key map (channel 10, index 9)

use once_cell::sync::Lazy;

use super::pitch::{spelling_to_midi, split_tokens};
use super::{normalize_name, SymbolTable};
use crate::models::PitchInput;

const VOICES: &[(&str, u8)] = &[
    ("acoustic_bass_drum", 35),
    ("bass_drum", 36),
    ("side_stick", 37),
    ("acoustic_snare", 38),
    ("hand_clap", 39),
    ("electric_snare", 40),
    ("low_floor_tom", 41),
    ("closed_hi_hat", 42),
    ("high_floor_tom", 43),
    ("pedal_hi_hat", 44),
    ("low_tom", 45),
    ("open_hi_hat", 46),
    ("low_mid_tom", 47),
    ("hi_mid_tom", 48),
    ("crash_cymbal_1", 49),
    ("high_tom", 50),
    ("ride_cymbal_1", 51),
    ("chinese_cymbal", 52),
    ("ride_bell", 53),
    ("tambourine", 54),
    ("splash_cymbal", 55),
    ("cowbell", 56),
    ("crash_cymbal_2", 57),
    ("vibraslap", 58),
    ("ride_cymbal_2", 59),
    ("hi_bongo", 60),
    ("low_bongo", 61),
    ("mute_hi_conga", 62),
    ("open_hi_conga", 63),
    ("low_conga", 64),
    ("high_timbale", 65),
    ("low_timbale", 66),
    ("high_agogo", 67),
    ("low_agogo", 68),
    ("cabasa", 69),
    ("maracas", 70),
    ("short_whistle", 71),
    ("long_whistle", 72),
    ("short_guiro", 73),
    ("long_guiro", 74),
    ("claves", 75),
    ("hi_wood_block", 76),
    ("low_wood_block", 77),
    ("mute_cuica", 78),
    ("open_cuica", 79),
    ("mute_triangle", 80),
    ("open_triangle", 81),
];

const ALIASES: &[(&str, &str)] = &[
    ("kick", "bass_drum"),
    ("kick_drum", "bass_drum"),
    ("snare", "acoustic_snare"),
    ("snare_drum", "acoustic_snare"),
    ("rimshot", "side_stick"),
    ("hh_closed", "closed_hi_hat"),
    ("hh_open", "open_hi_hat"),
    ("hh_pedal", "pedal_hi_hat"),
    ("hi_hat", "closed_hi_hat"),
    ("hihat", "closed_hi_hat"),
    ("chh", "closed_hi_hat"),
    ("ohh", "open_hi_hat"),
    ("tom_low", "low_tom"),
    ("tom_mid", "low_mid_tom"),
    ("tom_high", "high_tom"),
    ("crash", "crash_cymbal_1"),
    ("crash_cymbal", "crash_cymbal_1"),
    ("ride", "ride_cymbal_1"),
    ("ride_cymbal", "ride_cymbal_1"),
    ("splash", "splash_cymbal"),
    ("clap", "hand_clap"),
    ("tamb", "tambourine"),
    ("conga_hi", "open_hi_conga"),
    ("conga_lo", "low_conga"),
    ("cow", "cowbell"),
    ("shaker", "maracas"),
    ("triangle", "open_triangle"),
];

/// Names for a whole kit rather than a single voice; events on such tracks
/// name their voices in the pitch field
const KIT_NAMES: &[&str] = &["drums", "drum_kit", "drumkit", "drum_set", "kit", "standard_kit"];

static PERCUSSION: Lazy<SymbolTable> = Lazy::new(|| SymbolTable::new(VOICES, ALIASES));

pub fn is_drum_kit(name: &str) -> bool {
    KIT_NAMES.contains(&normalize_name(name).as_str())
}

/// True when `name` belongs on the percussion channel
pub fn is_percussion(name: &str) -> bool {
    PERCUSSION.contains(name) || is_drum_kit(name)
}

/// Percussion key for a voice name or alias; None for unknown names and for
/// whole-kit names
pub fn resolve_percussion(name: &str) -> Option<u8> {
    PERCUSSION.lookup(name)
}

/// Keys for the voices a drum-kit event names: voice names, aliases, note
/// numbers or spellings. Empty when any voice is unknown.
pub fn resolve_kit_voices(input: PitchInput<'_>) -> Vec<u8> {
    let voices: Vec<&str> = match input {
        PitchInput::Single(text) if PERCUSSION.contains(text) => vec![text],
        PitchInput::Single(text) => split_tokens(text).collect(),
        PitchInput::List(items) => items.iter().map(String::as_str).collect(),
    };

    voices
        .into_iter()
        .map(|voice| {
            resolve_percussion(voice)
                .or_else(|| voice.trim().parse::<u8>().ok().filter(|key| *key <= 127))
                .or_else(|| spelling_to_midi(voice))
        })
        .collect::<Option<Vec<u8>>>()
        .unwrap_or_default()
}

pub fn list_percussion() -> Vec<(&'static str, u8)> {
    PERCUSSION.entries()
}
