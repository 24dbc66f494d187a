//! Description-to-MIDI conversion module
//!
//! Turns a parsed [`MusicDescription`] into Standard MIDI File bytes.
//!
//! # Pipeline
//! - **Routing**: events are grouped into tracks by (instrument, channel)
//! - **Sequencing**: names resolve to codes, modulation expands to
//!   pitch-wheel points and each track is delta-encoded
//! - **Writing**: a Format 1 file with a conductor track plus one track per group
//!
//! # Usage
//! ```rust,ignore
//! use music_composer::models::MusicDescription;
//! use music_composer::renderers::midi::{description_to_midi, SequencerOptions};
//!
//! let description = MusicDescription::from_json(&json)?;
//! let (bytes, report) = description_to_midi(&description, &SequencerOptions::default())?;
//! ```

pub mod defaults;
pub mod model;
pub mod modulation;
pub mod router;
pub mod sequencer;
pub mod write;

pub use defaults::{DEFAULT_TPQ, PERCUSSION_CHANNEL};
pub use model::{ChannelMessage, SequencedScore, SequencedTrack, TimedEvent};
pub use router::{ChannelSubstitution, TrackKey};
pub use sequencer::{sequence, SequenceReport, Sequenced, SequencerOptions};
pub use write::{save_smf, write_smf};

use crate::error::Result;
use crate::models::MusicDescription;

/// Convert a description to SMF bytes
///
/// # Arguments
/// * `description` - Parsed description
/// * `options` - Resolution and channel-substitution policy
///
/// # Returns
/// * MIDI file bytes plus the sequencing report
pub fn description_to_midi(
    description: &MusicDescription,
    options: &SequencerOptions,
) -> Result<(Vec<u8>, SequenceReport)> {
    let Sequenced { score, report } = sequence(description, options)?;
    let mut out = Vec::new();
    write_smf(&score, &mut out)?;
    Ok((out, report))
}
