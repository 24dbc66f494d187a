//! Models module for music descriptions
//!
//! This module contains the structured description handed over by the
//! description generator, plus the conductor-track signatures.

pub mod description;
pub mod serde_helpers;
pub mod signature;

// Re-export commonly used types
pub use description::{
    Effect, EventKind, MusicDescription, NoteEvent, PitchBend, PitchInput, Vibrato,
    DEFAULT_INSTRUMENT,
};
pub use signature::{KeySignature, TimeSignature};
