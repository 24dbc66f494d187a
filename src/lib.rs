//! Music Composer
//!
//! Sequences structured music descriptions (note and chord events with
//! instrument, channel, timing and expression) into multi-track Standard
//! MIDI Files, and hands the result to an external synthesizer.

pub mod composer;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod renderers;
pub mod symbols;

// Re-export commonly used types
pub use composer::{Composition, MusicComposer};
pub use config::ComposerConfig;
pub use error::{ComposerError, ConfigError, Result};
pub use generator::{description_schema, DescriptionGenerator, FileGenerator};
pub use models::{MusicDescription, NoteEvent};
pub use renderers::midi::{description_to_midi, SequenceReport, SequencerOptions};
