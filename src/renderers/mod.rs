//! Renderers module
//!
//! Output stages for a parsed description: the MIDI sequencer/writer and the
//! external audio render adapter.

pub mod audio;
pub mod midi;

pub use audio::{AudioRenderer, FluidSynth};
pub use midi::{description_to_midi, SequenceReport, SequencerOptions};
