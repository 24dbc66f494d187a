//! External audio rendering
//!
//! The synthesizer is an opaque external program: it receives the written
//! MIDI file plus a soundfont and produces a waveform file. A failed render
//! never invalidates the MIDI artifact.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{ComposerError, Result};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_SYNTH_PROGRAM: &str = "fluidsynth";

/// Renders a MIDI file to audio
pub trait AudioRenderer {
    /// Render `midi_path` with `soundfont`; returns the audio file written
    fn render(&self, midi_path: &Path, soundfont: &Path, sample_rate: u32) -> Result<PathBuf>;
}

/// Runs FluidSynth non-interactively in fast-render mode
#[derive(Debug, Clone)]
pub struct FluidSynth {
    pub program: PathBuf,
    pub output: PathBuf,
}

impl FluidSynth {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        FluidSynth {
            program: PathBuf::from(DEFAULT_SYNTH_PROGRAM),
            output: output.into(),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn args(&self, midi_path: &Path, soundfont: &Path, sample_rate: u32) -> Vec<std::ffi::OsString> {
        vec![
            "-ni".into(),
            soundfont.into(),
            midi_path.into(),
            "-F".into(),
            self.output.clone().into(),
            "-r".into(),
            sample_rate.to_string().into(),
        ]
    }
}

impl AudioRenderer for FluidSynth {
    fn render(&self, midi_path: &Path, soundfont: &Path, sample_rate: u32) -> Result<PathBuf> {
        if !soundfont.exists() {
            return Err(ComposerError::Render(format!(
                "soundfont not found: {}",
                soundfont.display()
            )));
        }

        // Stale output from an earlier run must not pass for this render
        if self.output.exists() {
            std::fs::remove_file(&self.output).map_err(|e| ComposerError::io(&self.output, e))?;
        }

        let args = self.args(midi_path, soundfont, sample_rate);
        log::debug!("Running {} with args {:?}", self.program.display(), args);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                ComposerError::Render(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ComposerError::Render(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        if !self.output.exists() {
            return Err(ComposerError::Render(format!(
                "{} produced no output at {}",
                self.program.display(),
                self.output.display()
            )));
        }

        log::info!("Audio file created: {}", self.output.display());
        Ok(self.output.clone())
    }
}
