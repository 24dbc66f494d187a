//! Prompt-to-audio orchestration
//!
//! generate → parse → sequence → write MIDI → render audio. Every call is
//! independent; a render failure leaves the written MIDI file in place.

use std::path::{Path, PathBuf};

use crate::config::ComposerConfig;
use crate::error::{ComposerError, Result};
use crate::generator::{description_schema, DescriptionGenerator};
use crate::models::MusicDescription;
use crate::renderers::audio::{AudioRenderer, FluidSynth};
use crate::renderers::midi::{save_smf, sequence, SequenceReport, Sequenced};

/// Result of writing one description
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub midi_path: PathBuf,
    pub report: SequenceReport,
    pub track_count: usize,
}

pub struct MusicComposer {
    config: ComposerConfig,
    generator: Box<dyn DescriptionGenerator>,
    renderer: Box<dyn AudioRenderer>,
}

impl MusicComposer {
    /// Composer rendering through FluidSynth as configured
    pub fn new(config: ComposerConfig, generator: Box<dyn DescriptionGenerator>) -> Self {
        let renderer = FluidSynth::new(&config.output_audio).with_program(&config.synth_program);
        MusicComposer {
            config,
            generator,
            renderer: Box::new(renderer),
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn AudioRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Generate a description for `prompt`, write it as MIDI and render it
    pub fn generate_music(&self, prompt: &str) -> Result<Composition> {
        let composition = self.generate_midi(prompt)?;
        self.render(&composition)?;
        Ok(composition)
    }

    /// Generate a description for `prompt` and write it as MIDI only
    pub fn generate_midi(&self, prompt: &str) -> Result<Composition> {
        let json = self.generator.generate(prompt, &description_schema())?;
        self.compose_json(&json)
    }

    /// Parse description JSON and write it to the configured MIDI path
    pub fn compose_json(&self, json: &str) -> Result<Composition> {
        let description = MusicDescription::from_json(json)?;
        self.compose(&description, &self.config.output_midi)
    }

    /// Sequence `description` and write it to `midi_path`
    pub fn compose(&self, description: &MusicDescription, midi_path: &Path) -> Result<Composition> {
        let Sequenced { score, report } = sequence(description, &self.config.sequencer_options())?;
        save_smf(&score, midi_path)?;

        Ok(Composition {
            midi_path: midi_path.to_path_buf(),
            report,
            track_count: score.tracks.len(),
        })
    }

    /// Render a written composition; None when no soundfont is configured
    pub fn render(&self, composition: &Composition) -> Result<Option<PathBuf>> {
        let Some(soundfont) = &self.config.soundfont else {
            log::info!("No soundfont configured, skipping audio render");
            return Ok(None);
        };

        match self
            .renderer
            .render(&composition.midi_path, soundfont, self.config.sample_rate)
        {
            Ok(path) => Ok(Some(path)),
            Err(e) => {
                log::error!(
                    "Failed to convert MIDI to audio, keeping {}: {}",
                    composition.midi_path.display(),
                    e
                );
                Err(match e {
                    ComposerError::Render(_) => e,
                    other => ComposerError::Render(other.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const SONG: &str = r#"{
        "key_signature": "C major",
        "tempo": 120,
        "time_signature": "4/4",
        "notes": [
            {"type": "note", "pitch": "C4", "duration": 1, "velocity": 80},
            {"type": "chord", "pitches": ["C4", "E4", "G4"], "offset": 1, "instrument": "strings", "channel": 1}
        ]
    }"#;

    struct FailingRenderer;

    impl AudioRenderer for FailingRenderer {
        fn render(&self, _midi: &Path, _soundfont: &Path, _rate: u32) -> Result<PathBuf> {
            Err(ComposerError::Render("synth crashed".to_string()))
        }
    }

    struct CopyRenderer(PathBuf);

    impl AudioRenderer for CopyRenderer {
        fn render(&self, midi: &Path, _soundfont: &Path, _rate: u32) -> Result<PathBuf> {
            std::fs::copy(midi, &self.0).map_err(|e| ComposerError::io(&self.0, e))?;
            Ok(self.0.clone())
        }
    }

    fn composer(dir: &Path, soundfont: Option<PathBuf>) -> MusicComposer {
        let config = ComposerConfig {
            output_midi: dir.join("out.mid"),
            output_audio: dir.join("out.wav"),
            soundfont,
            ..ComposerConfig::default()
        };
        let generator = |_prompt: &str, _schema: &Value| -> Result<String> { Ok(SONG.to_string()) };
        MusicComposer::new(config, Box::new(generator))
    }

    #[test]
    fn test_generate_without_soundfont_writes_midi_only() {
        let dir = tempfile::tempdir().unwrap();
        let composition = composer(dir.path(), None).generate_music("a tune").unwrap();

        assert_eq!(composition.midi_path, dir.path().join("out.mid"));
        assert_eq!(composition.track_count, 2);
        assert_eq!(composition.report.events_sequenced, 2);
        assert!(composition.midi_path.exists());
        assert!(!dir.path().join("out.wav").exists());
    }

    #[test]
    fn test_render_failure_keeps_midi() {
        let dir = tempfile::tempdir().unwrap();
        let composer = composer(dir.path(), Some(dir.path().join("font.sf2")))
            .with_renderer(Box::new(FailingRenderer));

        let result = composer.generate_music("a tune");
        assert!(matches!(result, Err(ComposerError::Render(_))));
        assert!(dir.path().join("out.mid").exists());
    }

    #[test]
    fn test_render_with_soundfont() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("copy.wav");
        let composer = composer(dir.path(), Some(dir.path().join("font.sf2")))
            .with_renderer(Box::new(CopyRenderer(wav.clone())));

        let composition = composer.compose_json(SONG).unwrap();
        assert_eq!(composer.render(&composition).unwrap(), Some(wav.clone()));
        assert!(wav.exists());
    }

    #[test]
    fn test_malformed_description_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let composer = composer(dir.path(), None);

        assert!(matches!(
            composer.compose_json(r#"{"tempo": 120}"#),
            Err(ComposerError::Description(_))
        ));
        assert!(matches!(
            composer.compose_json(
                r#"{"key_signature": "C", "tempo": 0, "time_signature": "4/4", "notes": []}"#
            ),
            Err(ComposerError::Description(_))
        ));
        assert!(!dir.path().join("out.mid").exists());
    }
}
