//! Composer configuration
//!
//! Loaded from an optional YAML file, then overridden by the `SOUNDFONT` and
//! `OUTPUT_WAV` environment variables.
//!
//! ```yaml
//! ticks_per_beat: 480
//! soundfont: /usr/share/sounds/sf2/FluidR3_GM.sf2
//! output_midi: output.mid
//! output_audio: output.wav
//! sample_rate: 44100
//! synth_program: fluidsynth
//! channel_substitution: lowest_available
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::renderers::audio::{DEFAULT_SAMPLE_RATE, DEFAULT_SYNTH_PROGRAM};
use crate::renderers::midi::defaults::MAX_TPQ;
use crate::renderers::midi::{ChannelSubstitution, SequencerOptions, DEFAULT_TPQ};

pub const SOUNDFONT_ENV: &str = "SOUNDFONT";
pub const OUTPUT_WAV_ENV: &str = "OUTPUT_WAV";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub ticks_per_beat: u16,
    /// Soundfont for audio rendering; rendering is skipped without one
    pub soundfont: Option<PathBuf>,
    pub output_midi: PathBuf,
    pub output_audio: PathBuf,
    pub sample_rate: u32,
    pub synth_program: PathBuf,
    pub channel_substitution: ChannelSubstitution,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        ComposerConfig {
            ticks_per_beat: DEFAULT_TPQ,
            soundfont: None,
            output_midi: PathBuf::from("output.mid"),
            output_audio: PathBuf::from("output.wav"),
            sample_rate: DEFAULT_SAMPLE_RATE,
            synth_program: PathBuf::from(DEFAULT_SYNTH_PROGRAM),
            channel_substitution: ChannelSubstitution::default(),
        }
    }
}

impl ComposerConfig {
    pub fn from_yaml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: ComposerConfig =
            serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text, path)
    }

    /// File (or defaults when `path` is None) plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                log::debug!("Loading config from {}", path.display());
                Self::from_yaml_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env_from(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup; empty values are ignored
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(soundfont) = var(SOUNDFONT_ENV) {
            self.soundfont = Some(PathBuf::from(soundfont));
        }
        if let Some(output) = var(OUTPUT_WAV_ENV) {
            self.output_audio = PathBuf::from(output);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_beat == 0 || self.ticks_per_beat > MAX_TPQ {
            return Err(ConfigError::Invalid(format!(
                "ticks_per_beat must be in 1..={}, got {}",
                MAX_TPQ, self.ticks_per_beat
            )));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::Invalid("sample_rate must be positive".to_string()));
        }
        Ok(())
    }

    pub fn sequencer_options(&self) -> SequencerOptions {
        SequencerOptions {
            ticks_per_beat: self.ticks_per_beat,
            channel_substitution: self.channel_substitution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ComposerConfig::default();
        assert_eq!(config.ticks_per_beat, 480);
        assert_eq!(config.output_midi, PathBuf::from("output.mid"));
        assert_eq!(config.output_audio, PathBuf::from("output.wav"));
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.channel_substitution, ChannelSubstitution::LowestAvailable);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "ticks_per_beat: 960\nchannel_substitution: random\n";
        let config = ComposerConfig::from_yaml_str(yaml, Path::new("test.yaml")).unwrap();

        assert_eq!(config.ticks_per_beat, 960);
        assert_eq!(config.channel_substitution, ChannelSubstitution::Random);
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.sequencer_options().ticks_per_beat, 960);
    }

    #[test]
    fn test_invalid_yaml() {
        let result = ComposerConfig::from_yaml_str("ticks_per_beat: [1, 2]", Path::new("bad.yaml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));

        let result = ComposerConfig::from_yaml_str("ticks_per_beat: 0", Path::new("zero.yaml"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("composer.yaml");
        std::fs::write(&path, "output_midi: song.mid\nsample_rate: 22050\n").unwrap();

        let config = ComposerConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.output_midi, PathBuf::from("song.mid"));
        assert_eq!(config.sample_rate, 22_050);

        let missing = ComposerConfig::from_yaml_file(&dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (SOUNDFONT_ENV, "/sf/GeneralUser.sf2"),
            (OUTPUT_WAV_ENV, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = ComposerConfig::default();
        config.apply_env_from(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.soundfont, Some(PathBuf::from("/sf/GeneralUser.sf2")));
        assert_eq!(config.output_audio, PathBuf::from("output.wav"));
    }
}
