//! Description generation
//!
//! A generator turns a free-form prompt into description JSON that conforms
//! to [`description_schema`]. The language-model backend lives outside this
//! crate; [`FileGenerator`] replays a pre-generated description.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::error::{ComposerError, Result};

/// Produces description JSON for a prompt
pub trait DescriptionGenerator {
    fn generate(&self, prompt: &str, schema: &Value) -> Result<String>;
}

impl<F> DescriptionGenerator for F
where
    F: Fn(&str, &Value) -> Result<String>,
{
    fn generate(&self, prompt: &str, schema: &Value) -> Result<String> {
        self(prompt, schema)
    }
}

/// Returns the contents of a JSON file regardless of the prompt
#[derive(Debug, Clone)]
pub struct FileGenerator {
    pub path: PathBuf,
}

impl FileGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileGenerator { path: path.into() }
    }
}

impl DescriptionGenerator for FileGenerator {
    fn generate(&self, prompt: &str, _schema: &Value) -> Result<String> {
        log::debug!(
            "Reading description for prompt {:?} from {}",
            prompt,
            self.path.display()
        );
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| ComposerError::io(&self.path, e))?;
        if text.trim().is_empty() {
            return Err(ComposerError::Generator(format!(
                "{} is empty",
                self.path.display()
            )));
        }
        Ok(text)
    }
}

/// JSON schema for generated descriptions
pub fn description_schema() -> Value {
    json!({
        "type": "object",
        "required": ["key_signature", "tempo", "time_signature", "notes"],
        "properties": {
            "key_signature": { "type": "string" },
            "tempo": { "type": "number" },
            "time_signature": { "type": "string" },
            "notes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": [
                        "type", "duration", "velocity", "instrument",
                        "channel", "effects", "offset"
                    ],
                    "properties": {
                        "type": { "type": "string", "enum": ["note", "chord"] },
                        "pitch": { "type": "string" },
                        "pitches": { "type": "array", "items": { "type": "string" } },
                        "duration": { "type": "number" },
                        "velocity": { "type": "integer" },
                        "instrument": { "type": "string" },
                        "channel": { "type": "integer" },
                        "offset": { "type": "number" },
                        "effects": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["type"],
                                "properties": {
                                    "type": { "type": "string" },
                                    "value": { "type": "integer" }
                                }
                            }
                        },
                        "pitch_bend": {
                            "type": "object",
                            "properties": {
                                "start": { "type": "number" },
                                "end": { "type": "number" },
                                "steps": { "type": "integer" }
                            }
                        },
                        "vibrato": {
                            "type": "object",
                            "properties": {
                                "depth": { "type": "number" },
                                "speed": { "type": "integer" },
                                "steps": { "type": "integer" }
                            }
                        }
                    }
                }
            }
        }
    })
}
