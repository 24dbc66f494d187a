//! Symbol resolution: human-readable names to MIDI codes
//!
//! Descriptions name instruments, drums and controllers in free text, so every
//! lookup goes through two stages: an alias table (many-to-one, alias to
//! canonical name) and a primary table (canonical name to code). A miss is a
//! typed `None`, distinct from a real code 0; callers decide whether to
//! default, log or skip.

pub mod controllers;
pub mod instruments;
pub mod percussion;
pub mod pitch;

use std::collections::HashMap;

pub use controllers::{list_controllers, resolve_controller};
pub use instruments::{list_instruments, lookup_instrument, resolve_instrument};
pub use percussion::{is_percussion, list_percussion, resolve_percussion};
pub use pitch::{resolve_pitch, spelling_to_midi};

/// Normalize a free-text name: "Acoustic Grand" and "acoustic-grand" both
/// become "acoustic_grand"
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Alias table layered over a primary name-to-code table
pub struct SymbolTable {
    primary: HashMap<&'static str, u8>,
    aliases: HashMap<&'static str, &'static str>,
}

impl SymbolTable {
    pub fn new(primary: &[(&'static str, u8)], aliases: &[(&'static str, &'static str)]) -> Self {
        SymbolTable {
            primary: primary.iter().copied().collect(),
            aliases: aliases.iter().copied().collect(),
        }
    }

    /// Canonical name for `name`, if it is a primary name or a known alias
    pub fn canonical(&self, name: &str) -> Option<&'static str> {
        let normalized = normalize_name(name);
        let key = self
            .aliases
            .get(normalized.as_str())
            .copied()
            .unwrap_or(normalized.as_str());
        self.primary.get_key_value(key).map(|(canonical, _)| *canonical)
    }

    pub fn lookup(&self, name: &str) -> Option<u8> {
        self.canonical(name).and_then(|canonical| self.primary.get(canonical).copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical(name).is_some()
    }

    /// Every name (aliases included) with its code, sorted by code then name
    pub fn entries(&self) -> Vec<(&'static str, u8)> {
        let mut entries: Vec<(&'static str, u8)> = self
            .primary
            .iter()
            .map(|(name, code)| (*name, *code))
            .chain(
                self.aliases
                    .iter()
                    .filter_map(|(alias, target)| self.primary.get(target).map(|code| (*alias, *code))),
            )
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        entries
    }

    /// Aliases whose target is missing from the primary table
    pub fn dangling_aliases(&self) -> Vec<&'static str> {
        let mut dangling: Vec<&'static str> = self
            .aliases
            .iter()
            .filter(|(_, target)| !self.primary.contains_key(*target))
            .map(|(alias, _)| *alias)
            .collect();
        dangling.sort_unstable();
        dangling
    }
}
