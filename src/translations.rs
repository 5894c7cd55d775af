use std::{collections::HashMap, path::Path};

use serde_json::{Map, Value};

/// Per-label localized text, keyed by language code.
#[derive(Debug, Default, Clone)]
pub struct Translations {
    entries: HashMap<String, Map<String, Value>>,
}

impl Translations {
    /// Reads the translation table. A missing or unreadable file leaves the
    /// service running with no translations.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!("Translations file {} not found", path.display());
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|text| Self::from_json(&text).map_err(|err| err.to_string()));

        match parsed {
            Ok(translations) => {
                tracing::info!(
                    "Translations loaded successfully ({} labels)",
                    translations.entries.len()
                );
                translations
            }
            Err(err) => {
                tracing::warn!("Ignoring translations file {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Translations {
            entries: serde_json::from_str(text)?,
        })
    }

    /// Translations for `label`, or an empty object when there are none.
    pub fn get(&self, label: &str) -> Map<String, Value> {
        self.entries.get(label).cloned().unwrap_or_default()
    }
}
