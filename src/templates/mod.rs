//! Template registry: content type → prompt pair.
//!
//! The registry is populated once at startup and read-only afterwards:
//! 1. **Embedded seed**: compiled-in JSON, always available
//! 2. **Overlay file**: optional user JSON in the same shape
//!
//! Overlay entries replace seed entries with the same content type.
//! Every template is validated on load: its user prompt must contain the
//! [`INPUT_PLACEHOLDER`] exactly once.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, SkaldError};

/// Placeholder substituted with the caller's input text.
pub const INPUT_PLACEHOLDER: &str = "{input_text}";

/// A system instruction plus a user instruction with one input placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl Template {
    /// Render the user prompt, substituting `input` for the placeholder once.
    ///
    /// The input itself is never scanned, so input text that happens to
    /// contain the placeholder is passed through verbatim.
    pub fn render(&self, input: &str) -> String {
        self.user_prompt.replacen(INPUT_PLACEHOLDER, input, 1)
    }

    fn validate(&self, content_type: &str) -> Result<()> {
        match self.user_prompt.matches(INPUT_PLACEHOLDER).count() {
            1 => Ok(()),
            n => Err(SkaldError::Configuration(format!(
                "template '{content_type}' must contain {INPUT_PLACEHOLDER} exactly once (found {n})"
            ))),
        }
    }
}

/// Immutable mapping from content type to [`Template`].
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    entries: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    /// Registry holding only the compiled-in templates.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(EMBEDDED_SEED)
    }

    /// Parse a JSON object of `{ "<content type>": { system_prompt, user_prompt } }`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, Template> = serde_json::from_str(json)?;
        for (content_type, template) in &entries {
            template.validate(content_type)?;
        }
        Ok(Self { entries })
    }

    /// Overlay templates from a JSON file; entries in the file win.
    pub fn merge_json_file(mut self, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SkaldError::Configuration(format!("Failed to read templates file {path:?}: {e}"))
        })?;
        let overlay = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            count = overlay.len(),
            "merged template overlay"
        );
        self.entries.extend(overlay.entries);
        Ok(self)
    }

    /// Look up the template for a content type.
    pub fn lookup(&self, content_type: &str) -> Result<&Template> {
        self.entries
            .get(content_type)
            .ok_or_else(|| SkaldError::UnknownTemplate(content_type.to_string()))
    }

    /// All registered content types, sorted.
    pub fn content_types(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Raw JSON seed data compiled into the binary.
const EMBEDDED_SEED: &str = include_str!("seed.json");
