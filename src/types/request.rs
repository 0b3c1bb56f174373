//! Generation request value.

use serde::{Deserialize, Serialize};

/// One unit of work for the generation pipeline: which template to use,
/// what to feed into it, and which model to ask.
///
/// Transient: built per batch item and consumed by
/// [`Generator::generate_request`](crate::Generator::generate_request).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub content_type: String,
    pub input_text: String,
    pub model: String,
}

impl GenerationRequest {
    pub fn new(
        content_type: impl Into<String>,
        input_text: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            input_text: input_text.into(),
            model: model.into(),
        }
    }
}
