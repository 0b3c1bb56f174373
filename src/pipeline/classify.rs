//! Failure classification for remote generation errors.
//!
//! Every provider failure goes through [`classify_failure`] on its way out
//! of the pipeline. Today the rate-limit check is a text heuristic; if a
//! backend starts returning a structured quota code, only this file changes.

use crate::SkaldError;

/// Phrase that marks a quota/rate exhaustion message (compared lowercased).
const RATE_LIMIT_PHRASE: &str = "rate limit";

/// Whether a failure message indicates remote quota or rate exhaustion.
pub fn is_rate_limit_message(message: &str) -> bool {
    message.to_lowercase().contains(RATE_LIMIT_PHRASE)
}

/// Collapse a provider error into `RateLimited` or `GenerationFailed`.
///
/// Errors that are already `RateLimited` keep their `retry_after` hint.
/// API errors contribute only the provider's own message, so the text shown
/// to the user is what the remote side said.
pub fn classify_failure(err: SkaldError) -> SkaldError {
    let message = match err {
        SkaldError::RateLimited { .. } => return err,
        SkaldError::Api { message, .. } => message,
        SkaldError::AuthenticationFailed(message) => message,
        SkaldError::GenerationFailed(message) => message,
        other => other.to_string(),
    };

    if is_rate_limit_message(&message) {
        SkaldError::RateLimited { retry_after: None }
    } else {
        SkaldError::GenerationFailed(message)
    }
}
