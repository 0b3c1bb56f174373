//! Provider trait for the remote generation API.
//!
//! The pipeline only needs one capability from a backend: turn an ordered
//! list of (role, content) messages plus sampling options into text. Any
//! API exposing that shape can sit behind [`ChatProvider`].
//!
//! # Error contract
//!
//! Implementations report failures with whatever [`SkaldError`](crate::SkaldError)
//! variant fits best (`Http`, `Api`, `RateLimited`, ...). The pipeline
//! reclassifies every provider failure into `RateLimited` or
//! `GenerationFailed` before it reaches the caller, so providers do not
//! need to detect quota exhaustion themselves.

use async_trait::async_trait;

use crate::Result;
use crate::types::{ChatOptions, ChatResponse, Message};

/// Provider for non-streaming chat completion.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Send `messages` and wait for the complete response.
    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse>;
}
