//! Remote generation backends.
//!
//! [`ChatProvider`] is the seam between the pipeline and the network;
//! [`OpenAiClient`] is the bundled implementation for OpenAI-compatible
//! chat-completions endpoints.

pub mod openai;
pub mod traits;

pub use openai::OpenAiClient;
pub use traits::ChatProvider;
