//! Public types for the Skald API.

mod message;
mod options;
mod request;
mod response;

pub use message::{Message, Role};
pub use options::ChatOptions;
pub use request::GenerationRequest;
pub use response::{ChatResponse, FinishReason, Usage};
