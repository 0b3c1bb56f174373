//! Skald - template-driven content generation
//!
//! A user picks a content type (recipe, travel guide, ...) and a model,
//! supplies a topic, and skald renders the matching prompt template, asks an
//! OpenAI-compatible chat API for the text, caches the result, records it in
//! a SQLite history, and reports simple statistics about it.
//!
//! # Example
//!
//! ```rust,no_run
//! use skald::{Skald, analyze};
//!
//! #[tokio::main]
//! async fn main() -> skald::Result<()> {
//!     let generator = Skald::builder()
//!         .openai("sk-your-key", "https://api.openai.com/v1", None)
//!         .history_path("content_history.db")
//!         .build()?;
//!
//!     let text = generator.generate("recipe", "braised pork", "gpt-4o-mini").await?;
//!     println!("{text}");
//!     println!("{:?}", analyze(&text));
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod artifact;
pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod providers;
pub mod telemetry;
pub mod templates;
pub mod types;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types at crate root
pub use analysis::{AnalysisResult, analyze};
pub use batch::{BatchEvent, BatchPlan, BatchReport, ItemOutcome, run_batch};
pub use cache::{CacheConfig, CacheKey, ContentCache};
pub use error::{Result, SkaldError};
pub use history::{HistoryRecord, HistoryStore, NewHistoryRecord};
pub use pipeline::{GENERATION_TEMPERATURE, Generator, GeneratorBuilder, Skald};
pub use providers::{ChatProvider, OpenAiClient};
pub use templates::{Template, TemplateRegistry};
pub use types::{ChatOptions, ChatResponse, FinishReason, GenerationRequest, Message, Role, Usage};
