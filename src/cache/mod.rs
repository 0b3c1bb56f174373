//! Caching subsystem.
//!
//! [`ContentCache`] holds previously generated text keyed on
//! (content type, input text, model). It is bounded (LRU eviction) and
//! entries expire a fixed time after insertion. Nothing is persisted; the
//! cache lives as long as the [`Generator`](crate::Generator) that owns it.

pub mod content;

pub use content::{CacheConfig, CacheKey, ContentCache, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
