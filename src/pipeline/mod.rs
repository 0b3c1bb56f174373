//! Generation pipeline
//!
//! cache check → template lookup → remote call → cache write → history append

mod builder;
mod classify;
mod generator;

pub use builder::{GeneratorBuilder, Skald};
pub use classify::{classify_failure, is_rate_limit_message};
pub use generator::{GENERATION_TEMPERATURE, Generator};
