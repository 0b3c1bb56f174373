//! Telemetry metric name constants.
//!
//! Centralised metric names for skald operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `skald_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `content_type`: template key (e.g. "recipe", "travel_guide")
//! - `model`: model identifier sent to the remote API
//! - `status`: outcome: "ok", "rate_limited" or "error"

/// Total generation attempts that reached the remote API.
///
/// Labels: `content_type`, `status` ("ok" | "rate_limited" | "error").
pub const GENERATIONS_TOTAL: &str = "skald_generations_total";

/// Remote generation call duration in seconds.
///
/// Labels: `model`.
pub const GENERATION_DURATION_SECONDS: &str = "skald_generation_duration_seconds";

/// Total content cache hits.
///
/// Labels: `content_type`.
pub const CACHE_HITS_TOTAL: &str = "skald_cache_hits_total";

/// Total content cache misses.
///
/// Labels: `content_type`.
pub const CACHE_MISSES_TOTAL: &str = "skald_cache_misses_total";

/// Total records appended to the history store.
pub const HISTORY_APPENDS_TOTAL: &str = "skald_history_appends_total";
