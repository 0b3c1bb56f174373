//! Tests for metrics emitted by the generation pipeline.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use skald::providers::ChatProvider;
use skald::telemetry;
use skald::{ChatOptions, ChatResponse, Generator, Message, Result, Skald, SkaldError};

// ============================================================================
// Mock providers
// ============================================================================

struct FixedProvider;

#[async_trait]
impl ChatProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn chat(&self, _messages: &[Message], _options: &ChatOptions) -> Result<ChatResponse> {
        Ok(ChatResponse::text("generated"))
    }
}

struct RateLimitedProvider;

#[async_trait]
impl ChatProvider for RateLimitedProvider {
    fn name(&self) -> &str {
        "rate-limited"
    }

    async fn chat(&self, _messages: &[Message], _options: &ChatOptions) -> Result<ChatResponse> {
        Err(SkaldError::GenerationFailed("rate limit exceeded".into()))
    }
}

fn generator(provider: impl ChatProvider + 'static) -> Generator {
    Skald::builder().provider(provider).build().unwrap()
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    counter_where(snapshot, name, |_| true)
}

/// Sum counter values for `name` carrying the label `label=value`.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    counter_where(snapshot, name, |key| {
        key.key()
            .labels()
            .any(|l| l.key() == label && l.value() == value)
    })
}

fn counter_where(
    snapshot: &SnapshotVec,
    name: &str,
    filter: impl Fn(&metrics_util::CompositeKey) -> bool,
) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter && key.key().name() == name && filter(key)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn generation_records_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let generator = generator(FixedProvider);
                generator.generate("recipe", "tea", "m").await?;
                generator.generate("recipe", "tea", "m").await
            })
        })
    });
    assert!(result.is_ok());

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::GENERATIONS_TOTAL, "status", "ok"),
        1,
        "only the first call reaches the API"
    );
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::HISTORY_APPENDS_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::CACHE_HITS_TOTAL, "content_type", "recipe"),
        1
    );
    assert!(
        has_histogram(&snapshot, telemetry::GENERATION_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn rate_limit_records_status() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                generator(RateLimitedProvider)
                    .generate("recipe", "tea", "m")
                    .await
            })
        })
    });
    assert!(matches!(result, Err(SkaldError::RateLimited { .. })));

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::GENERATIONS_TOTAL, "status", "rate_limited"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::GENERATIONS_TOTAL, "status", "ok"),
        0
    );
    assert_eq!(counter_total(&snapshot, telemetry::HISTORY_APPENDS_TOTAL), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn unknown_template_records_no_generation() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let _result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                generator(FixedProvider).generate("haiku", "tea", "m").await
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::GENERATIONS_TOTAL), 0);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let generator = generator(FixedProvider);
    generator.generate("recipe", "tea", "m").await.unwrap();
}
