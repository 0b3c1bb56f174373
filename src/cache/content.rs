//! Bounded, time-expiring cache of generated content.
//!
//! # Key design
//!
//! Keys are a structured [`CacheKey`] rather than a delimiter-joined
//! string, so `("a_b", "c")` and `("a", "b_c")` can never collide no matter
//! what characters content types, inputs or model identifiers contain.
//!
//! # Expiry and eviction
//!
//! Backed by moka's async cache configured with:
//! - `time_to_live`: fixed TTL measured from insertion; reads do not
//!   extend an entry's life
//! - `max_capacity` with the LRU eviction policy: when full, the least
//!   recently used entry makes room for the new one
//!
//! moka applies evictions lazily; [`ContentCache::len`] flushes pending
//! maintenance first so the reported count respects the bound.

use std::time::Duration;

use moka::future::Cache;
use moka::policy::EvictionPolicy;

use crate::telemetry;

/// Default maximum number of cached generations.
pub const DEFAULT_MAX_ENTRIES: u64 = 100;

/// Default time-to-live for cached generations (one hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Configuration for the content cache.
///
/// ```rust
/// # use skald::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(100)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 100.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    /// Create a new config with the default bound and TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Composite cache key: one generation is identified by all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub content_type: String,
    pub input_text: String,
    pub model: String,
}

impl CacheKey {
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

/// In-memory cache of generated text.
pub struct ContentCache {
    cache: Cache<CacheKey, String>,
}

impl ContentCache {
    /// Create an empty cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { cache }
    }

    /// Look up cached text.
    ///
    /// Returns `None` when the key was never cached, has expired, or was
    /// evicted. Emits cache hit/miss metrics.
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let hit = self.cache.get(key).await;
        let counter = if hit.is_some() {
            telemetry::CACHE_HITS_TOTAL
        } else {
            telemetry::CACHE_MISSES_TOTAL
        };
        metrics::counter!(counter, "content_type" => key.content_type.clone()).increment(1);
        hit
    }

    /// Insert (or overwrite) cached text. The TTL restarts from now.
    pub async fn insert(&self, key: CacheKey, text: String) {
        self.cache.insert(key, text).await;
    }

    /// Drop a single entry, if present.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.cache.invalidate(key).await;
    }

    /// Number of live entries, after applying pending evictions.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Whether the cache holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Evict all entries.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
