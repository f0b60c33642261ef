//! Semantic answer caching service
//!
//! Matches incoming questions against previously answered ones by embedding
//! similarity, so the expensive generation pipeline only runs for genuinely
//! new questions. Store failures degrade the cache to a no-op; they are never
//! surfaced to the asking user.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::cache::{
    key_pattern, question_key, AnswerPayload, CacheEntry, CacheStats, KeyValueStore,
};
use crate::domain::similarity::cosine_similarity;
use crate::domain::DomainError;

/// Per-operation timeout for store calls. Deliberately a hard-coded constant:
/// a cache that takes longer than this is worse than a miss.
const OP_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration for the answer cache
#[derive(Debug, Clone)]
pub struct AnswerCacheConfig {
    /// Minimum cosine similarity for a lookup to count as a hit
    pub similarity_threshold: f32,
    /// Entry TTL in seconds; 0 means entries never expire
    pub ttl_secs: u64,
    /// Cap on concurrently in-flight detached writes
    pub max_inflight_writes: usize,
}

impl Default for AnswerCacheConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.92,
            ttl_secs: 0,
            max_inflight_writes: 8,
        }
    }
}

impl AnswerCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the similarity threshold, clamped to [0.0, 1.0]
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Sets the entry TTL; 0 disables expiry
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Sets the detached write concurrency cap
    pub fn with_max_inflight_writes(mut self, max: usize) -> Self {
        self.max_inflight_writes = max;
        self
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone)]
pub enum Lookup {
    /// A stored answer matched at or above the similarity threshold
    Hit { entry: CacheEntry, similarity: f32 },
    /// No stored answer matched; the best similarity seen is carried for
    /// diagnostics when a scan actually ran
    Miss { best_similarity: Option<f32> },
}

impl Lookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}

/// Raw view of everything in the cache, for operator debugging.
///
/// Exposes cached answers and embeddings verbatim; only hand this to trusted
/// operators.
#[derive(Debug, Clone, Serialize)]
pub struct CacheDump {
    pub count: usize,
    pub keys: Vec<String>,
    pub data: BTreeMap<String, Option<serde_json::Value>>,
}

/// Store liveness as seen from the cache, for readiness reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreHealth {
    /// No store configured; the cache runs disabled
    Disabled,
    /// The store answered a ping
    Connected,
    /// The store is configured but not currently usable
    Unavailable(String),
}

/// Semantic answer cache over a key-value store.
///
/// Owns the hit/miss counters and the policy of what counts as a hit. All
/// store interactions are best-effort: an unreachable or slow store makes
/// every lookup a miss and every write a no-op, never an error for the
/// caller.
#[derive(Debug)]
pub struct AnswerCache {
    store: Option<Arc<dyn KeyValueStore>>,
    config: AnswerCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    write_permits: Arc<Semaphore>,
}

impl AnswerCache {
    /// Create a cache backed by the given store
    pub fn new(store: Arc<dyn KeyValueStore>, config: AnswerCacheConfig) -> Self {
        let write_permits = Arc::new(Semaphore::new(config.max_inflight_writes));

        Self {
            store: Some(store),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            write_permits,
        }
    }

    /// Create a disabled cache: every lookup misses, every write is a no-op.
    /// This is the mode for deployments with no store configured.
    pub fn disabled(config: AnswerCacheConfig) -> Self {
        let write_permits = Arc::new(Semaphore::new(config.max_inflight_writes));

        Self {
            store: None,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            write_permits,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn config(&self) -> &AnswerCacheConfig {
        &self.config
    }

    /// Look up a semantically similar previously answered question.
    ///
    /// Scans every entry in the namespace linearly. That is fine while the
    /// corpus of distinct questions stays small; at larger entry counts this
    /// is the place to put an approximate nearest neighbor index.
    ///
    /// Infrastructure failures (store down, timeout) become misses. A
    /// dimension mismatch between the query and a stored embedding is a
    /// data-integrity defect and propagates as an error instead.
    pub async fn lookup(
        &self,
        question: &str,
        embedding: &[f32],
    ) -> Result<Lookup, DomainError> {
        let Some(store) = &self.store else {
            return Ok(Lookup::Miss {
                best_similarity: None,
            });
        };

        let status = store.status();
        if !status.is_ready() {
            debug!(?status, "Store not ready, treating lookup as a miss");
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(Lookup::Miss {
                best_similarity: None,
            });
        }

        let keys = match timeout(OP_TIMEOUT, store.keys(&key_pattern())).await {
            Ok(Ok(keys)) => keys,
            Ok(Err(e)) => {
                warn!("Failed to enumerate cache keys: {}", e);
                self.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(Lookup::Miss {
                    best_similarity: None,
                });
            }
            Err(_) => {
                warn!("Cache key enumeration timed out after {:?}", OP_TIMEOUT);
                self.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(Lookup::Miss {
                    best_similarity: None,
                });
            }
        };

        if keys.is_empty() {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(Lookup::Miss {
                best_similarity: None,
            });
        }

        let mut best_entry: Option<CacheEntry> = None;
        let mut best_similarity = 0.0f32;

        for key in &keys {
            let raw = match timeout(OP_TIMEOUT, store.get(key)).await {
                Ok(Ok(Some(raw))) => raw,
                // Expired or deleted between enumeration and fetch
                Ok(Ok(None)) => continue,
                Ok(Err(e)) => {
                    warn!(%key, "Failed to fetch cache entry: {}", e);
                    continue;
                }
                Err(_) => {
                    warn!(%key, "Cache entry fetch timed out");
                    continue;
                }
            };

            let entry: CacheEntry = match serde_json::from_str(&raw) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(%key, "Skipping unparseable cache entry: {}", e);
                    continue;
                }
            };

            let similarity = cosine_similarity(embedding, entry.embedding())?;

            // Strictly greater, so the first entry seen at the maximum wins
            if similarity > best_similarity {
                best_similarity = similarity;
                best_entry = Some(entry);
            }
        }

        match best_entry {
            Some(entry) if best_similarity >= self.config.similarity_threshold => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                info!(
                    question,
                    similarity = format_args!("{:.2}", best_similarity),
                    "Cache hit"
                );

                Ok(Lookup::Hit {
                    entry,
                    similarity: best_similarity,
                })
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(
                    question,
                    best_similarity = format_args!("{:.2}", best_similarity),
                    "Cache miss"
                );

                Ok(Lookup::Miss {
                    best_similarity: Some(best_similarity),
                })
            }
        }
    }

    /// Store an answered question. Best-effort: failures are logged and
    /// swallowed so the caller's response is never blocked on caching.
    pub async fn store(&self, question: &str, embedding: &[f32], payload: AnswerPayload) {
        let Some(store) = &self.store else {
            return;
        };

        let status = store.status();
        if !status.is_ready() {
            debug!(?status, "Store not ready, skipping cache write");
            return;
        }

        let key = question_key(question);
        let entry = CacheEntry::new(question, embedding.to_vec(), payload);

        let value = match serde_json::to_string(&entry) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize cache entry: {}", e);
                return;
            }
        };

        let ttl = (self.config.ttl_secs > 0).then(|| Duration::from_secs(self.config.ttl_secs));

        match timeout(OP_TIMEOUT, store.set(&key, &value, ttl)).await {
            Ok(Ok(())) => match ttl {
                Some(ttl) => debug!(question, ttl_secs = ttl.as_secs(), "Cached answer"),
                None => debug!(question, "Cached answer without expiry"),
            },
            Ok(Err(e)) => warn!("Failed to cache answer: {}", e),
            Err(_) => warn!("Cache write timed out after {:?}", OP_TIMEOUT),
        }
    }

    /// Store an answered question on a detached task, so a caller whose
    /// request already completed does not wait on the write. In-flight writes
    /// are capped; at the cap the write is dropped, not queued.
    pub fn store_background(
        self: &Arc<Self>,
        question: String,
        embedding: Vec<f32>,
        payload: AnswerPayload,
    ) {
        let permit = match Arc::clone(&self.write_permits).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("In-flight cache write limit reached, dropping write");
                return;
            }
        };

        let cache = Arc::clone(self);

        tokio::spawn(async move {
            let _permit = permit;
            cache.store(&question, &embedding, payload).await;
        });
    }

    /// Delete every entry in the cache namespace, returning how many were
    /// removed. The hit/miss counters reset together with the data so the hit
    /// rate never references entries that no longer exist. Returns 0 when the
    /// store is unavailable or the cache is empty.
    pub async fn clear(&self) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };

        if !store.status().is_ready() {
            return 0;
        }

        let keys = match timeout(OP_TIMEOUT, store.keys(&key_pattern())).await {
            Ok(Ok(keys)) => keys,
            Ok(Err(e)) => {
                warn!("Failed to enumerate cache keys for clear: {}", e);
                return 0;
            }
            Err(_) => {
                warn!("Cache clear timed out after {:?}", OP_TIMEOUT);
                return 0;
            }
        };

        if keys.is_empty() {
            return 0;
        }

        match timeout(OP_TIMEOUT, store.delete(&keys)).await {
            Ok(Ok(removed)) => {
                self.hits.store(0, Ordering::Relaxed);
                self.misses.store(0, Ordering::Relaxed);
                info!(removed, "Cleared cache");
                removed
            }
            Ok(Err(e)) => {
                warn!("Failed to delete cache entries: {}", e);
                0
            }
            Err(_) => {
                warn!("Cache clear timed out after {:?}", OP_TIMEOUT);
                0
            }
        }
    }

    /// Best-effort statistics snapshot; the entry count falls back to 0 when
    /// the store cannot be reached.
    pub async fn stats(&self) -> CacheStats {
        let total_entries = match &self.store {
            Some(store) if store.status().is_ready() => {
                match timeout(OP_TIMEOUT, store.keys(&key_pattern())).await {
                    Ok(Ok(keys)) => keys.len(),
                    Ok(Err(e)) => {
                        warn!("Failed to count cache entries: {}", e);
                        0
                    }
                    Err(_) => {
                        warn!("Cache stats timed out after {:?}", OP_TIMEOUT);
                        0
                    }
                }
            }
            _ => 0,
        };

        CacheStats::new(
            total_entries,
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    /// Raw contents of the cache for debugging. Entries that fail to parse
    /// come back as null rather than aborting the dump.
    pub async fn dump(&self) -> CacheDump {
        let mut dump = CacheDump {
            count: 0,
            keys: Vec::new(),
            data: BTreeMap::new(),
        };

        let Some(store) = &self.store else {
            return dump;
        };

        if !store.status().is_ready() {
            return dump;
        }

        let keys = match timeout(OP_TIMEOUT, store.keys(&key_pattern())).await {
            Ok(Ok(keys)) => keys,
            Ok(Err(e)) => {
                warn!("Failed to enumerate cache keys for dump: {}", e);
                return dump;
            }
            Err(_) => {
                warn!("Cache dump timed out after {:?}", OP_TIMEOUT);
                return dump;
            }
        };

        for key in &keys {
            let parsed = match timeout(OP_TIMEOUT, store.get(key)).await {
                Ok(Ok(Some(raw))) => serde_json::from_str(&raw).ok(),
                _ => None,
            };

            dump.data.insert(key.clone(), parsed);
        }

        dump.count = keys.len();
        dump.keys = keys;
        dump
    }

    /// Store liveness for readiness reporting
    pub async fn store_health(&self) -> StoreHealth {
        let Some(store) = &self.store else {
            return StoreHealth::Disabled;
        };

        let status = store.status();
        if !status.is_ready() {
            return StoreHealth::Unavailable(format!("store is {:?}", status));
        }

        match timeout(OP_TIMEOUT, store.ping()).await {
            Ok(Ok(())) => StoreHealth::Connected,
            Ok(Err(e)) => StoreHealth::Unavailable(e.to_string()),
            Err(_) => StoreHealth::Unavailable("ping timed out".to_string()),
        }
    }
}
