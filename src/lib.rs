//! Semantic answer cache for Q&A pipelines
//!
//! Decides whether a semantically similar question was already answered and
//! returns the stored answer instead of re-running the expensive generation
//! pipeline. The cache is strictly best-effort: a missing, unreachable or
//! slow backing store degrades it to a no-op and never fails the caller.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::warn;

use api::state::AppState;
use infrastructure::services::{AnswerCache, AnswerCacheConfig};
use infrastructure::store::{RedisStore, RedisStoreConfig};

/// Build the application state from configuration.
///
/// Constructing the Redis store is cheap; the connection is established
/// lazily in the background on first use. Without a configured host the
/// cache runs disabled.
pub fn create_app_state(config: &AppConfig) -> AppState {
    let cache_config = AnswerCacheConfig::new()
        .with_similarity_threshold(config.cache.similarity_threshold)
        .with_ttl_secs(config.cache.ttl_secs);

    let cache = match config.redis.url() {
        Some(url) => AnswerCache::new(
            Arc::new(RedisStore::new(RedisStoreConfig::new(url))),
            cache_config,
        ),
        None => {
            warn!("Redis not configured (redis.host missing). Cache will be disabled.");
            AnswerCache::disabled(cache_config)
        }
    };

    AppState::new(Arc::new(cache), config.server.expose_dump)
}
