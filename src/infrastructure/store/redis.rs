//! Redis-backed key-value store

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info, warn};

use crate::domain::cache::{KeyValueStore, StoreStatus};
use crate::domain::DomainError;

/// Configuration for the Redis store
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// How long a connection attempt may take before it counts as failed
    pub connection_timeout: Duration,
}

impl RedisStoreConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connection_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

enum ConnectionState {
    Disconnected,
    Connecting,
    Ready(ConnectionManager),
    Failed,
}

/// Redis store with a lazily established, shared connection.
///
/// Construction is cheap and never touches the network; the first `status()`
/// call kicks off a background connect so process start is never blocked on
/// Redis. While the connection is pending (or after it failed) every operation
/// reports the store as unavailable and the caller degrades accordingly. A
/// failed attempt is retried on the next use.
#[derive(Clone)]
pub struct RedisStore {
    config: RedisStoreConfig,
    state: Arc<Mutex<ConnectionState>>,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .field("status", &self.peek_status())
            .finish()
    }
}

impl RedisStore {
    /// Creates a new Redis store. No connection is made until first use.
    pub fn new(config: RedisStoreConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
        }
    }

    /// Creates a Redis store with default configuration
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(RedisStoreConfig::new(url))
    }

    fn lock_state(&self) -> MutexGuard<'_, ConnectionState> {
        // The state enum holds no invariants a panicked holder could break.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current state without triggering a connection attempt
    fn peek_status(&self) -> StoreStatus {
        match &*self.lock_state() {
            ConnectionState::Disconnected => StoreStatus::Disconnected,
            ConnectionState::Connecting => StoreStatus::Connecting,
            ConnectionState::Ready(_) => StoreStatus::Ready,
            ConnectionState::Failed => StoreStatus::Failed,
        }
    }

    fn connection(&self) -> Result<ConnectionManager, DomainError> {
        match &*self.lock_state() {
            ConnectionState::Ready(conn) => Ok(conn.clone()),
            _ => Err(DomainError::store("Redis connection not ready")),
        }
    }

    fn spawn_connect(&self) {
        let config = self.config.clone();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            debug!("Connecting to Redis at {}", config.url);

            let attempt = tokio::time::timeout(config.connection_timeout, async {
                let client = Client::open(config.url.as_str()).map_err(|e| {
                    DomainError::store(format!("Failed to create Redis client: {}", e))
                })?;

                ConnectionManager::new(client).await.map_err(|e| {
                    DomainError::store(format!("Failed to connect to Redis: {}", e))
                })
            })
            .await;

            let mut guard = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

            match attempt {
                Ok(Ok(conn)) => {
                    info!("Connected to Redis");
                    *guard = ConnectionState::Ready(conn);
                }
                Ok(Err(e)) => {
                    warn!("Redis connection failed: {}. Cache stays disabled until the next attempt.", e);
                    *guard = ConnectionState::Failed;
                }
                Err(_) => {
                    warn!(
                        "Redis connection timed out after {:?}. Cache stays disabled until the next attempt.",
                        config.connection_timeout
                    );
                    *guard = ConnectionState::Failed;
                }
            }
        });
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    fn status(&self) -> StoreStatus {
        let mut state = self.lock_state();

        match &*state {
            ConnectionState::Ready(_) => StoreStatus::Ready,
            ConnectionState::Connecting => StoreStatus::Connecting,
            ConnectionState::Disconnected | ConnectionState::Failed => {
                *state = ConnectionState::Connecting;
                drop(state);
                self.spawn_connect();
                StoreStatus::Connecting
            }
        }
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        let mut conn = self.connection()?;

        // Cursor-based SCAN instead of a single blocking KEYS command; the
        // enumeration it yields is the same.
        let mut cursor = 0u64;
        let mut found = Vec::new();

        loop {
            let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    DomainError::store(format!(
                        "Failed to scan keys with pattern '{}': {}",
                        pattern, e
                    ))
                })?;

            found.extend(batch);
            cursor = next_cursor;

            if cursor == 0 {
                break;
            }
        }

        Ok(found)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection()?;

        let result: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| DomainError::store(format!("Failed to get key '{}': {}", key, e)))?;

        Ok(result)
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), DomainError> {
        let mut conn = self.connection()?;

        match ttl {
            Some(ttl) => {
                let ttl_secs = ttl.as_secs().max(1);
                let _: () = conn.set_ex(key, value, ttl_secs).await.map_err(|e| {
                    DomainError::store(format!("Failed to set key '{}': {}", key, e))
                })?;
            }
            None => {
                let _: () = conn.set(key, value).await.map_err(|e| {
                    DomainError::store(format!("Failed to set key '{}': {}", key, e))
                })?;
            }
        }

        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<usize, DomainError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection()?;

        let deleted: usize = conn
            .del(keys.to_vec())
            .await
            .map_err(|e| DomainError::store(format!("Failed to delete keys: {}", e)))?;

        Ok(deleted)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection()?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::store(format!("Ping failed: {}", e)))?;

        Ok(())
    }
}
