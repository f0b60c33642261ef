//! Backing store trait and connection state

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Connection state of a backing store.
///
/// A closed set instead of ad-hoc status strings: every call site switches on
/// these four states. Anything other than `Ready` means the cache degrades to
/// a no-op for the current operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// No connection has been attempted yet
    Disconnected,
    /// A connection attempt is in flight; callers must not wait on it
    Connecting,
    /// Connected and usable
    Ready,
    /// The last connection attempt failed
    Failed,
}

impl StoreStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// A remote key-value store with optional per-key expiry.
///
/// Implementations must be safe for concurrent use; the shared connection
/// handle is cloned per operation. Callers wrap every method in an operation
/// timeout and treat failures as "store unavailable", so implementations
/// report errors instead of retrying internally.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Current connection state. Implementations may use this call to trigger
    /// a lazy background connect; it must never block.
    fn status(&self) -> StoreStatus;

    /// All keys matching a glob-style pattern (e.g. `cache:question:*`).
    /// No ordering guarantee.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, DomainError>;

    /// Value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Store `value` under `key`. `ttl` of `None` means no expiry.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>)
        -> Result<(), DomainError>;

    /// Delete the given keys in one batch, returning how many existed.
    async fn delete(&self, keys: &[String]) -> Result<usize, DomainError>;

    /// Round-trip liveness check.
    async fn ping(&self) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ready_is_ready() {
        assert!(StoreStatus::Ready.is_ready());
        assert!(!StoreStatus::Disconnected.is_ready());
        assert!(!StoreStatus::Connecting.is_ready());
        assert!(!StoreStatus::Failed.is_ready());
    }
}
