//! Key-value store implementations

mod in_memory;
mod redis;

pub use in_memory::MemoryStore;
pub use redis::{RedisStore, RedisStoreConfig};
