//! Infrastructure services

mod answer_cache;

pub use answer_cache::{AnswerCache, AnswerCacheConfig, CacheDump, Lookup, StoreHealth};
