//! Storage key derivation for cache entries

use sha2::{Digest, Sha256};

/// Namespace under which all cache entries live in the backing store.
pub const QUESTION_KEY_PREFIX: &str = "cache:question:";

/// Deterministic storage key for a question: the SHA-256 of the lower-cased,
/// trimmed question text, hex encoded under the cache namespace. Re-caching
/// the exact same question overwrites instead of duplicating; paraphrases
/// still get distinct keys, which is expected for a semantic cache.
pub fn question_key(question: &str) -> String {
    let normalized = question.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());

    format!("{}{}", QUESTION_KEY_PREFIX, hex::encode(digest))
}

/// Pattern matching every key in the cache namespace.
pub fn key_pattern() -> String {
    format!("{}*", QUESTION_KEY_PREFIX)
}
