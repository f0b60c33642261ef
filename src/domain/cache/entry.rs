//! Cache entry and statistics types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The answer produced by the generation pipeline, handed to the cache on a
/// miss. Sources are opaque provenance records and pass through unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerPayload {
    /// The natural-language response text
    pub answer: String,
    /// Provenance records (identifiers, scores, metadata) - never inspected
    pub sources: Vec<serde_json::Value>,
    /// Suggested follow-up questions
    pub suggestions: Vec<String>,
}

impl AnswerPayload {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<serde_json::Value>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

/// A cached question-answer pair. Immutable once stored; re-caching the same
/// normalized question overwrites the whole entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Original question text, kept for diagnostics
    question: String,
    /// Embedding of the question, dimensionality fixed by the upstream model
    embedding: Vec<f32>,
    /// The cached answer text
    answer: String,
    /// Opaque provenance records
    sources: Vec<serde_json::Value>,
    /// Follow-up question suggestions
    suggestions: Vec<String>,
    /// When this entry was created
    created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create a new entry from a question, its embedding and the answer payload
    pub fn new(question: impl Into<String>, embedding: Vec<f32>, payload: AnswerPayload) -> Self {
        Self {
            question: question.into(),
            embedding,
            answer: payload.answer,
            sources: payload.sources,
            suggestions: payload.suggestions,
            created_at: Utc::now(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn sources(&self) -> &[serde_json::Value] {
        &self.sources
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Point-in-time cache statistics. Entry count is read from the store;
/// hit/miss counters live in the cache instance for the process lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn new(total_entries: usize, hits: u64, misses: u64) -> Self {
        Self {
            total_entries,
            hits,
            misses,
        }
    }

    /// Hit rate as a percentage with two decimals, "0.00%" before any request.
    pub fn hit_rate(&self) -> String {
        let total = self.hits + self.misses;

        if total == 0 {
            return "0.00%".to_string();
        }

        format!("{:.2}%", (self.hits as f64 / total as f64) * 100.0)
    }
}
