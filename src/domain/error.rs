use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Embedding dimension mismatch: query has {query} dimensions, entry has {entry}")]
    DimensionMismatch { query: usize, entry: usize },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn dimension_mismatch(query: usize, entry: usize) -> Self {
        Self::DimensionMismatch { query, entry }
    }

    /// True for the data-integrity errors that must not be swallowed
    /// like infrastructure flakiness.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error() {
        let error = DomainError::cache("connection refused");
        assert_eq!(error.to_string(), "Cache error: connection refused");
    }

    #[test]
    fn test_dimension_mismatch_error() {
        let error = DomainError::dimension_mismatch(768, 384);
        assert_eq!(
            error.to_string(),
            "Embedding dimension mismatch: query has 768 dimensions, entry has 384"
        );
        assert!(error.is_integrity());
    }

    #[test]
    fn test_store_error_is_not_integrity() {
        assert!(!DomainError::store("timeout").is_integrity());
    }
}
