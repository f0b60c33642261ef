//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::AnswerCache;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<AnswerCache>,
    /// Whether the raw dump endpoint is served
    pub expose_dump: bool,
}

impl AppState {
    pub fn new(cache: Arc<AnswerCache>, expose_dump: bool) -> Self {
        Self { cache, expose_dump }
    }
}
