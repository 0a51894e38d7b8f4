//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::UserRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }
}
