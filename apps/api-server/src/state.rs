//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PostRepository, UserRepository};
use quill_infra::{InMemoryPostRepository, InMemoryUserRepository, JsonFilePostRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    /// Post mutations need a valid Bearer token.
    pub auth_required: bool,
}

impl AppState {
    /// Build the application state with the configured post store.
    pub async fn new(config: &AppConfig) -> Self {
        let rules = config.storage.create_rules();

        let posts: Arc<dyn PostRepository> = match &config.storage.posts_file {
            Some(path) => Arc::new(JsonFilePostRepository::open(path.clone(), rules).await),
            None => {
                tracing::warn!("POSTS_FILE not set. Posts are kept in memory only.");
                Arc::new(InMemoryPostRepository::seeded(rules))
            }
        };

        tracing::info!(
            auth_required = config.auth.required,
            require_author = rules.require_author,
            "Application state initialized"
        );

        Self::with_posts(posts, config.auth.required)
    }

    pub fn with_posts(posts: Arc<dyn PostRepository>, auth_required: bool) -> Self {
        Self {
            posts,
            users: Arc::new(InMemoryUserRepository::new()),
            auth_required,
        }
    }
}
