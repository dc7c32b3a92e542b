//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl DomainError {
    pub fn post_not_found(id: u64) -> Self {
        Self::NotFound {
            entity_type: "Post",
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Repository-level errors.
///
/// Read-side decode failures never surface here: stores degrade to an empty
/// collection instead. Only writes that could not be published do.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}
