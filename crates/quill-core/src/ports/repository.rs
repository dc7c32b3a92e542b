use async_trait::async_trait;

use crate::domain::{NewPost, Post, PostUpdate, User};
use crate::error::{DomainError, RepoError};

/// The post store. Owns the authoritative collection.
///
/// Mutations are mutually exclusive with each other and with the lookup that
/// decides them (next id, locating a post). `list` returns a complete
/// snapshot taken under a read guard.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts in insertion order.
    async fn list(&self) -> Vec<Post>;

    /// Number of posts, without copying them.
    async fn count(&self) -> usize;

    /// Find a post by its id.
    async fn get(&self, id: u64) -> Result<Post, DomainError>;

    /// Validate and append a new post, assigning `max(id) + 1`.
    async fn create(&self, new_post: NewPost) -> Result<Post, DomainError>;

    /// Replace the supplied fields of an existing post.
    async fn update(&self, id: u64, changes: PostUpdate) -> Result<Post, DomainError>;

    /// Remove a post permanently.
    async fn delete(&self, id: u64) -> Result<(), DomainError>;
}

/// User repository backing registration and login.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Store a new user. Fails with `Duplicate` if the username is taken.
    async fn insert(&self, user: User) -> Result<User, DomainError>;
}
