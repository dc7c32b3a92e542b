//! In-memory post store - used when no posts file is configured.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use quill_core::DomainError;
use quill_core::domain::{CreateRules, NewPost, Post, PostCollection, PostUpdate};
use quill_core::ports::PostRepository;

/// In-memory post store guarded by an async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    posts: RwLock<PostCollection>,
    rules: CreateRules,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::with_rules(CreateRules::default())
    }

    pub fn with_rules(rules: CreateRules) -> Self {
        Self {
            posts: RwLock::new(PostCollection::new()),
            rules,
        }
    }

    /// A store holding the two starter posts.
    pub fn seeded(rules: CreateRules) -> Self {
        let today = Utc::now().date_naive();
        let mut posts = PostCollection::new();
        let starters = [
            ("First Post", "This is the first post."),
            ("Second Post", "This is the second post."),
        ];
        for (title, content) in starters {
            // Starter posts bypass the author rule.
            if let Err(e) = posts.insert(NewPost::new(title, content), CreateRules::default(), today)
            {
                tracing::warn!(error = %e, "Skipping starter post");
            }
        }

        Self {
            posts: RwLock::new(posts),
            rules,
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self) -> Vec<Post> {
        self.posts.read().await.posts().to_vec()
    }

    async fn count(&self) -> usize {
        self.posts.read().await.len()
    }

    async fn get(&self, id: u64) -> Result<Post, DomainError> {
        self.posts.read().await.get(id).cloned()
    }

    async fn create(&self, new_post: NewPost) -> Result<Post, DomainError> {
        let mut posts = self.posts.write().await;
        let post = posts.insert(new_post, self.rules, Utc::now().date_naive())?;
        tracing::debug!(post_id = post.id, "Created post");
        Ok(post)
    }

    async fn update(&self, id: u64, changes: PostUpdate) -> Result<Post, DomainError> {
        let mut posts = self.posts.write().await;
        posts.update(id, changes)
    }

    async fn delete(&self, id: u64) -> Result<(), DomainError> {
        let mut posts = self.posts.write().await;
        posts.remove(id)?;
        tracing::debug!(post_id = id, "Deleted post");
        Ok(())
    }
}
