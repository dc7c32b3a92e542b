//! JSON file post store.
//!
//! The whole collection lives in one file as a JSON array. Every mutation
//! rewrites it wholesale: serialize, write `<file>.tmp` next to it, fsync,
//! then rename over the canonical path. The canonical file is therefore
//! always a complete previous or new state.
//!
//! A missing or unreadable file at open time degrades to an empty
//! collection instead of failing startup.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use quill_core::domain::{CreateRules, NewPost, Post, PostCollection, PostUpdate};
use quill_core::ports::PostRepository;
use quill_core::{DomainError, RepoError};

/// What happened when the posts file was read at open time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file was decoded into this many posts.
    Loaded(usize),
    /// No file yet; starting empty.
    Missing,
    /// The file could not be read or decoded; starting empty.
    Degraded(String),
}

/// Post store persisted to a single JSON file.
pub struct JsonFilePostRepository {
    path: PathBuf,
    posts: RwLock<PostCollection>,
    rules: CreateRules,
    load_outcome: LoadOutcome,
}

impl JsonFilePostRepository {
    /// Open the store at `path`, loading whatever valid state is there.
    pub async fn open(path: impl Into<PathBuf>, rules: CreateRules) -> Self {
        let path = path.into();
        let (posts, load_outcome) = load(&path).await;

        match &load_outcome {
            LoadOutcome::Loaded(count) => {
                tracing::info!(path = %path.display(), posts = count, "Loaded posts file")
            }
            LoadOutcome::Missing => {
                tracing::info!(path = %path.display(), "Posts file not found, starting empty")
            }
            LoadOutcome::Degraded(reason) => tracing::warn!(
                path = %path.display(),
                reason = %reason,
                "Posts file unreadable, continuing with an empty collection"
            ),
        }

        Self {
            path,
            posts: RwLock::new(posts),
            rules,
            load_outcome,
        }
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Apply `op` to a copy of the collection, publish it to disk, then swap
    /// it in. The write guard is held for the mutation and the file swap
    /// only. Any failure leaves both memory and the file untouched.
    async fn mutate<T, F>(&self, op: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut PostCollection) -> Result<T, DomainError> + Send,
        T: Send,
    {
        let mut posts = self.posts.write().await;
        let mut next = posts.clone();
        let result = op(&mut next)?;

        write_atomic(&self.path, next.posts()).await?;
        *posts = next;
        Ok(result)
    }
}

async fn load(path: &Path) -> (PostCollection, LoadOutcome) {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return (PostCollection::new(), LoadOutcome::Missing);
        }
        Err(e) => return (PostCollection::new(), LoadOutcome::Degraded(e.to_string())),
    };

    let decoded = serde_json::from_str::<Vec<Post>>(&raw)
        .map_err(|e| e.to_string())
        .and_then(|posts| PostCollection::from_posts(posts).map_err(|e| e.to_string()));

    match decoded {
        Ok(posts) => {
            let count = posts.len();
            (posts, LoadOutcome::Loaded(count))
        }
        Err(reason) => (PostCollection::new(), LoadOutcome::Degraded(reason)),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("posts.json"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `posts` and publish them at `path` via temp file + rename.
async fn write_atomic(path: &Path, posts: &[Post]) -> Result<(), RepoError> {
    let json =
        serde_json::to_string_pretty(posts).map_err(|e| RepoError::Serialization(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| RepoError::Persistence(format!("create {}: {}", parent.display(), e)))?;
    }

    let temp_path = temp_path(path);
    if let Err(e) = write_synced(&temp_path, json.as_bytes()).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(RepoError::Persistence(format!(
            "write {}: {}",
            temp_path.display(),
            e
        )));
    }

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(RepoError::Persistence(format!(
            "rename {}: {}",
            temp_path.display(),
            e
        )));
    }

    Ok(())
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[async_trait]
impl PostRepository for JsonFilePostRepository {
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
        let rules = self.rules;
        let today = Utc::now().date_naive();
        let post = self
            .mutate(move |posts| posts.insert(new_post, rules, today))
            .await?;
        tracing::debug!(post_id = post.id, path = %self.path.display(), "Created post");
        Ok(post)
    }

    async fn update(&self, id: u64, changes: PostUpdate) -> Result<Post, DomainError> {
        self.mutate(move |posts| posts.update(id, changes)).await
    }

    async fn delete(&self, id: u64) -> Result<(), DomainError> {
        self.mutate(move |posts| posts.remove(id).map(|_| ())).await?;
        tracing::debug!(post_id = id, path = %self.path.display(), "Deleted post");
        Ok(())
    }
}
