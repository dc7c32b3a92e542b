use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Wire and storage format of [`Post::date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Post entity - represents a blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

/// A reader comment attached to a post. Stored as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub user: String,
    pub text: String,
}

/// Client-supplied fields for a new post, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
}

/// Partial update. Only the fields that are `Some` are replaced.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Rules a store applies when creating posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateRules {
    pub require_author: bool,
}

impl CreateRules {
    pub fn author_required() -> Self {
        Self {
            require_author: true,
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn is_canonical_date(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a date written exactly as `YYYY-MM-DD`.
///
/// chrono alone accepts unpadded fields, signs and surrounding whitespace,
/// which would store a different string than the one supplied.
pub fn parse_date(raw: &str) -> Result<NaiveDate, DomainError> {
    let invalid = || DomainError::validation("Invalid date format. Use YYYY-MM-DD");
    if !is_canonical_date(raw) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Validate the fields and build the post that will receive `id`.
    fn into_post(self, id: u64, rules: CreateRules, today: NaiveDate) -> Result<Post, DomainError> {
        let title = present(self.title);
        let content = present(self.content);
        let author = present(self.author);

        let (Some(title), Some(content)) = (title, content) else {
            return Err(DomainError::validation("Title and content are required"));
        };
        if rules.require_author && author.is_none() {
            return Err(DomainError::validation("Author is required"));
        }

        let date = match present(self.date) {
            Some(raw) => parse_date(&raw)?,
            None => today,
        };

        Ok(Post {
            id,
            title,
            content,
            author,
            date,
            category: present(self.category),
            tags: self.tags,
            comments: self.comments,
        })
    }
}

impl PostUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    fn validate(&self) -> Result<(), DomainError> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&self.title) || blank(&self.content) {
            return Err(DomainError::validation("Title and content must not be empty"));
        }
        Ok(())
    }
}

/// The authoritative, ordered set of posts held by a store.
///
/// All mutation rules live here so every backend assigns ids and merges
/// updates the same way. Callers provide the exclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostCollection {
    posts: Vec<Post>,
}

impl PostCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from stored posts, rejecting duplicate ids.
    pub fn from_posts(posts: Vec<Post>) -> Result<Self, DomainError> {
        let mut seen = std::collections::HashSet::with_capacity(posts.len());
        if let Some(dup) = posts.iter().find(|p| !seen.insert(p.id)) {
            return Err(DomainError::Duplicate(format!("post id {}", dup.id)));
        }
        Ok(Self { posts })
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// One more than the current maximum id, or 1 when empty.
    pub fn next_id(&self) -> Result<u64, DomainError> {
        match self.posts.iter().map(|p| p.id).max() {
            None => Ok(1),
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| DomainError::validation("No post ids left above the current maximum")),
        }
    }

    pub fn get(&self, id: u64) -> Result<&Post, DomainError> {
        self.posts
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    pub fn insert(
        &mut self,
        new_post: NewPost,
        rules: CreateRules,
        today: NaiveDate,
    ) -> Result<Post, DomainError> {
        let post = new_post.into_post(self.next_id()?, rules, today)?;
        self.posts.push(post.clone());
        Ok(post)
    }

    pub fn update(&mut self, id: u64, changes: PostUpdate) -> Result<Post, DomainError> {
        changes.validate()?;

        let post = self
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::post_not_found(id))?;

        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        Ok(post.clone())
    }

    pub fn remove(&mut self, id: u64) -> Result<Post, DomainError> {
        let index = self
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DomainError::post_not_found(id))?;
        Ok(self.posts.remove(index))
    }
}

impl From<PostCollection> for Vec<Post> {
    fn from(collection: PostCollection) -> Self {
        collection.posts
    }
}
