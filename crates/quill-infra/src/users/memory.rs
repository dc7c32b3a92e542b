//! In-memory user repository. Accounts do not survive a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::User;
use quill_core::error::{DomainError, RepoError};
use quill_core::ports::UserRepository;

/// Users keyed by username.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(DomainError::Duplicate(format!(
                "username '{}' is already registered",
                user.username
            )));
        }
        users.insert(user.username.clone(), user.clone());
        tracing::debug!(user_id = %user.id, "Registered user");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .insert(User::new("ada".to_string(), "hash".to_string()))
            .await
            .unwrap();

        let found = repo.find_by_username("ada").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.insert(User::new("ada".to_string(), "h1".to_string()))
            .await
            .unwrap();

        let result = repo
            .insert(User::new("ada".to_string(), "h2".to_string()))
            .await;
        assert!(matches!(result, Err(DomainError::Duplicate(_))));
    }
}
