use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::UserResult;
use crate::models::User;

/// Read access to users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;

    /// Case-insensitive lookup
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<ObjectId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.has_email(email)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_lookups() {
        let repo = InMemoryUserRepository::new();
        let user = User::new("ada", "Ada@Example.com");
        repo.insert(user.clone()).await;

        assert_eq!(repo.find_by_id(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(repo.find_by_id(ObjectId::new()).await.unwrap(), None);

        assert_eq!(
            repo.find_by_email("ada@example.com").await.unwrap(),
            Some(user)
        );
        assert_eq!(repo.find_by_email("eve@example.com").await.unwrap(), None);
    }
}
