use axum_helpers::JwtClaims;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

/// Service layer for User lookups
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Map verified token claims onto a stored user.
    ///
    /// The subject must name an existing user whose email still matches the
    /// one in the token.
    #[instrument(skip(self, claims), fields(sub = %claims.sub))]
    pub async fn resolve(&self, claims: &JwtClaims) -> UserResult<User> {
        let id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| UserError::InvalidSubject(claims.sub.clone()))?;

        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound(claims.sub.clone()))?;

        if !user.has_email(&claims.email) {
            tracing::warn!(user_id = %user.id, "Token email does not match stored user");
            return Err(UserError::IdentityMismatch(claims.sub.clone()));
        }

        Ok(user)
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;

    fn claims(sub: &str, email: &str) -> JwtClaims {
        JwtClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            name: "Ada".to_string(),
            exp: 0,
            iat: 0,
            jti: "jti".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_known_user() {
        let user = User::new("ada", "ada@example.com");
        let id = user.id;

        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(mockall::predicate::eq(id))
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(mock_repo);
        let resolved = service
            .resolve(&claims(&id.to_hex(), "ADA@example.com"))
            .await
            .unwrap();
        assert_eq!(resolved.id, id);
    }

    #[tokio::test]
    async fn test_resolve_unknown_user() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));

        let service = UserService::new(mock_repo);
        let result = service
            .resolve(&claims(&ObjectId::new().to_hex(), "ada@example.com"))
            .await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_resolve_email_mismatch() {
        let user = User::new("ada", "ada@example.com");
        let id = user.id;

        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(mock_repo);
        let result = service.resolve(&claims(&id.to_hex(), "eve@example.com")).await;
        assert!(matches!(result, Err(UserError::IdentityMismatch(_))));
    }

    #[tokio::test]
    async fn test_resolve_rejects_malformed_subject() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_by_id().never();

        let service = UserService::new(mock_repo);
        let result = service.resolve(&claims("user-42", "ada@example.com")).await;
        assert!(matches!(result, Err(UserError::InvalidSubject(_))));
    }
}
