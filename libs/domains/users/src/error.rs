use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    /// Token subject is not a user id
    #[error("'{0}' is not a valid user id")]
    InvalidSubject(String),

    /// Token email no longer matches the stored user
    #[error("Token identity does not match user {0}")]
    IdentityMismatch(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type UserResult<T> = Result<T, UserError>;

/// Identity failures surface as 401 without saying which check failed
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Database(e) => AppError::Database(e),
            other => {
                tracing::debug!("Identity resolution failed: {}", other);
                AppError::Unauthorized("Invalid or unknown identity".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn test_identity_errors_are_unauthorized() {
        for err in [
            UserError::NotFound("65f1c0ffee0000000000beef".into()),
            UserError::InvalidSubject("abc".into()),
            UserError::IdentityMismatch("65f1c0ffee0000000000beef".into()),
        ] {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
