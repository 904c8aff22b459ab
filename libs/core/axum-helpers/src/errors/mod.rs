pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mongodb::error::{Error as MongoError, ErrorKind};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1009,
///   "error": "INVALID_ARGUMENT",
///   "message": "Unknown filter field 'color'",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Per-field validation errors, when there are any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Application error type that converts into an HTTP response.
///
/// Server-side failures are logged with their full text and answered with the
/// code's default message, so driver internals never reach the client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON parsing error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] MongoError),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Status, client message, details and code for this error.
    fn parts(self) -> (StatusCode, String, Option<serde_json::Value>, ErrorCode) {
        match self {
            AppError::SerdeJson(e) => {
                tracing::error!(error_code = ErrorCode::SerdeJsonError.code(), "JSON error: {:?}", e);
                internal(ErrorCode::SerdeJsonError)
            }
            AppError::Database(e) => map_mongo_error(&e),
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::JsonExtraction.code(),
                    "JSON extraction error: {:?}",
                    e
                );
                let status = match e {
                    JsonRejection::MissingJsonContentType(_) => e.status(),
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, e.body_text(), None, ErrorCode::JsonExtraction)
            }
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {}",
                    e
                );
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError.default_message().to_string(),
                    Some(serde_json::to_value(&e).unwrap_or(serde_json::Value::Null)),
                    ErrorCode::ValidationError,
                )
            }
            AppError::InvalidId(msg) => client(StatusCode::BAD_REQUEST, ErrorCode::InvalidId, msg),
            AppError::InvalidArgument(msg) => {
                client(StatusCode::BAD_REQUEST, ErrorCode::InvalidArgument, msg)
            }
            AppError::Unauthorized(msg) => {
                client(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg)
            }
            AppError::Forbidden(msg) => client(StatusCode::FORBIDDEN, ErrorCode::Forbidden, msg),
            AppError::NotFound(msg) => client(StatusCode::NOT_FOUND, ErrorCode::NotFound, msg),
            AppError::Conflict(msg) => client(StatusCode::CONFLICT, ErrorCode::Conflict, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                internal(ErrorCode::InternalError)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    msg,
                    None,
                    ErrorCode::ServiceUnavailable,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details, code) = self.parts();

        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

fn client(
    status: StatusCode,
    code: ErrorCode,
    message: String,
) -> (StatusCode, String, Option<serde_json::Value>, ErrorCode) {
    tracing::info!(error_code = code.code(), "{}: {}", code, message);
    (status, message, None, code)
}

fn internal(code: ErrorCode) -> (StatusCode, String, Option<serde_json::Value>, ErrorCode) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        code.default_message().to_string(),
        None,
        code,
    )
}

/// Maps a MongoDB driver error onto status and code.
fn map_mongo_error(error: &MongoError) -> (StatusCode, String, Option<serde_json::Value>, ErrorCode) {
    match error.kind.as_ref() {
        ErrorKind::ServerSelection { .. } | ErrorKind::ConnectionPoolCleared { .. } => {
            tracing::warn!(
                error_code = ErrorCode::DatabaseUnavailable.code(),
                "Database unavailable: {}",
                error
            );
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::DatabaseUnavailable.default_message().to_string(),
                None,
                ErrorCode::DatabaseUnavailable,
            )
        }
        ErrorKind::BsonDeserialization(_) => {
            tracing::error!(
                error_code = ErrorCode::DatabaseDecode.code(),
                "Database decode error: {}",
                error
            );
            internal(ErrorCode::DatabaseDecode)
        }
        _ => {
            tracing::error!(
                error_code = ErrorCode::DatabaseError.code(),
                "Database error: {:?}",
                error
            );
            internal(ErrorCode::DatabaseError)
        }
    }
}

/// Build an error response outside of an [`AppError`].
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(error_code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[derive(Validate)]
    struct Listing {
        #[validate(length(min = 1))]
        title: String,
        #[validate(range(min = 0.0))]
        price: f64,
    }

    #[tokio::test]
    async fn test_invalid_argument_is_bad_request() {
        let response = AppError::InvalidArgument("unknown field 'color'".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["code"], 1009);
        assert_eq!(json["error"], "INVALID_ARGUMENT");
        assert_eq!(json["message"], "unknown field 'color'");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_error_lists_every_field() {
        let errors = Listing {
            title: String::new(),
            price: -1.0,
        }
        .validate()
        .unwrap_err();

        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert!(json["details"]["title"].is_array());
        assert!(json["details"]["price"].is_array());
    }

    #[tokio::test]
    async fn test_internal_error_hides_message() {
        let response =
            AppError::InternalServerError("connection reset by 10.0.0.7".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["message"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn test_status_codes_for_auth_errors() {
        assert_eq!(
            AppError::Unauthorized("no identity".into())
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("not the owner".into())
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("product".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
