//! JSON extractor that runs `validator` rules before the handler sees the body.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has passed its `Validate` rules.
///
/// Malformed JSON is rejected as [`AppError::JsonExtractorRejection`]; failed
/// rules as [`AppError::ValidationError`] with every offending field in `details`.
///
/// ```ignore
/// async fn update(ValidatedJson(patch): ValidatedJson<UpdateProduct>) -> impl IntoResponse {
///     // patch.validate() already passed
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Restock {
        #[validate(range(min = 0))]
        stock: i64,
    }

    async fn handler(ValidatedJson(body): ValidatedJson<Restock>) -> String {
        body.stock.to_string()
    }

    fn request(body: &'static str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let app = Router::new().route("/", post(handler));
        let response = app.oneshot(request(r#"{"stock": 3}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rule_violation_is_bad_request() {
        let app = Router::new().route("/", post(handler));
        let response = app.oneshot(request(r#"{"stock": -1}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let app = Router::new().route("/", post(handler));
        let response = app.oneshot(request(r#"{"stock": "#)).await.unwrap();
        assert!(response.status().is_client_error());
    }
}
