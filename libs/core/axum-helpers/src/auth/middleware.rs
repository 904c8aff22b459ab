use super::jwt::JwtAuth;
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

/// Cookie carrying the access token for browser clients
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Bearer token from `Authorization`, falling back to the `access_token` cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == ACCESS_TOKEN_COOKIE).then(|| value.to_string())
                    })
                })
        })
        .filter(|token| !token.is_empty())
}

/// Require a valid token and insert its [`JwtClaims`](super::JwtClaims) into
/// request extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token(&headers) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return Err(AppError::Unauthorized("No token provided".to_string()));
    };

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Like [`jwt_auth_middleware`], but anonymous requests pass through.
///
/// A token that is present but invalid is still rejected with 401.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = extract_token(&headers) {
        let claims = auth.verify_token(&token).map_err(|e| {
            tracing::debug!("JWT verification failed: {}", e);
            AppError::Unauthorized("Invalid token".to_string())
        })?;
        request.extensions_mut().insert(claims);
    }

    Ok(next.run(request).await)
}
