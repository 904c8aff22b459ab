//! Turns verified token claims into a product-core [`Identity`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_helpers::{AppError, JwtClaims};
use domain_products::Identity;
use domain_users::{UserRepository, UserService};

/// Runs after `optional_jwt_auth_middleware`. Anonymous requests pass
/// through untouched; a token whose subject cannot be resolved to a user is
/// rejected with 401.
pub async fn resolve_identity<R: UserRepository + 'static>(
    State(users): State<UserService<R>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = request.extensions().get::<JwtClaims>().cloned();

    if let Some(claims) = claims {
        let user = users.resolve(&claims).await?;
        tracing::debug!(user_id = %user.id, "Resolved caller identity");
        request
            .extensions_mut()
            .insert(Identity::new(user.id.to_hex(), user.email));
    }

    Ok(next.run(request).await)
}
