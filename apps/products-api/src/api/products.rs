//! Products API routes

use axum::{middleware, Router};
use axum_helpers::{optional_jwt_auth_middleware, JwtAuth};
use domain_products::{handlers, MongoProductRepository, ProductRepository, ProductService};
use domain_users::{MongoUserRepository, UserRepository, UserService};

use super::identity::resolve_identity;
use crate::state::AppState;

/// Create products router backed by MongoDB
pub fn router(state: &AppState) -> Router {
    let products = ProductService::new(MongoProductRepository::new(&state.db))
        .with_policy(state.config.ownership);
    let users = UserService::new(MongoUserRepository::new(&state.db));

    tracing::info!(policy = %state.config.ownership, "Product ownership policy");

    secured_router(products, users, state.auth.clone())
}

/// Product routes behind token verification and identity resolution.
///
/// Layers run outermost first: the token is checked, then its subject is
/// looked up, then the handler sees an `Identity` in the extensions.
pub fn secured_router<P, U>(
    products: ProductService<P>,
    users: UserService<U>,
    auth: JwtAuth,
) -> Router
where
    P: ProductRepository + 'static,
    U: UserRepository + 'static,
{
    handlers::router(products)
        .layer(middleware::from_fn_with_state(users, resolve_identity::<U>))
        .layer(middleware::from_fn_with_state(
            auth,
            optional_jwt_auth_middleware,
        ))
}

/// Initialize products indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    let repository = MongoProductRepository::new(&state.db);
    repository.init_indexes().await?;
    Ok(())
}
