//! Verification of access tokens issued by the external auth service.
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, optional_jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//! let routes = Router::new()
//!     .route("/api/products", post(create))
//!     .layer(axum::middleware::from_fn_with_state(auth, optional_jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{ACCESS_TOKEN_TTL, JwtAuth, JwtClaims};
pub use middleware::{extract_token, jwt_auth_middleware, optional_jwt_auth_middleware};
