//! Users Domain
//!
//! Users exist here only as the identities that own products. Accounts are
//! managed elsewhere; this crate looks them up and checks that verified token
//! claims still describe a real user.
//!
//! ```rust,no_run
//! use domain_users::{MongoUserRepository, UserService};
//!
//! # async fn example(db: mongodb::Database, claims: axum_helpers::JwtClaims) -> domain_users::UserResult<()> {
//! let users = UserService::new(MongoUserRepository::new(&db));
//! let user = users.resolve(&claims).await?;
//! println!("{} owns the request", user.id);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use models::User;
pub use mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
