//! Database connectors and utilities
//!
//! Connection management for the document store backing the catalog services.
//! Each store lives behind a cargo feature so services only compile the
//! drivers they use.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client, configuration, health checks
//! - `config` - `core_config::FromEnv` support for store configuration
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "shop");
//! let client = mongodb::connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
