//! Products Domain
//!
//! Product catalog over MongoDB: CRUD plus filter, category, search, price
//! range, sort, pagination and statistics queries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, Identity extraction
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Required fields, ownership policy
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌──────────────┐
//! │ Repository  │ ◄── │ QueryBuilder │  ← raw params → ProductQuery
//! └──────┬──────┘     └──────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, invariants
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{handlers, MongoProductRepository, ProductService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("storefront");
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(ProductService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod identity;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod query;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use identity::Identity;
pub use memory::InMemoryProductRepository;
pub use models::{
    CreateProduct, NewProduct, Product, ProductId, ProductResponse, ProductStats, UpdateProduct,
};
pub use mongodb::MongoProductRepository;
pub use query::{ProductQuery, QueryBuilder};
pub use repository::ProductRepository;
pub use service::{OwnershipPolicy, ProductService};
