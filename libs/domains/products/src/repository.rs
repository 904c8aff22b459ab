use async_trait::async_trait;

use crate::error::ProductResult;
use crate::models::{NewProduct, Product, ProductId, ProductStats, UpdateProduct};
use crate::query::ProductQuery;

/// Repository trait for Product persistence
///
/// Implementations interpret a [`ProductQuery`] for their own store; callers
/// never see store-specific query documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product, in no guaranteed order
    async fn find_all(&self) -> ProductResult<Vec<Product>>;

    /// Fails with `NotFound` when no product has this id
    async fn find_by_id(&self, id: ProductId) -> ProductResult<Product>;

    /// Products satisfying every criterion, ordered and paged as requested.
    /// No match is an empty vec, not an error.
    async fn find_by_filter(&self, query: &ProductQuery) -> ProductResult<Vec<Product>>;

    /// Validate, assign id and creation time, then persist
    async fn insert(&self, product: NewProduct) -> ProductResult<Product>;

    /// Overwrite only the supplied fields and return the stored result
    async fn update_by_id(&self, id: ProductId, update: UpdateProduct) -> ProductResult<Product>;

    async fn delete_by_id(&self, id: ProductId) -> ProductResult<()>;

    /// Count and mean price; `{0, 0}` for an empty collection
    async fn aggregate_stats(&self) -> ProductResult<ProductStats>;
}
