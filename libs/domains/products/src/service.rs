//! Product Service - Business logic layer

use std::collections::HashMap;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::identity::Identity;
use crate::models::{
    CreateProduct, NewProduct, Product, ProductId, ProductStats, UpdateProduct,
};
use crate::query::QueryBuilder;
use crate::repository::ProductRepository;

/// Who may change or remove a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum OwnershipPolicy {
    /// Any caller, signed in or not
    #[default]
    Unrestricted,
    /// Only the identity recorded as the product's owner
    OwnerOnly,
}

/// Product service providing business logic operations
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    policy: OwnershipPolicy,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            policy: OwnershipPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OwnershipPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> OwnershipPolicy {
        self.policy
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.find_all().await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> ProductResult<Product> {
        self.repository.find_by_id(id).await
    }

    /// Create a product owned by `identity`.
    ///
    /// Every absent required field is reported at once. `published` defaults
    /// to `true` only when omitted.
    #[instrument(skip(self, input, identity), fields(owner = %identity.owner_id))]
    pub async fn create_product(
        &self,
        input: CreateProduct,
        identity: &Identity,
    ) -> ProductResult<Product> {
        let missing = input.missing_fields();
        let CreateProduct {
            title: Some(title),
            description: Some(description),
            price: Some(price),
            category: Some(category),
            stock: Some(stock),
            published,
            images,
        } = input
        else {
            return Err(ProductError::InvalidArgument(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let product = NewProduct {
            title,
            description: Some(description),
            price,
            category,
            owner: identity.owner_id.clone(),
            stock,
            published: published.unwrap_or(true),
            images: images.unwrap_or_default(),
        };

        self.repository.insert(product).await
    }

    /// Partial update; fields left out of `input` keep their stored values
    #[instrument(skip(self, input, identity), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: UpdateProduct,
        identity: Option<&Identity>,
    ) -> ProductResult<Product> {
        input.validate()?;
        self.authorize(id, identity).await?;

        self.repository.update_by_id(id, input).await
    }

    #[instrument(skip(self, identity), fields(product_id = %id))]
    pub async fn delete_product(
        &self,
        id: ProductId,
        identity: Option<&Identity>,
    ) -> ProductResult<()> {
        self.authorize(id, identity).await?;
        self.repository.delete_by_id(id).await
    }

    /// Exact-match filters combined with any of search, price range, sort and
    /// page
    #[instrument(skip(self))]
    pub async fn query_products(
        &self,
        params: &HashMap<String, String>,
    ) -> ProductResult<Vec<Product>> {
        let query = QueryBuilder::from_params(params)?.build();
        self.repository.find_by_filter(&query).await
    }

    #[instrument(skip(self))]
    pub async fn by_category(&self, category: Option<&str>) -> ProductResult<Vec<Product>> {
        let query = QueryBuilder::new().category(category)?.build();
        self.repository.find_by_filter(&query).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, term: Option<&str>) -> ProductResult<Vec<Product>> {
        let query = QueryBuilder::new().search(term).build();
        self.repository.find_by_filter(&query).await
    }

    #[instrument(skip(self))]
    pub async fn price_range(
        &self,
        min: Option<&str>,
        max: Option<&str>,
    ) -> ProductResult<Vec<Product>> {
        let query = QueryBuilder::new().price_range(min, max)?.build();
        self.repository.find_by_filter(&query).await
    }

    #[instrument(skip(self))]
    pub async fn sorted(
        &self,
        sort_by: Option<&str>,
        order: Option<&str>,
    ) -> ProductResult<Vec<Product>> {
        let query = QueryBuilder::new().sort(sort_by, order)?.build();
        self.repository.find_by_filter(&query).await
    }

    #[instrument(skip(self))]
    pub async fn paginated(
        &self,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> ProductResult<Vec<Product>> {
        let query = QueryBuilder::new().paginate(page, limit).build();
        self.repository.find_by_filter(&query).await
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> ProductResult<ProductStats> {
        self.repository.aggregate_stats().await
    }

    /// Enforce the ownership policy for a write on `id`
    async fn authorize(&self, id: ProductId, identity: Option<&Identity>) -> ProductResult<()> {
        if self.policy == OwnershipPolicy::Unrestricted {
            return Ok(());
        }

        let identity = identity.ok_or_else(|| {
            ProductError::Unauthorized("Sign in to modify products".to_string())
        })?;
        let product = self.repository.find_by_id(id).await?;

        if !identity.owns(&product.owner) {
            tracing::warn!(
                product_id = %id,
                caller = %identity.owner_id,
                "Write rejected for non-owner"
            );
            return Err(ProductError::Forbidden(
                "Only the product owner may modify it".to_string(),
            ));
        }
        Ok(())
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            policy: self.policy,
        }
    }
}
