//! In-memory ProductRepository for tests and local development

use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, ProductId, ProductStats, UpdateProduct};
use crate::query::{Criterion, FilterField, FilterValue, ProductQuery, SortDirection, SortField};
use crate::repository::ProductRepository;

/// Products kept in insertion order behind an async lock
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with already-stored products
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(RwLock::new(products)),
        }
    }
}

fn matches(product: &Product, criterion: &Criterion) -> bool {
    match criterion {
        Criterion::Equals(field, value) => match (field, value) {
            (FilterField::Title, FilterValue::Text(s)) => product.title == *s,
            (FilterField::Description, FilterValue::Text(s)) => {
                product.description.as_deref() == Some(s.as_str())
            }
            (FilterField::Category, FilterValue::Text(s)) => product.category == *s,
            (FilterField::Owner, FilterValue::Text(s)) => product.owner == *s,
            (FilterField::Price, FilterValue::Number(n)) => product.price == *n,
            (FilterField::Stock, FilterValue::Integer(n)) => product.stock == *n,
            (FilterField::Published, FilterValue::Bool(b)) => product.published == *b,
            _ => false,
        },
        Criterion::Search(term) => {
            let term = term.to_lowercase();
            product.title.to_lowercase().contains(&term)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&term))
        }
        Criterion::PriceRange { min, max } => {
            min.is_none_or(|min| product.price >= min) && max.is_none_or(|max| product.price <= max)
        }
    }
}

fn compare(a: &Product, b: &Product, field: SortField) -> Ordering {
    let primary = match field {
        SortField::Title => a.title.cmp(&b.title),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::Category => a.category.cmp(&b.category),
        SortField::Stock => a.stock.cmp(&b.stock),
        SortField::Published => a.published.cmp(&b.published),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Id => Ordering::Equal,
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: ProductId) -> ProductResult<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| p.product_id() == id)
            .cloned()
            .ok_or(ProductError::NotFound(id))
    }

    async fn find_by_filter(&self, query: &ProductQuery) -> ProductResult<Vec<Product>> {
        let mut found: Vec<Product> = self
            .products
            .read()
            .await
            .iter()
            .filter(|p| query.criteria().iter().all(|c| matches(p, c)))
            .cloned()
            .collect();

        if let Some(sort) = query.sort() {
            found.sort_by(|a, b| {
                let ordering = compare(a, b, sort.field);
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(page) = query.page() {
            found = found
                .into_iter()
                .skip(usize::try_from(page.skip()).unwrap_or(usize::MAX))
                .take(page.limit as usize)
                .collect();
        }

        Ok(found)
    }

    async fn insert(&self, product: NewProduct) -> ProductResult<Product> {
        product.validate()?;
        let product = Product::from_new(product);
        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn update_by_id(&self, id: ProductId, update: UpdateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        let product = products
            .iter_mut()
            .find(|p| p.product_id() == id)
            .ok_or(ProductError::NotFound(id))?;

        product.apply_update(update);
        Ok(product.clone())
    }

    async fn delete_by_id(&self, id: ProductId) -> ProductResult<()> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.product_id() != id);

        if products.len() == before {
            return Err(ProductError::NotFound(id));
        }
        Ok(())
    }

    async fn aggregate_stats(&self) -> ProductResult<ProductStats> {
        let products = self.products.read().await;
        if products.is_empty() {
            return Ok(ProductStats::default());
        }

        let total: f64 = products.iter().map(|p| p.price).sum();
        Ok(ProductStats {
            count: products.len() as u64,
            avg_price: total / products.len() as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryBuilder;

    fn new_product(title: &str, price: f64) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            description: Some(format!("{title} description")),
            price,
            category: "kitchen".to_string(),
            owner: "owner-1".to_string(),
            stock: 1,
            published: true,
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_product() {
        let repo = InMemoryProductRepository::new();
        let mut product = new_product("Kettle", 30.0);
        product.images = vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()];
        product.price = -1.0;

        let errors = match repo.insert(product).await {
            Err(ProductError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("images"));
        assert!(fields.contains_key("price"));
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_literal() {
        let repo = InMemoryProductRepository::new();
        repo.insert(new_product("Espresso Grinder", 200.0)).await.unwrap();
        repo.insert(new_product("Tea pot (large)", 40.0)).await.unwrap();

        let query = QueryBuilder::new().search(Some("GRIND")).build();
        let found = repo.find_by_filter(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Espresso Grinder");

        let query = QueryBuilder::new().search(Some("(large)")).build();
        assert_eq!(repo.find_by_filter(&query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sort_descending_by_price() {
        let repo = InMemoryProductRepository::new();
        for (title, price) in [("a", 10.0), ("b", 30.0), ("c", 20.0)] {
            repo.insert(new_product(title, price)).await.unwrap();
        }

        let query = QueryBuilder::new()
            .sort(Some("price"), Some("desc"))
            .unwrap()
            .build();
        let prices: Vec<f64> = repo
            .find_by_filter(&query)
            .await
            .unwrap()
            .iter()
            .map(|p| p.price)
            .collect();
        assert_eq!(prices, vec![30.0, 20.0, 10.0]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = InMemoryProductRepository::new();
        let id = ProductId::from(mongodb::bson::oid::ObjectId::new());
        assert!(matches!(
            repo.delete_by_id(id).await,
            Err(ProductError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stats() {
        let repo = InMemoryProductRepository::new();
        assert_eq!(repo.aggregate_stats().await.unwrap(), ProductStats::default());

        for price in [10.0, 20.0, 30.0] {
            repo.insert(new_product("item", price)).await.unwrap();
        }
        let stats = repo.aggregate_stats().await.unwrap();
        assert_eq!(stats.count, 3);
        assert!((stats.avg_price - 20.0).abs() < f64::EPSILON);
    }
}
