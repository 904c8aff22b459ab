//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::{FindOptions, IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, ProductId, ProductStats, UpdateProduct};
use crate::query::{Criterion, FilterValue, ProductQuery, SortDirection, SortField};
use crate::repository::ProductRepository;

pub const COLLECTION: &str = "products";

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    /// Use a collection other than `products`
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Product>(collection_name),
        }
    }

    /// Create the indexes the query endpoints rely on
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = [
            ("category", "idx_category"),
            ("price", "idx_price"),
            ("createdAt", "idx_created_at"),
            ("owner", "idx_owner"),
        ]
        .into_iter()
        .map(|(field, name)| {
            IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build()
        })
        .collect::<Vec<_>>();

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    pub fn collection(&self) -> &Collection<Product> {
        &self.collection
    }

    /// Translate query criteria into a filter document
    pub(crate) fn build_filter(query: &ProductQuery) -> Document {
        let mut filter = Document::new();
        let mut clauses = Vec::new();

        for criterion in query.criteria() {
            match criterion {
                Criterion::Equals(field, value) => {
                    let value = match value {
                        FilterValue::Text(s) => Bson::String(s.clone()),
                        FilterValue::Number(n) => Bson::Double(*n),
                        FilterValue::Integer(i) => Bson::Int64(*i),
                        FilterValue::Bool(b) => Bson::Boolean(*b),
                    };
                    let key = field.to_string();
                    clauses.push(doc! { key: value });
                }
                Criterion::Search(term) => {
                    let pattern = regex::escape(term);
                    clauses.push(doc! {
                        "$or": [
                            { "title": { "$regex": pattern.as_str(), "$options": "i" } },
                            { "description": { "$regex": pattern.as_str(), "$options": "i" } },
                        ]
                    });
                }
                Criterion::PriceRange { min, max } => {
                    let mut range = Document::new();
                    if let Some(min) = min {
                        range.insert("$gte", *min);
                    }
                    if let Some(max) = max {
                        range.insert("$lte", *max);
                    }
                    clauses.push(doc! { "price": range });
                }
            }
        }

        // Single criterion stays flat; several are joined so repeated keys
        // (two price ranges, two searches) all apply
        match clauses.len() {
            0 => {}
            1 => filter = clauses.remove(0),
            _ => {
                filter.insert("$and", clauses);
            }
        }
        filter
    }

    /// Sort with `_id` as tie-breaker, then skip/limit for the page
    pub(crate) fn build_find_options(query: &ProductQuery) -> FindOptions {
        let mut options = FindOptions::default();

        if let Some(sort) = query.sort() {
            let direction = match sort.direction {
                SortDirection::Ascending => 1,
                SortDirection::Descending => -1,
            };
            let key = sort_key(sort.field);
            let mut spec = doc! { key: direction };
            if key != "_id" {
                spec.insert("_id", direction);
            }
            options.sort = Some(spec);
        }

        if let Some(page) = query.page() {
            options.skip = Some(page.skip());
            options.limit = Some(page.limit as i64);
        }

        options
    }

    /// `$set` document for the supplied fields
    fn build_update(update: UpdateProduct) -> Document {
        let mut set = Document::new();
        if let Some(title) = update.title {
            set.insert("title", title);
        }
        if let Some(description) = update.description {
            set.insert("description", description);
        }
        if let Some(price) = update.price {
            set.insert("price", price);
        }
        if let Some(category) = update.category {
            set.insert("category", category);
        }
        if let Some(stock) = update.stock {
            set.insert("stock", stock);
        }
        if let Some(published) = update.published {
            set.insert("published", published);
        }
        if let Some(images) = update.images {
            set.insert("images", images);
        }
        set
    }
}

fn sort_key(field: SortField) -> &'static str {
    match field {
        SortField::Title => "title",
        SortField::Price => "price",
        SortField::Category => "category",
        SortField::Stock => "stock",
        SortField::Published => "published",
        SortField::CreatedAt => "createdAt",
        SortField::Id => "_id",
    }
}

/// `$group` emits `count` as whichever numeric type the server picked
fn read_count(value: Option<&Bson>) -> u64 {
    match value {
        Some(Bson::Int32(n)) => (*n).max(0) as u64,
        Some(Bson::Int64(n)) => (*n).max(0) as u64,
        Some(Bson::Double(n)) => n.max(0.0) as u64,
        _ => 0,
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        let cursor = self.collection.find(doc! {}).await?;
        let products: Vec<Product> = cursor.try_collect().await?;
        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn find_by_id(&self, id: ProductId) -> ProductResult<Product> {
        self.collection
            .find_one(doc! { "_id": id.as_object_id() })
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn find_by_filter(&self, query: &ProductQuery) -> ProductResult<Vec<Product>> {
        let filter = Self::build_filter(query);
        let options = Self::build_find_options(query);

        let cursor = self.collection.find(filter).with_options(options).await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        tracing::debug!(count = products.len(), "Products matched");
        Ok(products)
    }

    #[instrument(skip(self, product), fields(title = %product.title, owner = %product.owner))]
    async fn insert(&self, product: NewProduct) -> ProductResult<Product> {
        product.validate()?;
        let product = Product::from_new(product);

        self.collection.insert_one(&product).await?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self, update), fields(product_id = %id))]
    async fn update_by_id(&self, id: ProductId, update: UpdateProduct) -> ProductResult<Product> {
        let set = Self::build_update(update);
        if set.is_empty() {
            return self.find_by_id(id).await;
        }

        let product = self
            .collection
            .find_one_and_update(doc! { "_id": id.as_object_id() }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        tracing::info!("Product updated successfully");
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_by_id(&self, id: ProductId) -> ProductResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.as_object_id() })
            .await?;

        if result.deleted_count == 0 {
            return Err(ProductError::NotFound(id));
        }

        tracing::info!("Product deleted successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn aggregate_stats(&self) -> ProductResult<ProductStats> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": Bson::Null,
                "count": { "$sum": 1 },
                "avgPrice": { "$avg": "$price" },
            }
        }];

        let mut cursor = self.collection.aggregate(pipeline).await?;
        let Some(group) = cursor.try_next().await? else {
            return Ok(ProductStats::default());
        };

        Ok(ProductStats {
            count: read_count(group.get("count")),
            avg_price: group.get_f64("avgPrice").unwrap_or(0.0),
        })
    }
}
