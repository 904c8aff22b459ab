use axum::{extract::FromRequestParts, extract::Path, http::request::Parts};
use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::fmt;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::ProductError;

/// Most images a product may carry
pub const MAX_IMAGES: usize = 4;

/// Store-assigned product identifier, rendered as 24 hex characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(ObjectId);

impl ProductId {
    /// Parse the hex form used in paths and JSON
    pub fn parse(raw: &str) -> Result<Self, ProductError> {
        ObjectId::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| ProductError::InvalidId(raw.to_string()))
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for ProductId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// Extracts the `{id}` path segment; malformed ids are a 400, not a 404
impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = ProductError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ProductError::InvalidId(e.body_text()))?;
        ProductId::parse(&raw)
    }
}

/// Product document as stored in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    /// User id of the identity that created the product
    pub owner: String,
    pub stock: i64,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: bson::DateTime,
}

impl Product {
    pub fn product_id(&self) -> ProductId {
        ProductId(self.id)
    }

    /// Stamp a validated [`NewProduct`] with a fresh id and creation time
    pub fn from_new(input: NewProduct) -> Self {
        Self {
            id: ObjectId::new(),
            title: input.title,
            description: input.description,
            price: input.price,
            category: input.category,
            owner: input.owner,
            stock: input.stock,
            published: input.published,
            images: input.images,
            created_at: bson::DateTime::now(),
        }
    }

    /// Overwrite every field supplied in `update`; `id`, `owner` and
    /// `createdAt` never change.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(published) = update.published {
            self.published = published;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
    }
}

fn default_published() -> bool {
    true
}

/// A product ready for insertion: every field known, owner bound
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewProduct {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(custom(function = "not_blank"))]
    pub category: String,
    #[validate(custom(function = "not_blank"))]
    pub owner: String,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i64,
    pub published: bool,
    #[validate(
        length(max = 4, message = "Images array should contain a maximum of 4 URLs"),
        custom(function = "no_blank_images")
    )]
    pub images: Vec<String>,
}

/// Request body for creating a product.
///
/// Everything is optional at the serde level so missing fields can be
/// reported together. `owner` is not accepted; it comes from the caller's
/// identity.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProduct {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Espresso grinder")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    #[schema(example = 249.0)]
    pub price: Option<f64>,
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "kitchen")]
    pub category: Option<String>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    #[schema(example = 12)]
    pub stock: Option<i64>,
    /// Defaults to `true` only when omitted
    pub published: Option<bool>,
    /// Up to 4 already-stored image URIs
    #[validate(
        length(max = 4, message = "Images array should contain a maximum of 4 URLs"),
        custom(function = "no_blank_images")
    )]
    pub images: Option<Vec<String>>,
}

impl CreateProduct {
    /// Names of the required fields that are absent
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        if self.stock.is_none() {
            missing.push("stock");
        }
        missing
    }
}

/// Partial update body; absent fields are left unchanged.
///
/// `price` and `stock` accept numbers or numeric strings and are ignored when
/// they hold anything else.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProduct {
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    #[schema(value_type = Option<f64>)]
    pub price: Option<f64>,
    #[validate(custom(function = "not_blank"))]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    #[validate(range(min = 0, message = "stock must not be negative"))]
    #[schema(value_type = Option<i64>)]
    pub stock: Option<i64>,
    pub published: Option<bool>,
    #[validate(
        length(max = 4, message = "Images array should contain a maximum of 4 URLs"),
        custom(function = "no_blank_images")
    )]
    pub images: Option<Vec<String>>,
}

impl UpdateProduct {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Product as returned over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[schema(example = "65f1c0ffee0000000000beef")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub owner: String,
    pub stock: i64,
    pub published: bool,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_hex(),
            title: product.title,
            description: product.description,
            price: product.price,
            category: product.category,
            owner: product.owner,
            stock: product.stock,
            published: product.published,
            images: product.images,
            created_at: DateTime::from_timestamp_millis(product.created_at.timestamp_millis())
                .unwrap_or_default(),
        }
    }
}

/// Collection-wide statistics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub count: u64,
    pub avg_price: f64,
}

/// Confirmation body for deletes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "Product deleted successfully")]
    pub message: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

fn no_blank_images(images: &[String]) -> Result<(), ValidationError> {
    if images.iter().any(|uri| uri.trim().is_empty()) {
        return Err(ValidationError::new("blank_image")
            .with_message(Cow::Borrowed("image URIs must not be blank")));
    }
    Ok(())
}

/// Number or numeric string; anything else reads as absent
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
    .filter(|n| n.is_finite()))
}

/// Integer or integral string; anything else reads as absent
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }))
}

fn integral(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_product() -> NewProduct {
        NewProduct {
            title: "Kettle".to_string(),
            description: Some("1.7l, stainless".to_string()),
            price: 39.5,
            category: "kitchen".to_string(),
            owner: "65f1c0ffee0000000000beef".to_string(),
            stock: 3,
            published: true,
            images: vec![],
        }
    }

    #[test]
    fn test_product_id_parse() {
        let id = ObjectId::new();
        assert_eq!(ProductId::parse(&id.to_hex()).unwrap().as_object_id(), id);
        assert!(matches!(
            ProductId::parse("not-an-id"),
            Err(ProductError::InvalidId(_))
        ));
        assert!(ProductId::parse("").is_err());
    }

    #[test]
    fn test_new_product_valid() {
        assert!(new_product().validate().is_ok());
    }

    #[test]
    fn test_new_product_reports_every_invalid_field() {
        let input = NewProduct {
            title: "   ".to_string(),
            price: -1.0,
            stock: -4,
            images: (0..5).map(|i| format!("https://cdn.example.com/{i}.png")).collect(),
            ..new_product()
        };

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["title", "price", "stock", "images"] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
        assert!(!fields.contains_key("category"));
    }

    #[test]
    fn test_four_images_allowed() {
        let input = NewProduct {
            images: (0..MAX_IMAGES).map(|i| format!("https://cdn.example.com/{i}.png")).collect(),
            ..new_product()
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_create_product_missing_fields() {
        let body: CreateProduct = serde_json::from_value(json!({"title": "Kettle", "price": 0})).unwrap();
        assert_eq!(body.missing_fields(), vec!["description", "category", "stock"]);
    }

    #[test]
    fn test_create_product_rejects_owner() {
        let result = serde_json::from_value::<CreateProduct>(json!({
            "title": "Kettle",
            "owner": "someone-else"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_product_lenient_numbers() {
        let update: UpdateProduct =
            serde_json::from_value(json!({"price": "12.5", "stock": "7"})).unwrap();
        assert_eq!(update.price, Some(12.5));
        assert_eq!(update.stock, Some(7));

        let update: UpdateProduct =
            serde_json::from_value(json!({"price": "cheap", "stock": true, "title": "New"})).unwrap();
        assert_eq!(update.price, None);
        assert_eq!(update.stock, None);
        assert_eq!(update.title.as_deref(), Some("New"));

        let update: UpdateProduct = serde_json::from_value(json!({"stock": 5.0})).unwrap();
        assert_eq!(update.stock, Some(5));

        let update: UpdateProduct = serde_json::from_value(json!({"stock": 2.5})).unwrap();
        assert_eq!(update.stock, None);
    }

    #[test]
    fn test_update_product_rejects_immutable_fields() {
        assert!(serde_json::from_value::<UpdateProduct>(json!({"owner": "x"})).is_err());
        assert!(serde_json::from_value::<UpdateProduct>(json!({"createdAt": "2024-01-01"})).is_err());
    }

    #[test]
    fn test_apply_update_only_touches_supplied_fields() {
        let mut product = Product::from_new(new_product());
        let before = product.clone();

        product.apply_update(UpdateProduct {
            stock: Some(5),
            ..Default::default()
        });

        assert_eq!(product.stock, 5);
        assert_eq!(
            Product {
                stock: before.stock,
                ..product
            },
            before
        );
    }

    #[test]
    fn test_response_renders_hex_id_and_camel_case() {
        let product = Product::from_new(new_product());
        let hex = product.id.to_hex();
        let json = serde_json::to_value(ProductResponse::from(product)).unwrap();

        assert_eq!(json["id"], hex);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("_id").is_none());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let json = serde_json::to_value(ProductStats {
            count: 3,
            avg_price: 20.0,
        })
        .unwrap();
        assert_eq!(json["count"], 3);
        assert_eq!(json["avgPrice"].as_f64(), Some(20.0));
    }
}
