//! HTTP handlers for Products API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    ValidatedJson,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::ProductResult;
use crate::identity::Identity;
use crate::models::{
    CreateProduct, DeleteResponse, Product, ProductId, ProductResponse, ProductStats,
    UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        query_products,
        product_stats,
        products_by_category,
        sorted_products,
        search_products,
        products_in_price_range,
        paginated_products,
    ),
    components(
        schemas(
            ProductResponse, CreateProduct, UpdateProduct, ProductStats, DeleteResponse, Identity
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog and query endpoints")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/query", get(query_products))
        .route("/stats", get(product_stats))
        .route("/category", get(products_by_category))
        .route("/sort", get(sorted_products))
        .route("/search", get(search_products))
        .route("/price-range", get(products_in_price_range))
        .route("/paginated", get(paginated_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryParams {
    /// Exact category name
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PriceRangeParams {
    /// Inclusive lower bound
    pub min_price: Option<String>,
    /// Inclusive upper bound
    pub max_price: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SortParams {
    /// title, price, category, stock, published or createdAt (default)
    pub sort_by: Option<String>,
    /// `desc` for descending; anything else sorts ascending
    pub order: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number, default 1
    pub page: Option<String>,
    /// Page size, default 10, at most 100
    pub limit: Option<String>,
}

fn respond(products: Vec<Product>) -> Json<Vec<ProductResponse>> {
    Json(products.into_iter().map(ProductResponse::from).collect())
}

/// List all products
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = Vec<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service.list_products().await?;
    Ok(respond(products))
}

/// Create a new product owned by the caller
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    identity: Identity,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input, &identity).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    id: ProductId,
) -> ProductResult<Json<ProductResponse>> {
    let product = service.get_product(id).await?;
    Ok(Json(product.into()))
}

/// Update the supplied fields of a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24 hex characters)")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    id: ProductId,
    identity: Option<Identity>,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<ProductResponse>> {
    let product = service
        .update_product(id, input, identity.as_ref())
        .await?;
    Ok(Json(product.into()))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Product deleted successfully", body = DeleteResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    id: ProductId,
    identity: Option<Identity>,
) -> ProductResult<Json<DeleteResponse>> {
    service.delete_product(id, identity.as_ref()).await?;
    Ok(Json(DeleteResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

/// Filter by exact field values, optionally combined with search, price
/// range, sort and pagination parameters
#[utoipa::path(
    get,
    path = "/query",
    tag = "Products",
    params(
        ("title" = Option<String>, Query, description = "Exact title"),
        ("description" = Option<String>, Query, description = "Exact description"),
        ("category" = Option<String>, Query, description = "Exact category"),
        ("owner" = Option<String>, Query, description = "Owner user id"),
        ("price" = Option<f64>, Query, description = "Exact price"),
        ("stock" = Option<i64>, Query, description = "Exact stock"),
        ("published" = Option<bool>, Query, description = "Published flag"),
    ),
    responses(
        (status = 200, description = "Matching products", body = Vec<ProductResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn query_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<HashMap<String, String>>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service.query_products(&params).await?;
    Ok(respond(products))
}

/// Product count and mean price
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Products",
    responses(
        (status = 200, description = "Collection statistics", body = ProductStats),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn product_stats<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<ProductStats>> {
    let stats = service.stats().await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/category",
    tag = "Products",
    params(CategoryParams),
    responses(
        (status = 200, description = "Products in the category", body = Vec<ProductResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn products_by_category<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<CategoryParams>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service.by_category(params.category.as_deref()).await?;
    Ok(respond(products))
}

#[utoipa::path(
    get,
    path = "/sort",
    tag = "Products",
    params(SortParams),
    responses(
        (status = 200, description = "Sorted products", body = Vec<ProductResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn sorted_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<SortParams>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service
        .sorted(params.sort_by.as_deref(), params.order.as_deref())
        .await?;
    Ok(respond(products))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Products",
    params(SearchParams),
    responses(
        (status = 200, description = "Products whose title or description match", body = Vec<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<SearchParams>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service.search(params.search.as_deref()).await?;
    Ok(respond(products))
}

#[utoipa::path(
    get,
    path = "/price-range",
    tag = "Products",
    params(PriceRangeParams),
    responses(
        (status = 200, description = "Products priced within the bounds", body = Vec<ProductResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn products_in_price_range<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<PriceRangeParams>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service
        .price_range(params.min_price.as_deref(), params.max_price.as_deref())
        .await?;
    Ok(respond(products))
}

#[utoipa::path(
    get,
    path = "/paginated",
    tag = "Products",
    params(PageParams),
    responses(
        (status = 200, description = "One page of products", body = Vec<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn paginated_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<PageParams>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service
        .paginated(params.page.as_deref(), params.limit.as_deref())
        .await?;
    Ok(respond(products))
}
