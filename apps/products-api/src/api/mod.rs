//! API routes module

pub mod health;
pub mod identity;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/products", products::router(state))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    products::init_indexes(state).await
}

#[cfg(test)]
mod tests {
    use super::products::secured_router;
    use crate::config::{Config, Environment};
    use crate::state::AppState;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use axum_helpers::{JwtAuth, JwtConfig};
    use core_config::{app_info, server::ServerConfig};
    use database::mongodb::MongoConfig;
    use domain_products::{InMemoryProductRepository, OwnershipPolicy, ProductService};
    use domain_users::{InMemoryUserRepository, User, UserService};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &str = "products-api-test-secret-0123456789";

    struct TestApp {
        router: Router,
        auth: JwtAuth,
        user: User,
    }

    async fn app(policy: OwnershipPolicy) -> TestApp {
        let auth = JwtAuth::new(&JwtConfig::new(SECRET));
        let users = InMemoryUserRepository::new();
        let user = User::new("ada", "ada@example.com");
        users.insert(user.clone()).await;

        let products = ProductService::new(InMemoryProductRepository::new()).with_policy(policy);
        let router = Router::new().nest(
            "/products",
            secured_router(products, UserService::new(users), auth.clone()),
        );

        TestApp { router, auth, user }
    }

    fn create_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/products")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = json!({
            "title": "Kettle",
            "description": "1.7l, stainless",
            "price": 39.5,
            "category": "kitchen",
            "stock": 3
        });
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_records_resolved_owner() {
        let app = app(OwnershipPolicy::Unrestricted).await;
        let token = app
            .auth
            .create_access_token(&app.user.id.to_hex(), &app.user.email, &app.user.username)
            .unwrap();

        let response = app
            .router
            .oneshot(create_request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response.into_body()).await;
        assert_eq!(body["owner"], app.user.id.to_hex());
        assert_eq!(body["title"], "Kettle");
    }

    #[tokio::test]
    async fn test_create_without_token_is_unauthorized() {
        let app = app(OwnershipPolicy::Unrestricted).await;

        let response = app.router.oneshot(create_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_subject_is_unauthorized() {
        let app = app(OwnershipPolicy::Unrestricted).await;
        let stranger = User::new("eve", "eve@example.com");
        let token = app
            .auth
            .create_access_token(&stranger.id.to_hex(), &stranger.email, &stranger.username)
            .unwrap();

        let response = app
            .router
            .oneshot(create_request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_email_mismatch_is_unauthorized() {
        let app = app(OwnershipPolicy::Unrestricted).await;
        let token = app
            .auth
            .create_access_token(&app.user.id.to_hex(), "someone-else@example.com", "ada")
            .unwrap();

        let response = app
            .router
            .oneshot(create_request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let app = app(OwnershipPolicy::Unrestricted).await;

        let response = app
            .router
            .oneshot(create_request(Some("not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_anonymous_reads_are_allowed() {
        let app = app(OwnershipPolicy::OwnerOnly).await;

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .uri("/products/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response.into_body()).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_mongo_backed_routes_reject_malformed_id() {
        let config = Config {
            app: app_info!(),
            mongodb: MongoConfig::with_database("mongodb://localhost:27017", "storefront"),
            server: ServerConfig::default(),
            environment: Environment::Development,
            jwt: JwtConfig::new(SECRET),
            ownership: OwnershipPolicy::OwnerOnly,
        };
        // Client construction is lazy; nothing is dialed until a query runs
        let client = mongodb::Client::with_uri_str(config.mongodb.url())
            .await
            .unwrap();
        let state = AppState::new(config, client);

        let response = super::routes(&state)
            .oneshot(
                Request::builder()
                    .uri("/products/not-an-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
