//! Readiness probe

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use axum_helpers::HealthCheckFuture;
use database::mongodb::check_health_detailed;
use mongodb::Database;
use serde_json::Value;

/// `/ready` answers 503 while MongoDB does not respond to `ping`
pub fn router(db: Database) -> Router {
    Router::new().route("/ready", get(ready)).with_state(db)
}

async fn ready(State(db): State<Database>) -> (StatusCode, Json<Value>) {
    let mongo: HealthCheckFuture<'_> = Box::pin(async move {
        let status = check_health_detailed(&db).await;
        if status.healthy {
            Ok(())
        } else {
            Err(status
                .message
                .unwrap_or_else(|| "ping failed".to_string()))
        }
    });

    axum_helpers::run_health_checks(vec![("mongodb", mongo)]).await
}
