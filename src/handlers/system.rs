use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::database::Store;

pub fn routes(store: Arc<dyn Store>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(store)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "message": "userbase API",
        "results": {
            "version": version,
            "endpoints": {
                "users": "/api/users[/:userId]",
                "partners": "/api/users/:userId/partners[/:partnerId]",
                "logins": "/api/users/:userId/logins[/:loginId]",
                "surveys": "/api/users/:userId/surveys[/:surveyId]",
                "journals": "/api/users/:userId/journals[/:journalId]",
                "events": "/api/users/:userId/events (read-only)",
                "health": "/health",
            }
        }
    }))
}

async fn health(State(store): State<Arc<dyn Store>>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "ok",
                "results": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE"
                })),
            )
        }
    }
}
