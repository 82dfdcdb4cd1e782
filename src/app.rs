use axum::{
    extract::{DefaultBodyLimit, Request},
    http::HeaderValue,
    Router,
};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers::{system, users};
use crate::middleware::{envelope_bare_errors, fallback, panic_response};

/// Full application router over `store`
pub fn app(store: Arc<dyn Store>, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .merge(system::routes(store.clone()))
        // Resources
        .nest("/api/users", users::routes(store))
        .fallback(fallback)
        // Global middleware
        .layer(axum::middleware::from_fn(envelope_bare_errors))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(CatchPanicLayer::custom(panic_response));

    let router = match cors_layer(config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
    } else {
        router
    }
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }
    if config.security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
