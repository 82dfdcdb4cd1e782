// The last line of error normalization. Handler failures are already
// `ApiError`s; these cover what never reaches a handler body: panics and
// paths no route matches.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::any::Any;

use crate::error::ApiError;

/// Render a panic inside a handler as a 500 failure envelope.
/// Plugged into `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Handler panicked: {}", detail);

    ApiError::internal_server_error("An error occurred while processing your request").into_response()
}

/// Fallback for unmatched paths
pub async fn fallback(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

/// Status-only rejections (405 and friends) carry no body; give them the envelope
pub async fn envelope_bare_errors(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    if status == StatusCode::METHOD_NOT_ALLOWED {
        let mut enveloped = (
            status,
            axum::Json(serde_json::json!({
                "success": false,
                "message": "Method not allowed for this route",
                "code": "METHOD_NOT_ALLOWED"
            })),
        )
            .into_response();
        if let Some(allow) = response.headers().get(axum::http::header::ALLOW) {
            enveloped
                .headers_mut()
                .insert(axum::http::header::ALLOW, allow.clone());
        }
        return enveloped;
    }
    response
}
