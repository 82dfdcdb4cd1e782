// Request extractors whose rejections become ApiError, so a malformed path or
// body is rendered in the same failure envelope as every other error.

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::PathRejection, FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ApiError;

/// All path parameters captured by the matched route, including those
/// declared by an outer nest prefix such as `/:userId/partners`
#[derive(Debug, Clone, Default)]
pub struct PathParams(pub HashMap<String, String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PathParams {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<HashMap<String, String>>::from_request_parts(parts, state).await {
            Ok(Path(params)) => Ok(Self(params)),
            // Routes without parameters, such as a top-level list
            Err(PathRejection::MissingPathParams(_)) => Ok(Self::default()),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// Optional JSON body. An empty body is `None`; anything else must parse as
/// JSON, whatever the content type says.
#[derive(Debug, Clone, Default)]
pub struct RequestBody(pub Option<Value>);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for RequestBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large(rejection.body_text())
            } else {
                ApiError::bad_request(rejection.body_text())
            }
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        let value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::invalid_json(format!("Invalid JSON body: {}", e)))?;
        Ok(Self(Some(value)))
    }
}
