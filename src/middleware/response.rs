use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success envelope: `{ success: true, message, results? }`.
///
/// Only 2xx constructors exist, so `success` always agrees with the status.
#[derive(Debug)]
pub struct Envelope<T: Serialize> {
    pub message: String,
    pub results: Option<T>,
    status: StatusCode,
}

impl<T: Serialize> Envelope<T> {
    /// 200 OK with a payload
    pub fn ok(message: impl Into<String>, results: T) -> Self {
        Self {
            message: message.into(),
            results: Some(results),
            status: StatusCode::OK,
        }
    }

    /// 201 Created with the new record
    pub fn created(message: impl Into<String>, results: T) -> Self {
        Self {
            message: message.into(),
            results: Some(results),
            status: StatusCode::CREATED,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl Envelope<()> {
    /// 200 OK confirming an action, without a `results` key
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            results: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(true));
        body.insert("message".into(), Value::String(self.message));

        if let Some(results) = self.results {
            match serde_json::to_value(results) {
                Ok(value) => {
                    body.insert("results".into(), value);
                }
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "success": false,
                            "message": "Failed to serialize response data",
                            "code": "INTERNAL_SERVER_ERROR"
                        })),
                    )
                        .into_response();
                }
            }
        }

        (self.status, Json(Value::Object(body))).into_response()
    }
}

pub type ApiResult<T> = Result<Envelope<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn ok_carries_results() {
        let response = Envelope::ok("API returned list of all Users", vec![1, 2]).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_of(response).await;
        assert_eq!(body, json!({ "success": true, "message": "API returned list of all Users", "results": [1, 2] }));
    }

    #[tokio::test]
    async fn created_uses_201() {
        let response = Envelope::created("made", json!({ "userId": 1 })).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn message_only_omits_results() {
        let response = Envelope::message_only("API deleted User with userId of 3").into_response();
        let body = body_of(response).await;
        assert_eq!(body["success"], json!(true));
        assert!(body.get("results").is_none());
    }

    #[tokio::test]
    async fn empty_list_is_still_present() {
        let empty: Vec<Value> = Vec::new();
        let body = body_of(Envelope::ok("none", empty).into_response()).await;
        assert_eq!(body["results"], json!([]));
    }
}
