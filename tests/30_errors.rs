mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use serde_json::json;
use userbase_api::config::AppConfig;

use common::{assert_failure, assert_success, TestApp};

#[tokio::test]
async fn identifier_in_body_is_rejected_before_the_store() -> Result<()> {
    let app = TestApp::new();
    // Any store call would now answer 503
    app.store.set_unavailable(true);

    for body in [json!({ "userId": 2 }), json!({ "userId": null })] {
        let (status, response) = app.put("/api/users/1", body).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", response);
        assert_failure(&response);
        assert_eq!(response["message"], json!("Request body cannot contain userId"));
        assert_eq!(response["code"], json!("VALIDATION_ERROR"));
    }

    let (status, _) = app.post("/api/users", json!({ "userId": 5 })).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .call(Method::GET, "/api/users/1", Some(json!({ "userId": 1 })))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn system_fields_are_not_writable() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/users", json!({ "createdAt": "2019-10-09T00:00:00Z" }))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
    assert_failure(&body);
    Ok(())
}

#[tokio::test]
async fn unknown_fields_are_listed() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/users", json!({ "firstName": "Ada", "shoeSize": 38 }))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"]["shoeSize"], json!("Field is not writable"));

    let (_, body) = app.get("/api/users").await?;
    assert_eq!(body["results"], json!([]));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_bad_request() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.call_raw(Method::POST, "/api/users", "{not json").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&body);
    assert_eq!(body["code"], json!("INVALID_JSON"));

    let (status, body) = app.post("/api/users", json!([1, 2, 3])).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INVALID_JSON"));
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_rejected() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.max_request_size_bytes = 32;
    let app = TestApp::with_config(&config);

    let (status, body) = app
        .post("/api/users", json!({ "firstName": "x".repeat(64) }))
        .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_failure(&body);
    Ok(())
}

#[tokio::test]
async fn store_outage_is_service_unavailable() -> Result<()> {
    let app = TestApp::new();
    app.store.set_unavailable(true);

    let (status, body) = app.get("/api/users").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_failure(&body);
    assert_eq!(body["code"], json!("SERVICE_UNAVAILABLE"));
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_enveloped() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/api/nothing").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_failure(&body);
    assert_eq!(body["message"], json!("No route for /api/nothing"));
    Ok(())
}

#[tokio::test]
async fn wrong_method_is_enveloped() -> Result<()> {
    let app = TestApp::new();

    let request = axum::http::Request::builder()
        .method(Method::DELETE)
        .uri("/api/users")
        .body(axum::body::Body::empty())?;
    let (status, body) = app.send(request).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_failure(&body);
    assert_eq!(body["code"], json!("METHOD_NOT_ALLOWED"));
    Ok(())
}

#[tokio::test]
async fn health_follows_the_store() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_success(&body);
    assert_eq!(body["results"]["database"], json!("ok"));

    app.store.set_unavailable(true);
    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_failure(&body);
    Ok(())
}

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_success(&body);
    assert!(body["results"]["endpoints"]["users"].is_string(), "{}", body);
    Ok(())
}

#[tokio::test]
async fn cors_preflight_is_answered() -> Result<()> {
    let app = TestApp::new();

    let request = axum::http::Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/users")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(axum::body::Body::empty())?;
    let response = tower::ServiceExt::oneshot(userbase_api::app(app.store.clone(), &AppConfig::development()), request).await?;
    assert!(response.status().is_success(), "preflight returned {}", response.status());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    Ok(())
}
