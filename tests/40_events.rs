mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;
use userbase_api::database::seed::seed;

use common::{assert_failure, assert_success, TestApp};

#[tokio::test]
async fn events_list_is_empty_without_events() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/api/users/7/events").await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_success(&body);
    assert_eq!(body["message"], json!("API returned list of all Events for userId 7"));
    assert_eq!(body["results"], json!([]));
    Ok(())
}

#[tokio::test]
async fn events_are_listed_per_user() -> Result<()> {
    let app = TestApp::new();
    seed(app.store.as_ref()).await?;

    let (status, body) = app.get("/api/users/1/events").await?;
    assert_eq!(status, StatusCode::OK);
    let rows = body["results"].as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 1, "{}", body);
    assert_eq!(rows[0]["userId"], json!(1));
    assert_eq!(rows[0]["partnerId"], json!(1));

    let (_, body) = app.get("/api/users/99/events").await?;
    assert_eq!(body["results"], json!([]));
    Ok(())
}

#[tokio::test]
async fn event_identifier_in_body_is_rejected() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .call(Method::GET, "/api/users/7/events", Some(json!({ "eventId": 1 })))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_failure(&body);
    assert_eq!(body["message"], json!("Request body cannot contain eventId"));
    Ok(())
}

#[tokio::test]
async fn events_are_read_only() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.post("/api/users/7/events", json!({ "title": "Trip" })).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_failure(&body);
    Ok(())
}

#[tokio::test]
async fn seeding_twice_is_harmless() -> Result<()> {
    let app = TestApp::new();
    assert_eq!(seed(app.store.as_ref()).await?, 9);
    assert_eq!(seed(app.store.as_ref()).await?, 0);

    let (_, body) = app.get("/api/users").await?;
    assert_eq!(body["results"].as_array().map(Vec::len), Some(3));
    Ok(())
}
