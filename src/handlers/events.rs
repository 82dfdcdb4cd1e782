use axum::{extract::State, routing::get, Router};
use std::sync::Arc;

use crate::database::{Record, Store};
use crate::middleware::{ApiResult, PathParams, RequestBody};
use crate::resource::{Delegation, ResourceRouter, EVENTS, USERS};

/// `GET /:userId/events`, relative to `/api/users`.
///
/// Events are not given a nested router of their own; this single route
/// lists a user's events without going through a partner.
pub fn routes(store: Arc<dyn Store>) -> Router {
    let path = format!("/:{}/{}", USERS.primary_key, EVENTS.path);
    Router::new()
        .route(&path, get(list_for_user))
        .with_state(ResourceRouter::new(&EVENTS, store))
}

async fn list_for_user(
    State(events): State<ResourceRouter>,
    PathParams(params): PathParams,
    RequestBody(body): RequestBody,
) -> ApiResult<Vec<Record>> {
    let request = Delegation::new(USERS.primary_key).forward(params, body)?;
    // Neither the user nor an event id may be given in the body
    Record::check_path_fields(events.spec(), request.body.as_ref())?;
    events.list(&request).await
}
