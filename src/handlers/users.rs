use axum::Router;
use std::sync::Arc;

use crate::database::Store;
use crate::resource::catalog::USER_CHILDREN;
use crate::resource::{delegate, ResourceRouter, USERS};

use super::events;

/// Router mounted at `/api/users`.
///
/// `/` and `/:userId` are the users resource itself. Each child resource is
/// nested at `/:userId/<child>` behind delegation, and events are served by
/// a flat read-only route instead of a nested router.
pub fn routes(store: Arc<dyn Store>) -> Router {
    let mut router = ResourceRouter::new(&USERS, store.clone()).routes();

    for child in USER_CHILDREN {
        router = delegate::mount(router, &USERS, ResourceRouter::new(child, store.clone()));
    }

    router.merge(events::routes(store))
}
