use axum::{extract::State, routing::get, Router};
use chrono::Utc;
use std::sync::Arc;

use crate::database::{Criteria, Record, Store};
use crate::error::ApiError;
use crate::middleware::{ApiResult, Envelope, PathParams, RequestBody};
use crate::resource::{Delegation, ParentScope, ResourceSpec, ScopedRequest};
use crate::types::Operation;

/// CRUD over one table, driven by a static `ResourceSpec`.
///
/// Every operation validates its input first, then makes exactly one store
/// call. Child resources receive their parent through `ScopedRequest` and
/// confine every read and write to that parent.
#[derive(Clone)]
pub struct ResourceRouter {
    spec: &'static ResourceSpec,
    store: Arc<dyn Store>,
}

impl ResourceRouter {
    pub fn new(spec: &'static ResourceSpec, store: Arc<dyn Store>) -> Self {
        Self { spec, store }
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    /// `/` and `/:<primary key>` routes, relative to the mount point
    pub fn routes(self) -> Router {
        let item = self.spec.item_path();
        Router::new()
            .route("/", get(list).post(create))
            .route(&item, get(get_one).put(update).delete(delete))
            .with_state(self)
    }

    /// Run delegation for child resources, wrap the request otherwise.
    /// Bodies of reads and writes may never name a path-only field.
    pub fn scope(
        &self,
        operation: Operation,
        PathParams(params): PathParams,
        RequestBody(body): RequestBody,
    ) -> Result<ScopedRequest, ApiError> {
        tracing::debug!(resource = self.spec.name, %operation, "dispatching");
        if operation.checks_body() {
            Record::check_path_fields(self.spec, body.as_ref())?;
        }
        match Delegation::for_resource(self.spec) {
            Some(delegation) => delegation.forward(params, body),
            None => Ok(ScopedRequest::unscoped(params, body)),
        }
    }

    pub async fn list(&self, request: &ScopedRequest) -> ApiResult<Vec<Record>> {
        let criteria = Criteria::all(self.spec).within(request.parent.as_ref());
        let records = self.store.select(&criteria).await?;

        let message = match &request.parent {
            Some(parent) => format!("API returned list of all {} for {}", self.spec.plural, parent),
            None => format!("API returned list of all {}", self.spec.plural),
        };
        Ok(Envelope::ok(message, records))
    }

    pub async fn get(&self, request: &ScopedRequest) -> ApiResult<Record> {
        let id = request.record_id(self.spec)?;

        let criteria = Criteria::by_id(self.spec, id).within(request.parent.as_ref());
        let record = self
            .store
            .select(&criteria)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found(request.parent.as_ref()))?;

        Ok(Envelope::ok(
            format!("API returned {} with {} of {}", self.spec.name, self.spec.primary_key, id),
            record,
        ))
    }

    pub async fn create(&self, request: ScopedRequest) -> ApiResult<Record> {
        let mut values = Record::from_api_input(self.spec, Operation::Create, request.body)?;
        if let Some(parent) = &request.parent {
            values.set(parent.field, parent.id);
        }
        values.stamp_created(Utc::now());

        let record = self
            .store
            .insert(self.spec.table, self.spec.primary_key, values)
            .await?;

        let id = record
            .id(self.spec.primary_key)
            .map(|id| id.to_string())
            .unwrap_or_default();
        tracing::info!("Created {} {}={}", self.spec.name, self.spec.primary_key, id);
        Ok(Envelope::created(
            format!(
                "API returned newly created {} with {} of {}",
                self.spec.name, self.spec.primary_key, id
            ),
            record,
        ))
    }

    pub async fn update(&self, request: ScopedRequest) -> ApiResult<Record> {
        let id = request.record_id(self.spec)?;
        let mut values = Record::from_api_input(self.spec, Operation::Update, request.body)?;
        values.stamp_updated(Utc::now());

        let criteria = Criteria::by_id(self.spec, id).within(request.parent.as_ref());
        let record = self
            .store
            .update(&criteria, values)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found(request.parent.as_ref()))?;

        tracing::info!("Updated {} {}={}", self.spec.name, self.spec.primary_key, id);
        Ok(Envelope::ok(
            format!(
                "API returned newly updated {} with {} of {}",
                self.spec.name, self.spec.primary_key, id
            ),
            record,
        ))
    }

    pub async fn delete(&self, request: &ScopedRequest) -> ApiResult<()> {
        let id = request.record_id(self.spec)?;

        let criteria = Criteria::by_id(self.spec, id).within(request.parent.as_ref());
        let removed = self.store.delete(&criteria).await?;
        if removed.is_empty() {
            return Err(self.not_found(request.parent.as_ref()));
        }

        tracing::info!("Deleted {} {}={}", self.spec.name, self.spec.primary_key, id);
        Ok(Envelope::message_only(format!(
            "API deleted {} with {} of {}",
            self.spec.name, self.spec.primary_key, id
        )))
    }

    fn not_found(&self, parent: Option<&ParentScope>) -> ApiError {
        let base = format!(
            "{} with provided {} does not exist",
            self.spec.name, self.spec.primary_key
        );
        match parent {
            Some(parent) => ApiError::not_found(format!("{} for {}", base, parent)),
            None => ApiError::not_found(base),
        }
    }
}

async fn list(
    State(router): State<ResourceRouter>,
    params: PathParams,
    body: RequestBody,
) -> ApiResult<Vec<Record>> {
    let request = router.scope(Operation::List, params, body)?;
    router.list(&request).await
}

async fn get_one(
    State(router): State<ResourceRouter>,
    params: PathParams,
    body: RequestBody,
) -> ApiResult<Record> {
    let request = router.scope(Operation::Get, params, body)?;
    router.get(&request).await
}

async fn create(
    State(router): State<ResourceRouter>,
    params: PathParams,
    body: RequestBody,
) -> ApiResult<Record> {
    let request = router.scope(Operation::Create, params, body)?;
    router.create(request).await
}

async fn update(
    State(router): State<ResourceRouter>,
    params: PathParams,
    body: RequestBody,
) -> ApiResult<Record> {
    let request = router.scope(Operation::Update, params, body)?;
    router.update(request).await
}

async fn delete(
    State(router): State<ResourceRouter>,
    params: PathParams,
    body: RequestBody,
) -> ApiResult<()> {
    let request = router.scope(Operation::Delete, params, body)?;
    router.delete(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::resource::{PARTNERS, USERS};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::collections::HashMap;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    /// Partners router over a store holding users 1..=`users`
    async fn partners(users: usize) -> ResourceRouter {
        let store = Arc::new(MemoryStore::new());
        for _ in 0..users {
            store.insert(USERS.table, USERS.primary_key, Record::new()).await.unwrap();
        }
        ResourceRouter::new(&PARTNERS, store)
    }

    fn scoped(user: &str, extra: &[(&str, &str)], body: Option<serde_json::Value>) -> ScopedRequest {
        let mut all = params(extra);
        all.insert("userId".to_string(), user.to_string());
        Delegation::new("userId").forward(all, body).unwrap()
    }

    #[tokio::test]
    async fn create_stamps_parent_and_timestamps() {
        let router = partners(1).await;
        let envelope = router
            .create(scoped("1", &[], Some(json!({ "nickname": "Bee" }))))
            .await
            .unwrap();

        assert_eq!(envelope.status(), StatusCode::CREATED);
        let record = envelope.results.unwrap();
        assert_eq!(record.id("userId"), Some(1));
        assert_eq!(record.id("partnerId"), Some(1));
        assert!(record.get("createdAt").is_some());
        assert_eq!(record.get("createdAt"), record.get("updatedAt"));
        assert_eq!(envelope.message, "API returned newly created Partner with partnerId of 1");
    }

    #[tokio::test]
    async fn get_is_confined_to_parent() {
        let router = partners(2).await;
        router.create(scoped("1", &[], None)).await.unwrap();

        let err = router
            .get(&scoped("2", &[("partnerId", "1")], None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.message(),
            "Partner with provided partnerId does not exist for userId 2"
        );
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let router = ResourceRouter::new(&USERS, Arc::new(MemoryStore::new()));
        let request = ScopedRequest::unscoped(params(&[("userId", "4")]), Some(json!({ "title": "Dr" })));
        let err = router.update(request).await.unwrap_err();
        assert_eq!(err.message(), "User with provided userId does not exist");
    }

    #[tokio::test]
    async fn validation_runs_before_store() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let router = ResourceRouter::new(&USERS, store);

        let request = ScopedRequest::unscoped(params(&[]), Some(json!({ "userId": 1 })));
        let err = router.create(request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn create_under_missing_parent_conflicts() {
        let router = partners(0).await;
        let err = router.create(scoped("7", &[], None)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn list_message_names_parent() {
        let router = partners(0).await;
        let envelope = router.list(&scoped("7", &[], None)).await.unwrap();
        assert_eq!(envelope.message, "API returned list of all Partners for userId 7");
        assert_eq!(envelope.results.map(|r| r.len()), Some(0));
    }
}
