// Parent → child delegation.
//
// A child router is nested under `/:userId/<child>`, but its own routes only
// declare its own identifier. The parent identifier is resolved here, once,
// and handed to the child as part of an explicit `ScopedRequest` value.

use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::error::ApiError;
use crate::resource::{ResourceRouter, ResourceSpec};

/// The parent a child-resource request is confined to, e.g. `userId = 7`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentScope {
    pub field: &'static str,
    pub id: i64,
}

impl fmt::Display for ParentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.id)
    }
}

/// Everything a resource operation needs from the HTTP request
#[derive(Debug, Clone, Default)]
pub struct ScopedRequest {
    pub parent: Option<ParentScope>,
    pub params: HashMap<String, String>,
    pub body: Option<Value>,
}

impl ScopedRequest {
    /// A request against a top-level resource
    pub fn unscoped(params: HashMap<String, String>, body: Option<Value>) -> Self {
        Self {
            parent: None,
            params,
            body,
        }
    }

    /// Parse the record identifier named by the resource's primary key
    pub fn record_id(&self, spec: &ResourceSpec) -> Result<i64, ApiError> {
        let raw = self.params.get(spec.primary_key).ok_or_else(|| {
            ApiError::validation_error(format!("Request params missing {}", spec.primary_key), None)
        })?;
        parse_id(spec.primary_key, raw)
    }
}

/// Resolves the parent identifier for one nested mount point and forwards.
///
/// Awaiting the parent id: a missing or malformed id ends the request here.
/// Forwarding: once resolved, the scoped request always goes to the child.
#[derive(Debug, Clone, Copy)]
pub struct Delegation {
    parent: &'static str,
}

impl Delegation {
    pub fn new(parent: &'static str) -> Self {
        Self { parent }
    }

    /// Delegation for a child resource, `None` for top-level resources
    pub fn for_resource(spec: &ResourceSpec) -> Option<Self> {
        spec.parent.map(Self::new)
    }

    /// Resolve the parent id from the path parameters
    pub fn resolve(&self, params: &HashMap<String, String>) -> Result<ParentScope, ApiError> {
        // Route matching guarantees the segment in a correct mount; its absence
        // means the child was mounted somewhere without the parent parameter.
        let raw = params.get(self.parent).ok_or_else(|| {
            tracing::error!("Request params missing {}; check the router mount", self.parent);
            ApiError::validation_error(format!("Request params missing {}", self.parent), None)
        })?;
        Ok(ParentScope {
            field: self.parent,
            id: parse_id(self.parent, raw)?,
        })
    }

    /// Build the scoped request handed to the child router
    pub fn forward(
        &self,
        params: HashMap<String, String>,
        body: Option<Value>,
    ) -> Result<ScopedRequest, ApiError> {
        let parent = self.resolve(&params)?;
        tracing::debug!("Forwarding with {}", parent);
        Ok(ScopedRequest {
            parent: Some(parent),
            params,
            body,
        })
    }
}

/// Nest `child` under `/:<parent primary key>/<child path>` of `router`
pub fn mount(router: Router, parent: &ResourceSpec, child: ResourceRouter) -> Router {
    debug_assert_eq!(
        child.spec().parent,
        Some(parent.primary_key),
        "{} is not a child of {}",
        child.spec().plural,
        parent.plural
    );
    let path = format!("/:{}/{}", parent.primary_key, child.spec().path);
    router.nest(&path, child.routes())
}

fn parse_id(field: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| {
        ApiError::validation_error(format!("{} must be an integer, got '{}'", field, raw), None)
    })
}
