use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resource::{ResourceSpec, CREATED_AT, UPDATED_AT};
use crate::types::Operation;

/// Columns only the write path may set
const SYSTEM_FIELDS: &[&str] = &[CREATED_AT, UPDATED_AT];

/// Errors raised while turning a request body into a writable record
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Request body cannot contain {0}")]
    PathFieldInBody(&'static str),
    #[error("System field '{0}' cannot be set via API input")]
    SystemFieldNotAllowed(&'static str),
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Unknown fields for {resource}: {}", .fields.join(", "))]
    UnknownFields {
        resource: &'static str,
        fields: Vec<String>,
    },
}

/// A database row or request payload as an ordered column → value map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a row that came back from the store (all columns allowed)
    pub fn from_row(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Reject path-only fields in a request body.
    ///
    /// Identifiers and parent references come from the URL; a body that
    /// also carries them would give two sources of truth for the same value.
    pub fn check_path_fields(spec: &ResourceSpec, body: Option<&Value>) -> Result<(), RecordError> {
        let Some(Value::Object(map)) = body else {
            return Ok(());
        };
        for field in spec.path_fields() {
            if map.contains_key(field) {
                return Err(RecordError::PathFieldInBody(field));
            }
        }
        Ok(())
    }

    /// Build a writable record from API input, validated against the
    /// resource's allow-list. An absent body is treated as an empty object.
    pub fn from_api_input(
        spec: &ResourceSpec,
        operation: Operation,
        body: Option<Value>,
    ) -> Result<Self, RecordError> {
        debug_assert!(operation.writes(), "{operation} does not accept a payload");

        let map = match body {
            None => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        };

        for field in spec.path_fields() {
            if map.contains_key(field) {
                return Err(RecordError::PathFieldInBody(field));
            }
        }
        if let Some(field) = SYSTEM_FIELDS.iter().find(|f| map.contains_key(**f)) {
            return Err(RecordError::SystemFieldNotAllowed(*field));
        }

        let unknown: Vec<String> = map
            .keys()
            .filter(|key| !spec.is_writable(key))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(RecordError::UnknownFields {
                resource: spec.name,
                fields: unknown,
            });
        }

        Ok(Self(map))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a column value; used by the write path for ids and timestamps
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Stamp both timestamps for a fresh insert
    pub fn stamp_created(&mut self, now: DateTime<Utc>) -> &mut Self {
        let ts = timestamp(now);
        self.set(CREATED_AT, ts.clone());
        self.set(UPDATED_AT, ts)
    }

    /// Refresh `updatedAt` only; `createdAt` is never rewritten
    pub fn stamp_updated(&mut self, now: DateTime<Utc>) -> &mut Self {
        self.set(UPDATED_AT, timestamp(now))
    }

    /// Integer identifier stored under `key`
    pub fn id(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Copy `other`'s columns over this record's
    pub fn merge(&mut self, other: &Record) -> &mut Self {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }
}

/// Timestamps are written with fixed microsecond precision so their string
/// form sorts the same way the instants do.
fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}
