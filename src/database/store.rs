use async_trait::async_trait;
use thiserror::Error;

use crate::database::record::Record;
use crate::resource::{ParentScope, ResourceSpec};

/// Failures surfaced by a store round trip
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (pool timeout, closed pool, I/O)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the write (foreign key, not-null, unique, check)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A supplied value does not fit its column (bad boolean, date, range)
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::Io(e) => StoreError::Unavailable(e.to_string()),
            sqlx::Error::Database(db) => classify_sqlstate(db.code().as_deref(), db.message()),
            other => StoreError::Sqlx(other),
        }
    }
}

/// Sort a database error by its SQLSTATE class
fn classify_sqlstate(code: Option<&str>, message: &str) -> StoreError {
    match code.map(|code| code.get(..2).unwrap_or(code)) {
        // Data exception: the caller's value cannot be coerced to the column type
        Some("22") => StoreError::InvalidValue(message.to_string()),
        // Integrity constraint violation
        Some("23") => StoreError::Constraint(message.to_string()),
        _ => StoreError::QueryError(message.to_string()),
    }
}

/// Which rows of which table an operation targets.
///
/// Conditions are equality matches on integer columns, joined with AND.
/// Selects are always ordered ascending by the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    pub table: &'static str,
    pub primary_key: &'static str,
    pub conditions: Vec<(&'static str, i64)>,
}

impl Criteria {
    /// Every row of the resource's table
    pub fn all(spec: &ResourceSpec) -> Self {
        Self {
            table: spec.table,
            primary_key: spec.primary_key,
            conditions: Vec::new(),
        }
    }

    /// The single row with the given identifier
    pub fn by_id(spec: &ResourceSpec, id: i64) -> Self {
        Self::all(spec).matching(spec.primary_key, id)
    }

    pub fn matching(mut self, column: &'static str, value: i64) -> Self {
        self.conditions.push((column, value));
        self
    }

    /// Restrict to rows owned by the parent, when there is one
    pub fn within(self, scope: Option<&ParentScope>) -> Self {
        match scope {
            Some(scope) => self.matching(scope.field, scope.id),
            None => self,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions
            .iter()
            .all(|(column, value)| record.id(column) == Some(*value))
    }
}

/// The relational store behind every resource router.
///
/// Each call is one independent, non-transactional round trip.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Rows matching `criteria`, ascending by primary key
    async fn select(&self, criteria: &Criteria) -> Result<Vec<Record>, StoreError>;

    /// Insert one row and return it as stored, including its assigned identifier
    async fn insert(
        &self,
        table: &'static str,
        primary_key: &'static str,
        values: Record,
    ) -> Result<Record, StoreError>;

    /// Apply `values` to every row matching `criteria`, returning the updated rows
    async fn update(&self, criteria: &Criteria, values: Record) -> Result<Vec<Record>, StoreError>;

    /// Remove every row matching `criteria`, returning the removed rows
    async fn delete(&self, criteria: &Criteria) -> Result<Vec<Record>, StoreError>;

    /// Cheap connectivity check for the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;
}
