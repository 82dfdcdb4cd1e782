use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::database::record::Record;
use crate::database::store::{Criteria, Store, StoreError};

/// PostgreSQL store.
///
/// Rows come back through `row_to_json` so no per-table column mapping is
/// needed. Write payloads are bound once as JSONB and cast to the table's row
/// type with `jsonb_populate_record`, letting Postgres coerce dates,
/// timestamps and numbers per column.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_rows(
        &self,
        sql: &str,
        payload: Option<Value>,
        criteria: &Criteria,
    ) -> Result<Vec<Record>, StoreError> {
        tracing::debug!("{}", sql);
        let mut query = sqlx::query(sql);
        if let Some(payload) = payload {
            query = query.bind(payload);
        }
        for (_, value) in &criteria.conditions {
            query = query.bind(*value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_record).collect()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn select(&self, criteria: &Criteria) -> Result<Vec<Record>, StoreError> {
        let sql = select_sql(criteria);
        self.fetch_rows(&sql, None, criteria).await
    }

    async fn insert(
        &self,
        table: &'static str,
        primary_key: &'static str,
        values: Record,
    ) -> Result<Record, StoreError> {
        let columns: Vec<&str> = values.columns().map(String::as_str).collect();
        let sql = insert_sql(table, &columns);
        tracing::debug!("{}", sql);

        let row = sqlx::query(&sql)
            .bind(values.into_value())
            .fetch_one(&self.pool)
            .await?;
        let record = row_to_record(row)?;
        tracing::debug!("Inserted into {} with {}={:?}", table, primary_key, record.id(primary_key));
        Ok(record)
    }

    async fn update(&self, criteria: &Criteria, values: Record) -> Result<Vec<Record>, StoreError> {
        let columns: Vec<&str> = values.columns().map(String::as_str).collect();
        let sql = update_sql(criteria, &columns);
        self.fetch_rows(&sql, Some(values.into_value()), criteria).await
    }

    async fn delete(&self, criteria: &Criteria) -> Result<Vec<Record>, StoreError> {
        let sql = delete_sql(criteria);
        self.fetch_rows(&sql, None, criteria).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn row_to_record(row: PgRow) -> Result<Record, StoreError> {
    match row.try_get::<Value, _>("row")? {
        Value::Object(map) => Ok(Record::from_row(map)),
        other => Err(StoreError::QueryError(format!("unexpected row format: {}", other))),
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `WHERE t."a" = $n AND ...`, numbering placeholders from `first`
fn where_clause(criteria: &Criteria, alias: &str, first: usize) -> String {
    if criteria.conditions.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = criteria
        .conditions
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{}.{} = ${}", alias, quote_identifier(column), first + i))
        .collect();
    format!(" WHERE {}", parts.join(" AND "))
}

fn select_sql(criteria: &Criteria) -> String {
    format!(
        "SELECT row_to_json(t) AS row FROM {} t{} ORDER BY t.{} ASC",
        quote_identifier(criteria.table),
        where_clause(criteria, "t", 1),
        quote_identifier(criteria.primary_key),
    )
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let table = quote_identifier(table);
    let column_list = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "WITH written AS (INSERT INTO {table} ({column_list}) \
         SELECT {column_list} FROM jsonb_populate_record(NULL::{table}, $1) \
         RETURNING *) \
         SELECT row_to_json(written) AS row FROM written"
    )
}

fn update_sql(criteria: &Criteria, columns: &[&str]) -> String {
    let table = quote_identifier(criteria.table);
    let assignments = columns
        .iter()
        .map(|c| {
            let column = quote_identifier(c);
            format!("{column} = r.{column}")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "WITH written AS (UPDATE {table} AS t SET {assignments} \
         FROM jsonb_populate_record(NULL::{table}, $1) AS r{} \
         RETURNING t.*) \
         SELECT row_to_json(written) AS row FROM written ORDER BY written.{} ASC",
        where_clause(criteria, "t", 2),
        quote_identifier(criteria.primary_key),
    )
}

fn delete_sql(criteria: &Criteria) -> String {
    format!(
        "WITH removed AS (DELETE FROM {} AS t{} RETURNING t.*) \
         SELECT row_to_json(removed) AS row FROM removed ORDER BY removed.{} ASC",
        quote_identifier(criteria.table),
        where_clause(criteria, "t", 1),
        quote_identifier(criteria.primary_key),
    )
}
