use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::database::record::Record;
use crate::database::store::{Criteria, Store, StoreError};
use crate::resource::{NULLABLE_REFERENCES, RESOURCES};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnDelete {
    Cascade,
    SetNull,
}

/// `table.column` must name an existing row of `parent`
#[derive(Debug, Clone, Copy)]
struct ForeignKey {
    table: &'static str,
    column: &'static str,
    parent: &'static str,
    on_delete: OnDelete,
}

/// The foreign keys the migrations declare, derived from the catalog
fn foreign_keys() -> Vec<ForeignKey> {
    let owned = RESOURCES.iter().filter_map(|spec| {
        let column = spec.parent?;
        let parent = RESOURCES.iter().find(|p| p.primary_key == column)?;
        Some(ForeignKey {
            table: spec.table,
            column,
            parent: parent.table,
            on_delete: OnDelete::Cascade,
        })
    });
    let nullable = NULLABLE_REFERENCES
        .iter()
        .map(|&(spec, column, target)| ForeignKey {
            table: spec.table,
            column,
            parent: target.table,
            on_delete: OnDelete::SetNull,
        });
    owned.chain(nullable).collect()
}

/// In-process store keyed by table name.
///
/// Used by `serve --memory` and by the test suite. Identifiers are assigned
/// from a per-table sequence starting at 1 and are never reused. Foreign
/// keys behave as in Postgres: writes naming a missing parent fail with
/// `StoreError::Constraint`, and deletes cascade or clear references.
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, Table>>,
    foreign_keys: Vec<ForeignKey>,
    unavailable: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::default(),
            foreign_keys: foreign_keys(),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }

    /// Every non-null reference in `values` must point at an existing row
    fn check_references(
        &self,
        tables: &HashMap<&'static str, Table>,
        table: &str,
        values: &Record,
    ) -> Result<(), StoreError> {
        for fk in self.foreign_keys.iter().filter(|fk| fk.table == table) {
            let Some(value) = values.get(fk.column) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let exists = value
                .as_i64()
                .zip(tables.get(fk.parent))
                .is_some_and(|(id, parent)| parent.rows.contains_key(&id));
            if !exists {
                return Err(StoreError::Constraint(format!(
                    "{}.{} = {} has no matching row in {}",
                    fk.table, fk.column, value, fk.parent
                )));
            }
        }
        Ok(())
    }

    /// Apply ON DELETE actions for rows just removed from `table`
    fn cascade(&self, tables: &mut HashMap<&'static str, Table>, table: &'static str, ids: Vec<i64>) {
        let mut pending = vec![(table, ids)];
        while let Some((parent, ids)) = pending.pop() {
            for fk in self.foreign_keys.iter().filter(|fk| fk.parent == parent) {
                let Some(child) = tables.get_mut(fk.table) else {
                    continue;
                };
                let hits: Vec<i64> = child
                    .rows
                    .iter()
                    .filter(|(_, row)| row.id(fk.column).is_some_and(|id| ids.contains(&id)))
                    .map(|(id, _)| *id)
                    .collect();
                if hits.is_empty() {
                    continue;
                }

                match fk.on_delete {
                    OnDelete::Cascade => {
                        for id in &hits {
                            child.rows.remove(id);
                        }
                        tracing::trace!("memory cascade {} rows from {}", hits.len(), fk.table);
                        pending.push((fk.table, hits));
                    }
                    OnDelete::SetNull => {
                        for id in &hits {
                            if let Some(row) = child.rows.get_mut(id) {
                                row.set(fk.column, Value::Null);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, criteria: &Criteria) -> Result<Vec<Record>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let Some(table) = tables.get(criteria.table) else {
            return Ok(Vec::new());
        };
        Ok(table
            .rows
            .values()
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        table: &'static str,
        primary_key: &'static str,
        mut values: Record,
    ) -> Result<Record, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        self.check_references(&tables, table, &values)?;
        let table = tables.entry(table).or_default();

        table.next_id += 1;
        let id = table.next_id;
        values.set(primary_key, Value::from(id));
        table.rows.insert(id, values.clone());

        tracing::trace!("memory insert {}={}", primary_key, id);
        Ok(values)
    }

    async fn update(&self, criteria: &Criteria, values: Record) -> Result<Vec<Record>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        self.check_references(&tables, criteria.table, &values)?;
        let Some(table) = tables.get_mut(criteria.table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for record in table.rows.values_mut() {
            if criteria.matches(record) {
                record.merge(&values);
                updated.push(record.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, criteria: &Criteria) -> Result<Vec<Record>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(criteria.table) else {
            return Ok(Vec::new());
        };

        let ids: Vec<i64> = table
            .rows
            .iter()
            .filter(|(_, record)| criteria.matches(record))
            .map(|(id, _)| *id)
            .collect();
        let removed: Vec<Record> = ids.iter().filter_map(|id| table.rows.remove(id)).collect();

        if !ids.is_empty() {
            self.cascade(&mut tables, criteria.table, ids);
        }
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
