//! In-process record store.
//!
//! Same filter semantics as the hosted store. Used by tests and for local
//! development without a hosted backend.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::store::{Filter, RecordStore, Row, StoreError};

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<String, Vec<Row>>,
    next_id: HashMap<String, i64>,
    unavailable: HashSet<String>,
}

/// Record store holding every table in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends rows to a table without assigning ids.
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.inner.write().await;
        let entries = tables.rows.entry(table.to_string()).or_default();
        for row in rows {
            if let Value::Object(map) = row {
                entries.push(map);
            }
        }
    }

    /// Current contents of a table.
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.inner
            .read()
            .await
            .rows
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes every call on `table` fail with a 503 descriptor.
    pub async fn set_unavailable(&self, table: &str, unavailable: bool) {
        let mut tables = self.inner.write().await;
        if unavailable {
            tables.unavailable.insert(table.to_string());
        } else {
            tables.unavailable.remove(table);
        }
    }
}

fn check_available(tables: &Tables, table: &str) -> Result<(), StoreError> {
    if tables.unavailable.contains(table) {
        return Err(StoreError::Api {
            status: 503,
            message: format!("relation \"{}\" is unavailable", table),
        });
    }
    Ok(())
}

fn project(row: &Row, columns: &str) -> Row {
    if columns.trim() == "*" {
        return row.clone();
    }
    columns
        .split(',')
        .map(str::trim)
        .filter_map(|c| row.get(c).map(|v| (c.to_string(), v.clone())))
        .collect()
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError> {
        let tables = self.inner.read().await;
        check_available(&tables, table)?;
        Ok(tables
            .rows
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| filters.iter().all(|f| f.matches(r)))
                    .map(|r| project(r, columns))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.inner.write().await;
        check_available(&tables, table)?;

        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            if !row.contains_key("id") {
                let next = tables.next_id.entry(table.to_string()).or_insert(0);
                *next += 1;
                row.insert("id".to_string(), Value::from(*next));
            }
            inserted.push(row);
        }
        tables
            .rows
            .entry(table.to_string())
            .or_default()
            .extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn update(
        &self,
        table: &str,
        patch: Row,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.inner.write().await;
        check_available(&tables, table)?;

        let mut updated = Vec::new();
        if let Some(rows) = tables.rows.get_mut(table) {
            for row in rows.iter_mut() {
                if filters.iter().all(|f| f.matches(row)) {
                    for (key, value) in &patch {
                        row.insert(key.clone(), value.clone());
                    }
                    updated.push(row.clone());
                }
            }
        }
        Ok(updated)
    }
}
