//! Record store abstraction.
//!
//! The hosted backend exposes plain tables with select, insert and
//! update-by-filter. Rows travel as JSON objects; repositories turn them
//! into typed domain records.

use serde_json::{Map, Value};
use thiserror::Error;

/// A table row.
pub type Row = Map<String, Value>;

/// Errors returned by a record store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store answered with an error descriptor.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a usable answer.
    #[error("Record store request failed: {0}")]
    Transport(String),

    /// A row did not have the expected shape.
    #[error("Malformed record: {0}")]
    Decode(String),
}

impl StoreError {
    /// True when the store itself rejected the call.
    pub fn is_api(&self) -> bool {
        matches!(self, StoreError::Api { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether `row` satisfies this filter.
    ///
    /// Values compare by their filter text, so `3` matches `"3"` the same
    /// way the hosted API coerces query parameters. `null` only matches a
    /// null or missing column.
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.get(&self.column).unwrap_or(&Value::Null);
        match (filter_text(cell), filter_text(&self.value)) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        }
    }
}

/// Text form of a filter value; `None` for null.
pub fn filter_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Table CRUD operations.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Selects `columns` (comma separated, `*` for all) from rows matching
    /// every filter.
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError>;

    /// Inserts rows and returns them as stored.
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;

    /// Applies `patch` to every row matching all filters and returns the
    /// updated rows.
    async fn update(
        &self,
        table: &str,
        patch: Row,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError>;
}

/// Converts a serializable record into a row.
pub fn to_row<T: serde::Serialize>(record: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Converts rows into typed records.
pub fn from_rows<T: serde::de::DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)).map_err(StoreError::from))
        .collect()
}
