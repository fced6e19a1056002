//! Device audit log repository.

use std::sync::Arc;

use domain::models::DeviceLog;

use super::tables::DEVICE_LOGS;
use crate::store::{to_row, RecordStore, StoreError};

/// Repository for the append-only `DeviceLogs` table.
#[derive(Clone)]
pub struct DeviceLogRepository {
    store: Arc<dyn RecordStore>,
}

impl DeviceLogRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Appends one audit row.
    pub async fn append(&self, log: &DeviceLog) -> Result<(), StoreError> {
        self.store.insert(DEVICE_LOGS, vec![to_row(log)?]).await?;
        Ok(())
    }
}
