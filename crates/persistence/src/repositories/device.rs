//! Device repository.

use std::sync::Arc;

use domain::models::{Device, Pin, SwitchState};
use serde_json::json;

use super::tables::DEVICES;
use crate::store::{from_rows, Filter, RecordStore, Row, StoreError};

/// Repository for the `Devices` table.
#[derive(Clone)]
pub struct DeviceRepository {
    store: Arc<dyn RecordStore>,
}

impl DeviceRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All device rows.
    pub async fn list(&self) -> Result<Vec<Device>, StoreError> {
        let rows = self
            .store
            .select(DEVICES, "DeviceId,Current_Status", &[])
            .await?;
        from_rows(rows)
    }

    /// Records the current status of the device behind `pin`.
    ///
    /// Returns the number of rows updated.
    pub async fn set_status(&self, pin: &Pin, state: SwitchState) -> Result<usize, StoreError> {
        let device_id = pin.device_id();
        let mut patch = Row::new();
        patch.insert("DeviceId".to_string(), device_id.clone());
        patch.insert("Current_Status".to_string(), json!(state.as_str()));

        let updated = self
            .store
            .update(DEVICES, patch, &[Filter::eq("DeviceId", device_id)])
            .await?;
        Ok(updated.len())
    }
}
