//! Student device request repository.

use std::sync::Arc;

use domain::models::{Approval, DeviceRequest, NewDeviceRequest, Pin, SwitchState};
use domain::services::RequestStatus;
use serde_json::json;

use super::tables::REQUESTS;
use crate::store::{from_rows, to_row, Filter, RecordStore, Row, StoreError};

/// Repository for the `Request` table.
#[derive(Clone)]
pub struct DeviceRequestRepository {
    store: Arc<dyn RecordStore>,
}

impl DeviceRequestRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Inserts a pending request and returns the stored row.
    pub async fn create(
        &self,
        request: &NewDeviceRequest,
    ) -> Result<Vec<DeviceRequest>, StoreError> {
        let rows = self.store.insert(REQUESTS, vec![to_row(request)?]).await?;
        from_rows(rows)
    }

    /// All requests in the given status.
    pub async fn list(&self, status: RequestStatus) -> Result<Vec<DeviceRequest>, StoreError> {
        let filters: Vec<Filter> = status
            .filters()
            .into_iter()
            .map(|(column, value)| Filter::eq(column, value))
            .collect();
        let rows = self.store.select(REQUESTS, "*", &filters).await?;
        from_rows(rows)
    }

    /// Resolves every pending request for `(pin, state, class)`.
    ///
    /// Requests carry no unique id, so all pending duplicates of the tuple
    /// are resolved together. Already-resolved rows are left untouched.
    pub async fn resolve(
        &self,
        pin: &Pin,
        state: SwitchState,
        class: &str,
        approval: Approval,
    ) -> Result<Vec<DeviceRequest>, StoreError> {
        let mut patch = Row::new();
        patch.insert("Approval".to_string(), json!(approval.as_str()));
        patch.insert("completed".to_string(), json!(true));

        let filters = [
            Filter::eq("DeviceId", pin.as_str()),
            Filter::eq("State", state.as_str()),
            Filter::eq("Class", class),
            Filter::eq("completed", false),
        ];
        let rows = self.store.update(REQUESTS, patch, &filters).await?;
        from_rows(rows)
    }
}
