//! Device switch commands.
//!
//! A command is sent to the broker first. Once the broker accepts it, the
//! audit row and the device status are written best-effort.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use domain::models::{DeviceLog, Pin, SwitchResponse, SwitchState};
use domain::services::DeviceBroker;
use persistence::repositories::{DeviceLogRepository, DeviceRepository};
use persistence::{RecordStore, StoreError};
use shared::timestamp::{log_date, log_time};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::metrics::record_device_command;

/// Client-supplied audit timestamp overrides.
#[derive(Debug, Clone, Default)]
pub struct LogStamp {
    pub time: Option<String>,
    pub date: Option<String>,
}

/// Outcome of the audit step.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AuditOutcome {
    logged: bool,
    log_error: Option<String>,
}

/// Switches devices through the broker and records the result.
pub struct DeviceControlService {
    broker: Arc<dyn DeviceBroker>,
    store: Option<Arc<dyn RecordStore>>,
}

impl DeviceControlService {
    pub fn new(broker: Arc<dyn DeviceBroker>, store: Option<Arc<dyn RecordStore>>) -> Self {
        Self { broker, store }
    }

    /// Switches `pin` to `value` (0 or 1).
    ///
    /// Broker failures fail the command. Store failures only clear
    /// `logged`; `logged` is omitted when no store is configured.
    pub async fn switch_device(
        &self,
        pin: Pin,
        value: u8,
        stamp: LogStamp,
    ) -> Result<SwitchResponse, ApiError> {
        self.switch_device_at(pin, value, stamp, Local::now().naive_local())
            .await
    }

    async fn switch_device_at(
        &self,
        pin: Pin,
        value: u8,
        stamp: LogStamp,
        now: NaiveDateTime,
    ) -> Result<SwitchResponse, ApiError> {
        self.broker.update(&pin, value).await?;

        let status = SwitchState::from_value(value);
        let mut response = SwitchResponse {
            pin,
            value,
            status,
            updated: true,
            logged: None,
            log_error: None,
        };

        if let Some(store) = &self.store {
            let log = DeviceLog::new(
                response.pin.clone(),
                status,
                stamp.time.unwrap_or_else(|| log_time(&now)),
                stamp.date.unwrap_or_else(|| log_date(&now)),
            );
            let outcome = record(store.clone(), &log).await;
            response.logged = Some(outcome.logged);
            response.log_error = outcome.log_error;
        }

        record_device_command(status.as_str(), response.logged);
        info!(pin = %response.pin, status = status.as_str(), logged = ?response.logged, "Device switched");
        Ok(response)
    }
}

/// Appends the audit row, then mirrors the status into `Devices`.
///
/// An error descriptor from the store clears `logged` and moves on to the
/// next step. A transport failure stops immediately and is reported in
/// `log_error`.
async fn record(store: Arc<dyn RecordStore>, log: &DeviceLog) -> AuditOutcome {
    let logs = DeviceLogRepository::new(store.clone());
    let devices = DeviceRepository::new(store);
    let mut outcome = AuditOutcome {
        logged: true,
        log_error: None,
    };

    match logs.append(log).await {
        Ok(()) => {}
        Err(err) if err.is_api() => {
            warn!(pin = %log.device_id, error = %err, "Failed to append device log");
            outcome.logged = false;
        }
        Err(err) => return failed(&log.device_id, err),
    }

    match devices.set_status(&log.device_id, log.state).await {
        Ok(_) => {}
        Err(err) if err.is_api() => {
            warn!(pin = %log.device_id, error = %err, "Failed to update device status");
            outcome.logged = false;
        }
        Err(err) => return failed(&log.device_id, err),
    }

    outcome
}

fn failed(pin: &Pin, err: StoreError) -> AuditOutcome {
    warn!(pin = %pin, error = %err, "Device audit aborted");
    AuditOutcome {
        logged: false,
        log_error: Some(err.to_string()),
    }
}
