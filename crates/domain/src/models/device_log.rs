//! Device audit log model.

use serde::{Deserialize, Serialize};

use super::device::{Pin, SwitchState};

/// Row of the append-only `DeviceLogs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLog {
    pub device_id: Pin,
    pub state: SwitchState,
    /// Time of day, `HH:MM:SS`.
    pub time: String,
    /// Calendar date, `D-M-YYYY`.
    pub date: String,
}

impl DeviceLog {
    pub fn new(device_id: Pin, state: SwitchState, time: String, date: String) -> Self {
        Self {
            device_id,
            state,
            time,
            date,
        }
    }
}
