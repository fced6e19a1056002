//! Device endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{collect_states, DeviceStates, Pin, SwitchCommand, SwitchResponse};
use persistence::repositories::DeviceRepository;

use super::body_or_default;
use crate::app::AppState;
use crate::error::ApiError;
use crate::services::{DeviceControlService, LogStamp};

/// Current on/off state of every device, keyed by pin.
///
/// GET /api/devices/states
pub async fn get_states(State(state): State<AppState>) -> Result<Json<DeviceStates>, ApiError> {
    let devices = DeviceRepository::new(state.store()?)
        .list()
        .await
        .map_err(|e| ApiError::store("Failed to fetch devices", e))?;
    Ok(Json(collect_states(&devices)))
}

/// Switch a device on or off.
///
/// POST /api/devices/:pin
pub async fn switch_device(
    State(state): State<AppState>,
    Path(pin): Path<String>,
    body: Option<Json<SwitchCommand>>,
) -> Result<Json<SwitchResponse>, ApiError> {
    let pin: Pin = pin.parse()?;
    let command: SwitchCommand = body_or_default(body);
    let value = command.switch_value()?;

    let service = DeviceControlService::new(state.broker.clone(), state.store.clone());
    let response = service
        .switch_device(
            pin,
            value,
            LogStamp {
                time: command.time_string,
                date: command.date,
            },
        )
        .await?;
    Ok(Json(response))
}
