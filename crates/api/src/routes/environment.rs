//! Environment sensor endpoint.

use axum::{extract::State, Json};
use domain::models::EnvironmentReading;

use crate::app::AppState;
use crate::error::ApiError;

/// Latest temperature, humidity and AQI, read from the broker one pin at
/// a time.
///
/// GET /api/environment
pub async fn get_environment(
    State(state): State<AppState>,
) -> Result<Json<EnvironmentReading>, ApiError> {
    let pins = &state.config.blynk;
    let temp = state.broker.get(&pins.temperature_pin).await?;
    let humidity = state.broker.get(&pins.humidity_pin).await?;
    let aqi = state.broker.get(&pins.aqi_pin).await?;

    Ok(Json(EnvironmentReading {
        temp,
        humidity,
        aqi,
    }))
}
