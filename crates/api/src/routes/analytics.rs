//! Power-usage simulation endpoint.

use axum::Json;
use domain::services::{target_power, PowerSmoother, MAX_POINTS, Y_MAX};
use serde::{Deserialize, Serialize};

use super::body_or_default;

#[derive(Debug, Default, Deserialize)]
pub struct PowerQuery {
    /// Dashboard keys of the devices that are on.
    #[serde(default)]
    pub devices: Vec<String>,
    /// Reading to start from; defaults to 0.
    #[serde(default)]
    pub current: Option<f64>,
    /// Ticks to simulate; defaults to 1, capped at the chart width.
    #[serde(default)]
    pub ticks: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PowerResponse {
    pub target: f64,
    pub current: f64,
    pub samples: Vec<f64>,
}

/// Advance the smoothed power estimate toward the draw of `devices`.
///
/// POST /api/analytics/power
pub async fn simulate_power(body: Option<Json<PowerQuery>>) -> Json<PowerResponse> {
    let query: PowerQuery = body_or_default(body);
    let start = query.current.unwrap_or(0.0).clamp(0.0, Y_MAX);
    let ticks = query.ticks.unwrap_or(1).min(MAX_POINTS);

    let mut smoother = PowerSmoother::new(start, 0.0);
    smoother.set_target(target_power(query.devices.as_slice()));
    for _ in 0..ticks {
        smoother.tick();
    }

    Json(PowerResponse {
        target: smoother.target(),
        current: smoother.current(),
        samples: smoother.samples(),
    })
}
