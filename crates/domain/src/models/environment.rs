//! Environment sensor readings.

use serde::{Deserialize, Serialize};

/// Latest temperature, humidity and air-quality values from the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentReading {
    pub temp: i64,
    pub humidity: i64,
    pub aqi: i64,
}
