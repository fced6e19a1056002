//! Device broker contract.
//!
//! The broker is a remote, pin-addressed IoT endpoint. Reads return the
//! pin's current integer value; writes set it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::models::Pin;

/// Errors returned by a device broker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("Broker GET failed: {0}")]
    ReadFailed(u16),

    #[error("Broker UPDATE failed: {0}")]
    UpdateFailed(u16),

    #[error("Broker request failed: {0}")]
    Transport(String),
}

/// Remote pin read/write operations.
#[async_trait::async_trait]
pub trait DeviceBroker: Send + Sync {
    /// Reads a pin. Unparseable payloads read as 0.
    async fn get(&self, pin: &Pin) -> Result<i64, BrokerError>;

    /// Writes the logical value of a pin. Implementations apply
    /// [`transmitted_value`] before sending.
    async fn update(&self, pin: &Pin, value: u8) -> Result<(), BrokerError>;
}

/// Value actually sent upstream for a logical pin value.
///
/// The inverted pin is wired with reversed polarity, so its value is sent
/// as `abs(value - 1)`. Every other pin is sent unchanged. Pins are
/// compared by their text, so `V01` is not the inverted `V1`.
pub fn transmitted_value(pin: &Pin, value: u8, inverted_pin: Option<&Pin>) -> i64 {
    let value = i64::from(value);
    if inverted_pin == Some(pin) {
        (value - 1).abs()
    } else {
        value
    }
}

/// Parses a broker payload the way `parseInt(text, 10)` does.
///
/// Leading whitespace and an optional sign are accepted, then the longest
/// run of ASCII digits. Anything without leading digits reads as 0.
pub fn parse_pin_value(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    let Ok(magnitude) = rest[..digits_len].parse::<i64>() else {
        return 0;
    };
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// A write recorded by [`MockDeviceBroker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerCall {
    pub pin: Pin,
    /// Logical value passed to `update`.
    pub value: u8,
    /// Value that would have been transmitted upstream.
    pub transmitted: i64,
}

/// Mock broker for development and testing.
///
/// Records writes, serves reads from an in-memory pin table and can
/// simulate upstream failures.
#[derive(Debug, Clone, Default)]
pub struct MockDeviceBroker {
    inverted_pin: Option<Pin>,
    readings: Arc<Mutex<HashMap<Pin, i64>>>,
    calls: Arc<Mutex<Vec<BrokerCall>>>,
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
}

impl MockDeviceBroker {
    /// Create a new mock broker with the given inverted-polarity pin.
    pub fn new(inverted_pin: Option<Pin>) -> Self {
        Self {
            inverted_pin,
            ..Self::default()
        }
    }

    /// Create a mock broker that fails every call.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Set the value returned when `pin` is read.
    pub fn set_reading(&self, pin: Pin, value: i64) {
        self.readings.lock().unwrap().insert(pin, value);
    }

    /// Writes received so far, oldest first.
    pub fn calls(&self) -> Vec<BrokerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The last value transmitted for a pin.
    pub fn transmitted(&self, pin: Pin) -> Option<i64> {
        self.calls()
            .iter()
            .rev()
            .find(|c| c.pin == pin)
            .map(|c| c.transmitted)
    }
}

#[async_trait::async_trait]
impl DeviceBroker for MockDeviceBroker {
    async fn get(&self, pin: &Pin) -> Result<i64, BrokerError> {
        if self.simulate_failure {
            tracing::warn!(pin = %pin, "Mock broker simulating read failure");
            return Err(BrokerError::ReadFailed(500));
        }
        Ok(self.readings.lock().unwrap().get(pin).copied().unwrap_or(0))
    }

    async fn update(&self, pin: &Pin, value: u8) -> Result<(), BrokerError> {
        if self.simulate_failure {
            tracing::warn!(pin = %pin, value, "Mock broker simulating update failure");
            return Err(BrokerError::UpdateFailed(500));
        }

        let transmitted = transmitted_value(pin, value, self.inverted_pin.as_ref());
        tracing::info!(pin = %pin, value, transmitted, "Mock: Would update broker pin");
        self.calls.lock().unwrap().push(BrokerCall {
            pin: pin.clone(),
            value,
            transmitted,
        });
        Ok(())
    }
}
