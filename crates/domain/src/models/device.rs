//! Device domain model.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::DomainError;

/// A virtual pin on the device broker, written `V<n>`.
///
/// The pin keeps the text it was parsed from, so `V03` reaches the broker
/// and the audit log as `V03`. The digits double as the `DeviceId` of the
/// matching row in the `Devices` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pin(String);

impl Pin {
    pub fn new(number: u64) -> Self {
        Self(format!("V{}", number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `DeviceId` this pin controls, read from the digits like
    /// `parseInt`: an integer when it fits in `u64`, otherwise the nearest
    /// float, or `null` when even that overflows.
    pub fn device_id(&self) -> Value {
        let digits = &self.0[1..];
        if let Ok(n) = digits.parse::<u64>() {
            return Value::from(n);
        }
        digits
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Pin {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        shared::validation::validate_pin(s)
            .map_err(|_| DomainError::validation("invalid pin"))?;
        Ok(Pin(s.to_string()))
    }
}

impl Serialize for Pin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Pin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
            Raw::Number(n) => Ok(Pin::new(n)),
        }
    }
}

/// Desired or current on/off state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    /// Maps a broker value to a state (`1` is on, anything else off).
    pub fn from_value(value: u8) -> Self {
        if value == 1 {
            SwitchState::On
        } else {
            SwitchState::Off
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            SwitchState::On => 1,
            SwitchState::Off => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchState::On => "ON",
            SwitchState::Off => "OFF",
        }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ON") {
            Ok(SwitchState::On)
        } else if s.eq_ignore_ascii_case("OFF") {
            Ok(SwitchState::Off)
        } else {
            Err(DomainError::validation("state must be ON or OFF"))
        }
    }
}

impl Serialize for SwitchState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SwitchState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Normalizes a stored `Current_Status` to a broker value.
///
/// Returns 1 iff the status is the string `ON` (any case) or the number 1.
pub fn normalize_status(status: &Value) -> u8 {
    match status {
        Value::String(s) if s.eq_ignore_ascii_case("ON") => 1,
        Value::Number(n) if n.as_f64() == Some(1.0) => 1,
        _ => 0,
    }
}

/// Row of the `Devices` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "DeviceId")]
    pub device_id: u64,
    #[serde(rename = "Current_Status", default)]
    pub current_status: Value,
}

impl Device {
    pub fn pin(&self) -> Pin {
        Pin::new(self.device_id)
    }

    pub fn status_value(&self) -> u8 {
        normalize_status(&self.current_status)
    }
}

/// Mapping of `V<DeviceId>` to the device's current 0/1 value.
pub type DeviceStates = BTreeMap<String, u8>;

/// Collects device rows into the state map served to the dashboard.
pub fn collect_states(devices: &[Device]) -> DeviceStates {
    devices
        .iter()
        .map(|d| (d.pin().to_string(), d.status_value()))
        .collect()
}

/// Request body for switching a device.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwitchCommand {
    #[serde(default)]
    pub value: Option<Value>,
    /// Client-side time of the toggle, stored verbatim in the audit row.
    #[serde(rename = "timeString", default)]
    pub time_string: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl SwitchCommand {
    /// Returns the requested switch value, which must be the number 0 or 1.
    pub fn switch_value(&self) -> Result<u8, DomainError> {
        self.value
            .as_ref()
            .and_then(shared::validation::validate_switch_value)
            .ok_or_else(|| DomainError::validation("value must be 0 or 1"))
    }
}

/// Response body for a device switch.
#[derive(Debug, Clone, Serialize)]
pub struct SwitchResponse {
    pub pin: Pin,
    pub value: u8,
    pub status: SwitchState,
    pub updated: bool,
    /// Whether the audit row and device status were written; absent when
    /// no record store is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logged: Option<bool>,
    #[serde(rename = "logError", skip_serializing_if = "Option::is_none")]
    pub log_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pin_parse_and_display() {
        let pin: Pin = "V3".parse().unwrap();
        assert_eq!(pin.device_id(), json!(3));
        assert_eq!(pin.to_string(), "V3");
        assert_eq!(pin, Pin::new(3));
    }

    #[test]
    fn test_pin_keeps_leading_zeros() {
        let pin: Pin = "V03".parse().unwrap();
        assert_eq!(pin.to_string(), "V03");
        assert_eq!(serde_json::to_value(&pin).unwrap(), json!("V03"));
        assert_eq!(pin.device_id(), json!(3));
        assert_ne!(pin, Pin::new(3));
    }

    #[test]
    fn test_pin_accepts_long_numbers() {
        let pin: Pin = "V99999999999".parse().unwrap();
        assert_eq!(pin.as_str(), "V99999999999");
        assert_eq!(pin.device_id(), json!(99999999999u64));

        let huge: Pin = "V123456789012345678901234567890".parse().unwrap();
        assert_eq!(huge.to_string(), "V123456789012345678901234567890");
        assert!(huge.device_id().is_f64());
    }

    #[test]
    fn test_pin_rejects_bad_syntax() {
        assert!("3".parse::<Pin>().is_err());
        assert!("v3".parse::<Pin>().is_err());
        assert!("V".parse::<Pin>().is_err());
        assert!("V3a".parse::<Pin>().is_err());
        assert!("V-3".parse::<Pin>().is_err());
    }

    #[test]
    fn test_pin_deserializes_from_text_or_number() {
        let a: Pin = serde_json::from_value(json!("V7")).unwrap();
        let b: Pin = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_value::<Pin>(json!("seven")).is_err());
    }

    #[test]
    fn test_pin_serializes_as_text() {
        assert_eq!(serde_json::to_value(Pin::new(12)).unwrap(), json!("V12"));
    }

    #[test]
    fn test_switch_state_case_insensitive() {
        assert_eq!("on".parse::<SwitchState>().unwrap(), SwitchState::On);
        assert_eq!("Off".parse::<SwitchState>().unwrap(), SwitchState::Off);
        assert!("maybe".parse::<SwitchState>().is_err());
        assert_eq!(serde_json::to_value(SwitchState::On).unwrap(), json!("ON"));
    }

    #[test]
    fn test_switch_state_values() {
        assert_eq!(SwitchState::from_value(1), SwitchState::On);
        assert_eq!(SwitchState::from_value(0), SwitchState::Off);
        assert_eq!(SwitchState::On.value(), 1);
        assert_eq!(SwitchState::Off.value(), 0);
    }

    #[test]
    fn test_normalize_status() {
        assert_eq!(normalize_status(&json!("ON")), 1);
        assert_eq!(normalize_status(&json!("on")), 1);
        assert_eq!(normalize_status(&json!(1)), 1);
        assert_eq!(normalize_status(&json!(1.0)), 1);
        assert_eq!(normalize_status(&json!("OFF")), 0);
        assert_eq!(normalize_status(&json!("enabled")), 0);
        assert_eq!(normalize_status(&json!(0)), 0);
        assert_eq!(normalize_status(&json!(2)), 0);
        assert_eq!(normalize_status(&json!(true)), 0);
        assert_eq!(normalize_status(&Value::Null), 0);
        assert_eq!(normalize_status(&json!(["ON"])), 0);
    }

    #[test]
    fn test_collect_states() {
        let devices: Vec<Device> = serde_json::from_value(json!([
            {"DeviceId": 1, "Current_Status": "ON"},
            {"DeviceId": 2, "Current_Status": 0},
            {"DeviceId": 3},
        ]))
        .unwrap();
        let states = collect_states(&devices);
        assert_eq!(states["V1"], 1);
        assert_eq!(states["V2"], 0);
        assert_eq!(states["V3"], 0);
    }

    #[test]
    fn test_switch_command_value() {
        let cmd: SwitchCommand = serde_json::from_value(json!({"value": 1})).unwrap();
        assert_eq!(cmd.switch_value().unwrap(), 1);

        let cmd: SwitchCommand = serde_json::from_value(json!({"value": "1"})).unwrap();
        assert_eq!(
            cmd.switch_value().unwrap_err().to_string(),
            "value must be 0 or 1"
        );

        let cmd = SwitchCommand::default();
        assert!(cmd.switch_value().is_err());
    }

    #[test]
    fn test_switch_response_omits_logged_without_store() {
        let response = SwitchResponse {
            pin: Pin::new(3),
            value: 1,
            status: SwitchState::On,
            updated: true,
            logged: None,
            log_error: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            json!({"pin": "V3", "value": 1, "status": "ON", "updated": true})
        );
    }
}
