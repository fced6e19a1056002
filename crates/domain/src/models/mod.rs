//! Domain models for Syncora.

pub mod device;
pub mod device_log;
pub mod device_request;
pub mod environment;
pub mod user;

pub use device::{
    collect_states, normalize_status, Device, DeviceStates, Pin, SwitchCommand, SwitchResponse,
    SwitchState,
};
pub use device_log::DeviceLog;
pub use device_request::{
    Approval, DeviceRequest, NewDeviceRequest, ResolveDeviceRequest, ResolveRequestBody,
    StudentRequestBody,
};
pub use environment::EnvironmentReading;
pub use user::{LoginRequest, User, UserProfile};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes a loosely typed text field.
///
/// Strings pass through, numbers are rendered in decimal, everything else
/// (including empty strings and `null`) is treated as absent.
pub(crate) fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
