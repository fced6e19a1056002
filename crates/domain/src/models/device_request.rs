//! Student device request model.
//!
//! Students ask for a device to be switched; an operator later approves or
//! denies the request. See [`crate::services::approval`] for the lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::device::{Pin, SwitchState};
use super::loose_string;
use crate::error::DomainError;
use crate::services::approval::RequestStatus;

/// Operator decision on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Approval {
    Yes,
    No,
}

impl Approval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Approval::Yes => "YES",
            Approval::No => "NO",
        }
    }
}

impl fmt::Display for Approval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Approval {
    type Err = DomainError;

    /// Case-insensitive: a lowercase `yes` counts as YES and reaches the broker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("YES") {
            Ok(Approval::Yes)
        } else if s.eq_ignore_ascii_case("NO") {
            Ok(Approval::No)
        } else {
            Err(DomainError::validation("Approval must be YES or NO"))
        }
    }
}

impl Serialize for Approval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Approval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Row of the `Request` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRequest {
    #[serde(rename = "DeviceId")]
    pub device_id: Pin,
    #[serde(rename = "State")]
    pub state: SwitchState,
    #[serde(rename = "Class")]
    pub class: String,
    #[serde(rename = "Approval", default)]
    pub approval: Option<Approval>,
    #[serde(default)]
    pub completed: bool,
    /// Server-generated columns (id, timestamps), passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceRequest {
    /// Lifecycle state, or `None` for a completed row without a decision.
    pub fn status(&self) -> Option<RequestStatus> {
        RequestStatus::of(self.completed, self.approval)
    }
}

/// A request ready to be inserted; always starts pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDeviceRequest {
    #[serde(rename = "DeviceId")]
    pub device_id: Pin,
    #[serde(rename = "State")]
    pub state: SwitchState,
    #[serde(rename = "Class")]
    pub class: String,
    pub completed: bool,
}

/// Body of a student submission (`DeviceId`, `state`, `clas`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentRequestBody {
    #[serde(rename = "DeviceId", default, deserialize_with = "loose_string")]
    pub device_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub clas: Option<String>,
}

impl StudentRequestBody {
    pub fn validate(&self) -> Result<NewDeviceRequest, DomainError> {
        let (Some(device_id), Some(state), Some(class)) = (
            self.device_id.as_deref(),
            self.state.as_deref(),
            self.clas.as_deref(),
        ) else {
            return Err(DomainError::validation(
                "DeviceId, state, and class required",
            ));
        };

        Ok(NewDeviceRequest {
            device_id: parse_device_id(device_id)?,
            state: state.parse()?,
            class: class.to_string(),
            completed: false,
        })
    }
}

/// Body of an operator decision (`DeviceId`, `State`, `Class`, `Approval`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveRequestBody {
    #[serde(rename = "DeviceId", default, deserialize_with = "loose_string")]
    pub device_id: Option<String>,
    #[serde(rename = "State", default, deserialize_with = "loose_string")]
    pub state: Option<String>,
    #[serde(rename = "Class", default, deserialize_with = "loose_string")]
    pub class: Option<String>,
    #[serde(rename = "Approval", default, deserialize_with = "loose_string")]
    pub approval: Option<String>,
}

impl ResolveRequestBody {
    pub fn validate(&self) -> Result<ResolveDeviceRequest, DomainError> {
        let (Some(device_id), Some(state), Some(class), Some(approval)) = (
            self.device_id.as_deref(),
            self.state.as_deref(),
            self.class.as_deref(),
            self.approval.as_deref(),
        ) else {
            return Err(DomainError::validation(
                "DeviceId, State, Class, and Approval required",
            ));
        };

        Ok(ResolveDeviceRequest {
            device_id: parse_device_id(device_id)?,
            state: state.parse()?,
            class: class.to_string(),
            approval: approval.parse()?,
        })
    }
}

/// A validated operator decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveDeviceRequest {
    pub device_id: Pin,
    pub state: SwitchState,
    pub class: String,
    pub approval: Approval,
}

/// Accepts either a pin (`V3`) or a bare device number (`3`). The digits
/// are kept as written.
fn parse_device_id(raw: &str) -> Result<Pin, DomainError> {
    let text = if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("V{}", raw)
    } else {
        raw.to_string()
    };
    text.parse()
        .map_err(|_| DomainError::validation("DeviceId must be a pin such as V3"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_student_request_starts_pending() {
        let body: StudentRequestBody = serde_json::from_value(json!({
            "DeviceId": "V2",
            "state": "on",
            "clas": "10-B"
        }))
        .unwrap();
        let new = body.validate().unwrap();
        assert_eq!(new.device_id, Pin::new(2));
        assert_eq!(new.state, SwitchState::On);
        assert!(!new.completed);

        let row = serde_json::to_value(&new).unwrap();
        assert_eq!(
            row,
            json!({"DeviceId": "V2", "State": "ON", "Class": "10-B", "completed": false})
        );
        assert!(row.get("Approval").is_none());
    }

    #[test]
    fn test_student_request_missing_fields() {
        let body: StudentRequestBody =
            serde_json::from_value(json!({"DeviceId": "V2", "state": "ON"})).unwrap();
        assert_eq!(
            body.validate().unwrap_err().to_string(),
            "DeviceId, state, and class required"
        );
    }

    #[test]
    fn test_numeric_device_id_becomes_pin() {
        let body: StudentRequestBody = serde_json::from_value(json!({
            "DeviceId": 4,
            "state": "OFF",
            "clas": "9-A"
        }))
        .unwrap();
        assert_eq!(body.validate().unwrap().device_id, Pin::new(4));
    }

    #[test]
    fn test_device_id_digits_are_kept() {
        let body: StudentRequestBody = serde_json::from_value(json!({
            "DeviceId": "V07",
            "state": "ON",
            "clas": "9-A"
        }))
        .unwrap();
        assert_eq!(body.validate().unwrap().device_id.as_str(), "V07");

        let body: StudentRequestBody = serde_json::from_value(json!({
            "DeviceId": "3x",
            "state": "ON",
            "clas": "9-A"
        }))
        .unwrap();
        assert_eq!(
            body.validate().unwrap_err().to_string(),
            "DeviceId must be a pin such as V3"
        );
    }

    #[test]
    fn test_lowercase_approval_counts() {
        assert_eq!("yes".parse::<Approval>().unwrap(), Approval::Yes);
        assert_eq!("No".parse::<Approval>().unwrap(), Approval::No);
    }

    #[test]
    fn test_resolve_body_validation() {
        let body: ResolveRequestBody = serde_json::from_value(json!({
            "DeviceId": "V1",
            "State": "ON",
            "Class": "9-A",
            "Approval": "YES"
        }))
        .unwrap();
        let resolved = body.validate().unwrap();
        assert_eq!(resolved.approval, Approval::Yes);

        let body: ResolveRequestBody = serde_json::from_value(json!({
            "DeviceId": "V1",
            "State": "ON",
            "Class": "9-A",
            "Approval": "MAYBE"
        }))
        .unwrap();
        assert_eq!(
            body.validate().unwrap_err().to_string(),
            "Approval must be YES or NO"
        );

        let body = ResolveRequestBody::default();
        assert_eq!(
            body.validate().unwrap_err().to_string(),
            "DeviceId, State, Class, and Approval required"
        );
    }

    #[test]
    fn test_device_request_row_keeps_extra_columns() {
        let row: DeviceRequest = serde_json::from_value(json!({
            "id": 17,
            "created_at": "2024-05-04T10:00:00Z",
            "DeviceId": "V2",
            "State": "OFF",
            "Class": "10-B",
            "Approval": null,
            "completed": false
        }))
        .unwrap();
        assert_eq!(row.status(), Some(RequestStatus::Pending));
        assert_eq!(row.extra["id"], json!(17));

        let back = serde_json::to_value(&row).unwrap();
        assert_eq!(back["id"], json!(17));
        assert_eq!(back["DeviceId"], json!("V2"));
    }

    #[test]
    fn test_resolved_row_status() {
        let row: DeviceRequest = serde_json::from_value(json!({
            "DeviceId": "V2",
            "State": "ON",
            "Class": "10-B",
            "Approval": "NO",
            "completed": true
        }))
        .unwrap();
        assert_eq!(row.status(), Some(RequestStatus::Denied));
    }
}
