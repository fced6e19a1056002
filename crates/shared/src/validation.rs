//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use validator::ValidationError;

lazy_static! {
    static ref PIN_REGEX: Regex = Regex::new(r"^V[0-9]+$").unwrap();
}

/// Returns true if `pin` names a virtual pin (`V` followed by digits).
pub fn is_valid_pin(pin: &str) -> bool {
    PIN_REGEX.is_match(pin)
}

/// Validates a virtual pin identifier such as `V3`.
pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if is_valid_pin(pin) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_pin");
        err.message = Some("invalid pin".into());
        Err(err)
    }
}

/// Extracts a switch value from a JSON body field.
///
/// Only JSON numbers numerically equal to 0 or 1 are accepted; `"1"`,
/// `true` and `2` are all rejected.
pub fn validate_switch_value(value: &Value) -> Option<u8> {
    let number = value.as_f64()?;
    if number == 0.0 {
        Some(0)
    } else if number == 1.0 {
        Some(1)
    } else {
        None
    }
}
