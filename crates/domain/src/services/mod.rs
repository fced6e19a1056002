//! Domain services for Syncora.
//!
//! Services contain business logic that operates on domain models.

pub mod approval;
pub mod broker;
pub mod power;

pub use approval::{broker_value, resolution_message, BrokerFailurePolicy, RequestStatus};
pub use broker::{
    parse_pin_value, transmitted_value, BrokerCall, BrokerError, DeviceBroker, MockDeviceBroker,
};
pub use power::{target_power, PowerSmoother, MAX_POINTS, Y_MAX};
