//! Application services.

pub mod approval;
pub mod blynk;
pub mod device_control;

pub use approval::{ApprovalService, Resolution};
pub use blynk::BlynkClient;
pub use device_control::{DeviceControlService, LogStamp};
