//! Repository implementations over the record store.

pub mod device;
pub mod device_log;
pub mod device_request;
pub mod user;

pub use device::DeviceRepository;
pub use device_log::DeviceLogRepository;
pub use device_request::DeviceRequestRepository;
pub use user::UserRepository;

/// Table names in the hosted store.
pub mod tables {
    pub const USERS: &str = "Users";
    pub const DEVICES: &str = "Devices";
    pub const DEVICE_LOGS: &str = "DeviceLogs";
    pub const REQUESTS: &str = "Request";
}
