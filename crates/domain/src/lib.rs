//! Domain layer for the Syncora backend.
//!
//! This crate contains:
//! - Domain models (User, Device, DeviceLog, DeviceRequest)
//! - The device broker contract and the approval workflow
//! - The power-usage simulation behind the dashboard chart
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::DomainError;
