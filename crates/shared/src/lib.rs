//! Shared utilities and common types for the Syncora backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Pin and switch-value validation
//! - Audit log timestamp formatting

pub mod timestamp;
pub mod validation;
