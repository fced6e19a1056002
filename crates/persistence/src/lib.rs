//! Persistence layer for the Syncora backend.
//!
//! This crate contains:
//! - The `RecordStore` abstraction over the hosted table API
//! - PostgREST and in-memory store implementations
//! - Typed repositories per table

pub mod memory;
pub mod metrics;
pub mod postgrest;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use postgrest::{PostgrestConfig, PostgrestStore};
pub use store::{Filter, RecordStore, Row, StoreError};
