//! HTTP route handlers.

pub mod analytics;
pub mod auth;
pub mod devices;
pub mod environment;
pub mod health;
pub mod requests;

use axum::Json;

/// Unwraps an optional JSON body. A missing or unreadable body is treated
/// as an empty object so that field validation reports what is missing.
pub(crate) fn body_or_default<T: Default>(body: Option<Json<T>>) -> T {
    body.map(|Json(inner)| inner).unwrap_or_default()
}
