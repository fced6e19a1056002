//! Login endpoint handlers.
//!
//! Credentials are checked against the `Users` table. No session or token
//! is issued; the caller receives the user's profile.

use axum::{extract::State, Json};
use domain::models::{LoginRequest, UserProfile};
use persistence::repositories::UserRepository;
use serde::Serialize;
use tracing::info;

use super::body_or_default;
use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub user: UserProfile,
}

/// Resident login; only users holding the configured resident role match.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let role = state.config.auth.resident_role.as_str();
    authenticate(&state, body_or_default(body), Some(role)).await
}

/// Enterprise login; matches on username alone and returns the stored role.
///
/// POST /api/auth/login_Interprise
pub async fn login_enterprise(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, ApiError> {
    authenticate(&state, body_or_default(body), None).await
}

async fn authenticate(
    state: &AppState,
    request: LoginRequest,
    role: Option<&str>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (username, password) = request.credentials()?;
    let users = UserRepository::new(state.store()?);

    let user = users
        .find_by_username(username, role)
        .await
        .map_err(|e| ApiError::store("Failed to fetch user", e))?
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

    if !user.password_matches(password) {
        info!(username = %user.username, "Login rejected");
        return Err(ApiError::Unauthorized("Password does not match".to_string()));
    }

    info!(username = %user.username, role = ?user.role, "Login succeeded");
    Ok(Json(LoginResponse {
        ok: true,
        user: user.profile(),
    }))
}
