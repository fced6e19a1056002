//! Student device request handlers.
//!
//! Students submit requests to switch a device; an operator approves or
//! denies them. Approved requests are applied to the device broker.

use axum::{extract::State, Json};
use domain::models::{DeviceRequest, Pin, ResolveRequestBody, StudentRequestBody, SwitchState};
use domain::services::RequestStatus;
use persistence::repositories::DeviceRequestRepository;
use serde::Serialize;
use tracing::info;

use super::body_or_default;
use crate::app::AppState;
use crate::error::ApiError;
use crate::services::ApprovalService;

/// Echo of an accepted submission.
#[derive(Debug, Serialize)]
pub struct SubmittedRequest {
    #[serde(rename = "DeviceId")]
    pub device_id: Pin,
    pub state: SwitchState,
    pub class: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub user: SubmittedRequest,
}

#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    pub ok: bool,
    pub user: Vec<DeviceRequest>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub ok: bool,
    pub message: String,
    #[serde(rename = "Data")]
    pub data: Vec<DeviceRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagated: Option<bool>,
    #[serde(rename = "brokerError", skip_serializing_if = "Option::is_none")]
    pub broker_error: Option<String>,
}

/// Submit a new request; it starts pending.
///
/// POST /api/device/student_request
pub async fn submit_request(
    State(state): State<AppState>,
    body: Option<Json<StudentRequestBody>>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let request = body_or_default::<StudentRequestBody>(body).validate()?;
    let requests = DeviceRequestRepository::new(state.store()?);

    requests
        .create(&request)
        .await
        .map_err(|e| ApiError::store("Failed to insert request", e))?;

    info!(pin = %request.device_id, class = %request.class, "Student request submitted");
    Ok(Json(SubmitResponse {
        ok: true,
        user: SubmittedRequest {
            device_id: request.device_id,
            state: request.state,
            class: request.class,
        },
    }))
}

/// POST /api/device/get_pending_student_request
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<RequestListResponse>, ApiError> {
    list_requests(&state, RequestStatus::Pending).await
}

/// POST /api/device/get_approved_student_request
pub async fn list_approved(
    State(state): State<AppState>,
) -> Result<Json<RequestListResponse>, ApiError> {
    list_requests(&state, RequestStatus::Approved).await
}

/// POST /api/device/get_denied_student_request
pub async fn list_denied(
    State(state): State<AppState>,
) -> Result<Json<RequestListResponse>, ApiError> {
    list_requests(&state, RequestStatus::Denied).await
}

async fn list_requests(
    state: &AppState,
    status: RequestStatus,
) -> Result<Json<RequestListResponse>, ApiError> {
    let user = DeviceRequestRepository::new(state.store()?)
        .list(status)
        .await
        .map_err(|e| ApiError::store("Failed to fetch requests", e))?;
    Ok(Json(RequestListResponse { ok: true, user }))
}

/// Approve or deny every pending request for a device, state and class.
///
/// POST /api/device/set_student_request
pub async fn resolve_request(
    State(state): State<AppState>,
    body: Option<Json<ResolveRequestBody>>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let decision = body_or_default::<ResolveRequestBody>(body).validate()?;
    let service = ApprovalService::new(
        state.broker.clone(),
        state.store()?,
        state.config.approval.on_broker_failure,
    );

    let resolution = service.resolve(&decision).await?;
    Ok(Json(ResolveResponse {
        ok: true,
        message: resolution.message,
        data: resolution.data,
        propagated: resolution.propagated,
        broker_error: resolution.broker_error,
    }))
}
