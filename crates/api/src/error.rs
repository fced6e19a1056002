use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::BrokerError;
use domain::DomainError;
use persistence::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// The record store rejected or failed a call.
    #[error("{context}: {details}")]
    Store { context: String, details: String },

    /// The device broker rejected or failed a call.
    #[error("{0}")]
    Broker(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wraps a store failure with the operation that was attempted.
    pub fn store(context: impl Into<String>, err: StoreError) -> Self {
        ApiError::Store {
            context: context.into(),
            details: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::NotConfigured(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            ApiError::Store { context, details } => {
                tracing::error!(error = %details, "{}", context);
                (StatusCode::INTERNAL_SERVER_ERROR, context, Some(details))
            }
            ApiError::Broker(msg) => {
                tracing::error!(error = %msg, "Broker call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None)
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<BrokerError> for ApiError {
    fn from(err: BrokerError) -> Self {
        ApiError::Broker(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::store("Record store request failed", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_validation() {
        let response = ApiError::Validation("invalid pin".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_api_error_unauthorized() {
        let response = ApiError::Unauthorized("invalid credentials".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_upstream_failures_are_500() {
        let errors = [
            ApiError::NotConfigured("Supabase not configured".to_string()),
            ApiError::store(
                "Failed to fetch requests",
                StoreError::Transport("timeout".to_string()),
            ),
            ApiError::Broker("Broker GET failed: 502".to_string()),
            ApiError::Internal("boom".to_string()),
        ];
        for error in errors {
            assert_eq!(
                error.into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[tokio::test]
    async fn test_store_error_body_has_details() {
        let error = ApiError::store(
            "Failed to insert request",
            StoreError::Api {
                status: 400,
                message: "column \"Clas\" does not exist".to_string(),
            },
        );
        let body = body_json(error.into_response()).await;
        assert_eq!(body["error"], "Failed to insert request");
        assert_eq!(body["details"], "column \"Clas\" does not exist");
    }

    #[tokio::test]
    async fn test_broker_error_body_is_raw_message() {
        let error: ApiError = BrokerError::UpdateFailed(400).into();
        let body = body_json(error.into_response()).await;
        assert_eq!(body["error"], "Broker UPDATE failed: 400");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_from_domain_error() {
        let error: ApiError = DomainError::validation("value must be 0 or 1").into();
        match error {
            ApiError::Validation(msg) => assert_eq!(msg, "value must be 0 or 1"),
            _ => panic!("Expected Validation error"),
        }
    }
}
