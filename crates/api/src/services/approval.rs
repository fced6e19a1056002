//! Student request resolution.

use std::sync::Arc;

use domain::models::{Approval, DeviceRequest, ResolveDeviceRequest};
use domain::services::{broker_value, resolution_message, BrokerFailurePolicy, DeviceBroker};
use persistence::repositories::DeviceRequestRepository;
use persistence::RecordStore;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::metrics::record_request_resolution;

/// Result of an operator decision.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub message: String,
    /// Rows moved out of the pending state.
    pub data: Vec<DeviceRequest>,
    /// Whether the approved state reached the broker; `None` for denials.
    pub propagated: Option<bool>,
    pub broker_error: Option<String>,
}

/// Applies operator decisions to pending student requests.
pub struct ApprovalService {
    broker: Arc<dyn DeviceBroker>,
    requests: DeviceRequestRepository,
    policy: BrokerFailurePolicy,
}

impl ApprovalService {
    pub fn new(
        broker: Arc<dyn DeviceBroker>,
        store: Arc<dyn RecordStore>,
        policy: BrokerFailurePolicy,
    ) -> Self {
        Self {
            broker,
            requests: DeviceRequestRepository::new(store),
            policy,
        }
    }

    /// Resolves every pending request matching the decision's
    /// `(DeviceId, State, Class)`.
    ///
    /// Approvals are sent to the broker before any row is touched; denials
    /// never reach the broker.
    pub async fn resolve(&self, decision: &ResolveDeviceRequest) -> Result<Resolution, ApiError> {
        let mut propagated = None;
        let mut broker_error = None;

        if decision.approval == Approval::Yes {
            let value = broker_value(decision.state);
            match self.broker.update(&decision.device_id, value).await {
                Ok(()) => propagated = Some(true),
                Err(err) if self.policy == BrokerFailurePolicy::Abort => {
                    warn!(pin = %decision.device_id, error = %err, "Approval aborted, broker rejected command");
                    return Err(err.into());
                }
                Err(err) => {
                    warn!(pin = %decision.device_id, error = %err, "Approval recorded without reaching the broker");
                    propagated = Some(false);
                    broker_error = Some(err.to_string());
                }
            }
        }

        let data = self
            .requests
            .resolve(
                &decision.device_id,
                decision.state,
                &decision.class,
                decision.approval,
            )
            .await
            .map_err(|e| ApiError::store("Failed to process request", e))?;

        record_request_resolution(decision.approval.as_str(), data.len());
        info!(
            pin = %decision.device_id,
            class = %decision.class,
            approval = decision.approval.as_str(),
            rows = data.len(),
            "Student request resolved"
        );

        Ok(Resolution {
            message: resolution_message(decision.approval),
            data,
            propagated,
            broker_error,
        })
    }
}
