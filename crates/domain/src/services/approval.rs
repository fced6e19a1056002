//! Student device request approval workflow.
//!
//! A request is created `Pending` (`completed = false`, no decision). An
//! operator resolves it exactly once, to `Approved` (`completed = true`,
//! `Approval = YES`) or `Denied` (`completed = true`, `Approval = NO`).
//! Resolved requests are never modified again. Approving a request switches
//! the device through the broker before the rows are marked resolved.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{Approval, SwitchState};

/// Lifecycle state of a request row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    /// Derives the status from the stored columns.
    ///
    /// A completed row without a decision matches no state.
    pub fn of(completed: bool, approval: Option<Approval>) -> Option<Self> {
        match (completed, approval) {
            (false, _) => Some(RequestStatus::Pending),
            (true, Some(Approval::Yes)) => Some(RequestStatus::Approved),
            (true, Some(Approval::No)) => Some(RequestStatus::Denied),
            (true, None) => None,
        }
    }

    /// Equality filters selecting rows in this status.
    pub fn filters(&self) -> Vec<(&'static str, Value)> {
        match self {
            RequestStatus::Pending => vec![("completed", json!(false))],
            RequestStatus::Approved => vec![
                ("completed", json!(true)),
                ("Approval", json!(Approval::Yes.as_str())),
            ],
            RequestStatus::Denied => vec![
                ("completed", json!(true)),
                ("Approval", json!(Approval::No.as_str())),
            ],
        }
    }
}

/// Broker value for an approved request (`ON` is 1, everything else 0).
pub fn broker_value(state: SwitchState) -> u8 {
    state.value()
}

/// Human-readable outcome returned to the operator.
pub fn resolution_message(approval: Approval) -> String {
    match approval {
        Approval::Yes => "Request approved successfully".to_string(),
        Approval::No => "Request denied successfully".to_string(),
    }
}

/// What to do when the broker rejects an approved request.
///
/// Broker and store writes are not atomic. `Resolve` records the decision
/// anyway and reports `propagated: false` so the device can be reconciled
/// later; `Abort` leaves the request pending so it can be approved again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerFailurePolicy {
    #[default]
    Resolve,
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_of() {
        assert_eq!(RequestStatus::of(false, None), Some(RequestStatus::Pending));
        assert_eq!(
            RequestStatus::of(false, Some(Approval::Yes)),
            Some(RequestStatus::Pending)
        );
        assert_eq!(
            RequestStatus::of(true, Some(Approval::Yes)),
            Some(RequestStatus::Approved)
        );
        assert_eq!(
            RequestStatus::of(true, Some(Approval::No)),
            Some(RequestStatus::Denied)
        );
        assert_eq!(RequestStatus::of(true, None), None);
    }

    #[test]
    fn test_filters() {
        assert_eq!(
            RequestStatus::Pending.filters(),
            vec![("completed", json!(false))]
        );
        assert_eq!(
            RequestStatus::Approved.filters(),
            vec![("completed", json!(true)), ("Approval", json!("YES"))]
        );
        assert_eq!(
            RequestStatus::Denied.filters(),
            vec![("completed", json!(true)), ("Approval", json!("NO"))]
        );
    }

    #[test]
    fn test_broker_value() {
        assert_eq!(broker_value(SwitchState::On), 1);
        assert_eq!(broker_value(SwitchState::Off), 0);
    }

    #[test]
    fn test_resolution_message() {
        assert_eq!(
            resolution_message(Approval::Yes),
            "Request approved successfully"
        );
        assert_eq!(resolution_message(Approval::No), "Request denied successfully");
    }

    #[test]
    fn test_policy_serde() {
        assert_eq!(BrokerFailurePolicy::default(), BrokerFailurePolicy::Resolve);
        let policy: BrokerFailurePolicy = serde_json::from_value(json!("abort")).unwrap();
        assert_eq!(policy, BrokerFailurePolicy::Abort);
    }
}
