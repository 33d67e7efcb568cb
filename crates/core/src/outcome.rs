use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::POLICY_NAME;
use crate::timestamp::format_iso8601;

/// Outcome of a successful revocation, returned to the host framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationResult {
    /// Role the policy was attached to.
    pub role_name: String,
    /// Name of the inline policy, always [`POLICY_NAME`].
    pub policy_name: String,
    /// Cutoff used in the policy; sessions issued before it are denied.
    pub token_issue_time: String,
    pub applied: bool,
    pub applied_at: String,
}

impl RevocationResult {
    pub fn applied(
        role_name: impl Into<String>,
        cutoff: DateTime<Utc>,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            role_name: role_name.into(),
            policy_name: POLICY_NAME.to_owned(),
            token_issue_time: format_iso8601(cutoff),
            applied: true,
            applied_at: format_iso8601(applied_at),
        }
    }
}

/// Acknowledgement returned from `halt`.
///
/// There is never anything to clean up: the single remote call has either
/// completed or was never attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HaltAcknowledgement {
    pub role_name: String,
    pub reason: String,
    pub halted_at: String,
    pub cleanup_completed: bool,
}

impl HaltAcknowledgement {
    pub fn new(
        role_name: Option<String>,
        reason: Option<String>,
        halted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            role_name: role_name.unwrap_or_else(|| "unknown".to_owned()),
            reason: reason.unwrap_or_else(|| "unknown".to_owned()),
            halted_at: format_iso8601(halted_at),
            cleanup_completed: true,
        }
    }
}
