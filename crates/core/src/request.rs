use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::RevocationError;
use crate::timestamp::parse_iso8601;

/// Parameters supplied to `invoke`, before validation.
///
/// Extraction is deliberately lenient: a field of the wrong JSON type is
/// treated as missing so that validation reports it with the same message
/// as an absent one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevocationRequest {
    pub role_name: Option<String>,
    pub region: Option<String>,
    pub token_issue_time: Option<String>,
    pub conditions: Option<Value>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub role_name: String,
    pub region: String,
    pub token_issue_time: Option<String>,
    pub conditions: Option<Value>,
}

impl RevocationRequest {
    /// Extract the request from the raw `invoke` parameters.
    pub fn from_params(params: &Value) -> Self {
        let text = |key: &str| params.get(key).and_then(Value::as_str).map(str::to_owned);
        let token_issue_time = match params.get("tokenIssueTime") {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) if raw.trim().is_empty() => None,
            Some(Value::String(raw)) => Some(raw.clone()),
            Some(other) => Some(other.to_string()),
        };
        let conditions = params
            .get("conditions")
            .filter(|value| !value.is_null())
            .cloned();

        Self {
            role_name: text("roleName"),
            region: text("region"),
            token_issue_time,
            conditions,
        }
    }

    /// Check that required parameters are present and non-blank.
    pub fn validate(&self) -> Result<(), RevocationError> {
        if is_blank(self.role_name.as_deref()) {
            return Err(RevocationError::fatal(
                "Invalid or missing roleName parameter",
            ));
        }
        if is_blank(self.region.as_deref()) {
            return Err(RevocationError::fatal("Invalid or missing region parameter"));
        }
        Ok(())
    }

    pub fn into_validated(self) -> Result<ValidatedRequest, RevocationError> {
        self.validate()?;
        Ok(ValidatedRequest {
            role_name: self.role_name.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
            token_issue_time: self.token_issue_time,
            conditions: self.conditions,
        })
    }
}

impl ValidatedRequest {
    /// The revocation cutoff: the supplied `tokenIssueTime`, or `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, RevocationError> {
        match self.token_issue_time.as_deref() {
            None => Ok(now),
            Some(raw) => parse_iso8601(raw)
                .ok_or_else(|| RevocationError::fatal(format!("Invalid tokenIssueTime: {raw}"))),
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Parameters supplied to `halt`.
#[derive(Debug, Clone, Default)]
pub struct HaltParams {
    pub reason: Option<String>,
    pub role_name: Option<String>,
}

impl HaltParams {
    pub fn from_params(params: &Value) -> Self {
        let text = |key: &str| params.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            reason: text("reason"),
            role_name: text("roleName"),
        }
    }
}

/// Parameters supplied to `error`.
#[derive(Debug, Clone, Default)]
pub struct ErrorParams {
    pub error: Option<RevocationError>,
}

impl ErrorParams {
    /// Extract the previously raised error.
    ///
    /// A bare string is accepted as a fatal error message.
    pub fn from_params(params: &Value) -> Self {
        let error = match params.get("error") {
            Some(Value::String(message)) => Some(RevocationError::fatal(message.clone())),
            Some(value @ Value::Object(_)) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        };
        Self { error }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_camel_case_fields() {
        let request = RevocationRequest::from_params(&json!({
            "roleName": "deploy",
            "region": "eu-west-1",
            "tokenIssueTime": "2024-01-01T00:00:00Z",
            "conditions": {"StringEquals": {"aws:PrincipalTag/team": "ops"}}
        }));
        assert_eq!(request.role_name.as_deref(), Some("deploy"));
        assert_eq!(request.region.as_deref(), Some("eu-west-1"));
        assert_eq!(
            request.token_issue_time.as_deref(),
            Some("2024-01-01T00:00:00Z")
        );
        assert!(request.conditions.is_some());
    }

    #[test]
    fn missing_role_name_is_fatal() {
        let err = RevocationRequest::from_params(&json!({"region": "us-east-1"}))
            .validate()
            .unwrap_err();
        assert_eq!(err, RevocationError::fatal("Invalid or missing roleName parameter"));
    }

    #[test]
    fn blank_or_mistyped_role_name_is_fatal() {
        for role in [json!(""), json!("   "), json!(17), json!(null)] {
            let err = RevocationRequest::from_params(&json!({"roleName": role, "region": "us-east-1"}))
                .validate()
                .unwrap_err();
            assert_eq!(err.message(), "Invalid or missing roleName parameter");
        }
    }

    #[test]
    fn missing_region_is_fatal() {
        let err = RevocationRequest::from_params(&json!({"roleName": "deploy", "region": " "}))
            .validate()
            .unwrap_err();
        assert_eq!(err, RevocationError::fatal("Invalid or missing region parameter"));
    }

    #[test]
    fn non_object_params_fail_on_role_name() {
        let err = RevocationRequest::from_params(&json!("deploy"))
            .validate()
            .unwrap_err();
        assert_eq!(err.message(), "Invalid or missing roleName parameter");
    }

    #[test]
    fn region_and_role_are_opaque() {
        let validated = RevocationRequest::from_params(&json!({
            "roleName": "not/a valid?role",
            "region": "mars-north-7"
        }))
        .into_validated()
        .unwrap();
        assert_eq!(validated.role_name, "not/a valid?role");
        assert_eq!(validated.region, "mars-north-7");
    }

    #[test]
    fn cutoff_defaults_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let validated = RevocationRequest::from_params(&json!({"roleName": "r", "region": "x"}))
            .into_validated()
            .unwrap();
        assert_eq!(validated.cutoff(now).unwrap(), now);
    }

    #[test]
    fn blank_cutoff_defaults_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        for raw in ["", "   "] {
            let request = RevocationRequest::from_params(&json!({
                "roleName": "r",
                "region": "x",
                "tokenIssueTime": raw
            }));
            assert!(request.token_issue_time.is_none());
            let validated = request.into_validated().unwrap();
            assert_eq!(validated.cutoff(now).unwrap(), now);
        }
    }

    #[test]
    fn cutoff_uses_supplied_time() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let validated = RevocationRequest::from_params(&json!({
            "roleName": "r",
            "region": "x",
            "tokenIssueTime": "2024-02-29T10:00:00Z"
        }))
        .into_validated()
        .unwrap();
        assert_eq!(
            validated.cutoff(now).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn unparseable_cutoff_is_fatal() {
        let now = Utc::now();
        for raw in [json!("last tuesday"), json!(1_700_000_000)] {
            let validated = RevocationRequest::from_params(&json!({
                "roleName": "r",
                "region": "x",
                "tokenIssueTime": raw
            }))
            .into_validated()
            .unwrap();
            let err = validated.cutoff(now).unwrap_err();
            assert!(!err.is_retryable());
            assert!(err.message().starts_with("Invalid tokenIssueTime"));
        }
    }

    #[test]
    fn halt_params_tolerate_missing_fields() {
        let params = HaltParams::from_params(&json!({"reason": "timeout"}));
        assert_eq!(params.reason.as_deref(), Some("timeout"));
        assert!(params.role_name.is_none());
    }

    #[test]
    fn error_params_accept_report_or_string() {
        let params = ErrorParams::from_params(&json!({
            "error": {"message": "IAM service temporarily unavailable", "retryable": true}
        }));
        assert!(params.error.unwrap().is_retryable());

        let params = ErrorParams::from_params(&json!({"error": "boom"}));
        assert_eq!(params.error, Some(RevocationError::fatal("boom")));

        assert!(ErrorParams::from_params(&json!({})).error.is_none());
    }
}
