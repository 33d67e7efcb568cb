//! Construction of the session revocation policy document.
//!
//! The document always has exactly one statement:
//!
//! ```json
//! {
//!   "Version": "2012-10-17",
//!   "Statement": [{
//!     "Effect": "Deny",
//!     "Action": ["*"],
//!     "Resource": ["*"],
//!     "Condition": {
//!       "DateLessThan": { "aws:TokenIssueTime": "2024-01-01T00:00:00.000Z" }
//!     }
//!   }]
//! }
//! ```
//!
//! Callers may merge extra condition operators into the statement. Merging
//! is shallow per operator: keys are added to an existing operator block, new
//! operators are appended, and the issue-time key can never be replaced.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RevocationError;
use crate::timestamp::format_iso8601;

/// Name of the inline policy attached to the role.
pub const POLICY_NAME: &str = "AWSRevokeOlderSessions";

/// IAM policy language version.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Condition operator carrying the cutoff.
pub const ISSUE_TIME_OPERATOR: &str = "DateLessThan";

/// Global condition key holding the credential mint time.
pub const ISSUE_TIME_KEY: &str = "aws:TokenIssueTime";

/// Condition operator -> condition key -> value(s).
pub type ConditionBlock = BTreeMap<String, BTreeMap<String, Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: Effect,
    pub action: Vec<String>,
    pub resource: Vec<String>,
    pub condition: ConditionBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// The base document denying everything to credentials issued before
    /// `cutoff`.
    pub fn deny_before(cutoff: DateTime<Utc>) -> Self {
        let mut issue_time = BTreeMap::new();
        issue_time.insert(
            ISSUE_TIME_KEY.to_owned(),
            Value::String(format_iso8601(cutoff)),
        );
        let mut condition = ConditionBlock::new();
        condition.insert(ISSUE_TIME_OPERATOR.to_owned(), issue_time);

        Self {
            version: POLICY_VERSION.to_owned(),
            statement: vec![PolicyStatement {
                effect: Effect::Deny,
                action: vec!["*".to_owned()],
                resource: vec!["*".to_owned()],
                condition,
            }],
        }
    }

    /// The cutoff currently encoded in the document, if any.
    pub fn issue_time_cutoff(&self) -> Option<&str> {
        self.statement
            .first()?
            .condition
            .get(ISSUE_TIME_OPERATOR)?
            .get(ISSUE_TIME_KEY)?
            .as_str()
    }

    /// Shallow-merge extra condition operators into the statement.
    ///
    /// Every operator must map to an object. The whole input is checked
    /// before anything is merged, so a rejected merge leaves the document
    /// untouched.
    pub fn merge_conditions(&mut self, extra: &Map<String, Value>) -> Result<(), RevocationError> {
        for (operator, keys) in extra {
            let keys = keys.as_object().ok_or_else(|| {
                RevocationError::fatal(format!(
                    "Invalid conditions JSON: operator '{operator}' must map condition keys to values"
                ))
            })?;
            if operator == ISSUE_TIME_OPERATOR && keys.contains_key(ISSUE_TIME_KEY) {
                return Err(RevocationError::fatal(format!(
                    "Invalid conditions JSON: {ISSUE_TIME_OPERATOR}.{ISSUE_TIME_KEY} is reserved for the revocation cutoff"
                )));
            }
        }

        let Some(statement) = self.statement.first_mut() else {
            return Err(RevocationError::fatal(
                "Malformed policy document: no statement to merge conditions into",
            ));
        };

        for (operator, keys) in extra {
            let block = statement.condition.entry(operator.clone()).or_default();
            if let Some(keys) = keys.as_object() {
                for (key, value) in keys {
                    block.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, RevocationError> {
        serde_json::to_string(self).map_err(RevocationError::unexpected)
    }
}

/// Normalise caller-supplied extra conditions.
///
/// Accepts a JSON object or a string holding one. `null` and blank strings
/// mean "no extra conditions".
pub fn parse_extra_conditions(
    raw: &Value,
) -> Result<Option<Map<String, Value>>, RevocationError> {
    match raw {
        Value::Null => Ok(None),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => {
            let parsed: Value = serde_json::from_str(text).map_err(|e| {
                RevocationError::fatal(format!("Invalid conditions JSON: {e}"))
            })?;
            match parsed {
                Value::Object(map) => Ok(Some(map)),
                _ => Err(not_an_object()),
            }
        }
        Value::Object(map) => Ok(Some(map.clone())),
        _ => Err(not_an_object()),
    }
}

fn not_an_object() -> RevocationError {
    RevocationError::fatal(
        "Invalid conditions JSON: expected an object mapping condition operators to condition keys",
    )
}

/// Build the serialized revocation policy for `cutoff`, merged with any
/// extra conditions.
pub fn build_policy(
    cutoff: DateTime<Utc>,
    extra_conditions: Option<&Value>,
) -> Result<String, RevocationError> {
    let mut document = PolicyDocument::deny_before(cutoff);
    if let Some(raw) = extra_conditions
        && let Some(extra) = parse_extra_conditions(raw)?
    {
        document.merge_conditions(&extra)?;
    }
    document.to_json()
}
