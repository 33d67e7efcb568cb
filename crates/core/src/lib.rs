//! Core types for revoking active IAM role sessions.
//!
//! The revocation works by attaching an inline policy named
//! [`POLICY_NAME`] to a role. The policy denies every action on every
//! resource for credentials whose `aws:TokenIssueTime` is earlier than a
//! cutoff, which invalidates all sessions minted before that instant while
//! leaving newly issued ones untouched.

pub mod context;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod request;
pub mod template;
pub mod timestamp;

pub use context::{AwsCredentials, JobContext, Secrets};
pub use error::{ErrorReport, RevocationError};
pub use outcome::{HaltAcknowledgement, RevocationResult};
pub use policy::{
    ConditionBlock, Effect, ISSUE_TIME_KEY, ISSUE_TIME_OPERATOR, POLICY_NAME, POLICY_VERSION,
    PolicyDocument, PolicyStatement, build_policy, parse_extra_conditions,
};
pub use request::{ErrorParams, HaltParams, RevocationRequest, ValidatedRequest};
pub use template::resolve_placeholders;
pub use timestamp::{format_iso8601, parse_iso8601};
