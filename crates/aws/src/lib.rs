//! AWS IAM integration for the session revocation action.
//!
//! [`IamApplierFactory`] builds an IAM client from the credentials found in
//! the job secrets and hands back an [`IamPolicyApplier`] that attaches the
//! revocation policy with a single `PutRolePolicy` call. Failures are mapped
//! onto fatal or retryable errors by [`error::classify_error_code`].
//!
//! All clients share an [`IamClientConfig`] for endpoint override and
//! optional STS assume-role.

pub mod auth;
pub mod config;
pub mod error;
pub mod iam;

pub use config::IamClientConfig;
pub use error::AwsProviderError;
pub use iam::{IamApplierFactory, IamPolicyApplier};
