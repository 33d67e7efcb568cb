use revoker_core::RevocationError;
use thiserror::Error;

/// Failures of an IAM call, identified by what the service reported.
#[derive(Debug, Error)]
pub enum AwsProviderError {
    /// The role does not exist.
    #[error("Role not found: {0}")]
    NoSuchEntity(String),

    /// IAM rejected the policy document.
    #[error("Malformed policy document: {0}")]
    MalformedPolicy(String),

    /// The credentials are invalid or lack `iam:PutRolePolicy`.
    #[error("Access denied applying revocation policy: {0}")]
    AccessDenied(String),

    /// The request was throttled.
    #[error("IAM service temporarily unavailable (throttled): {0}")]
    Throttled(String),

    /// IAM reported a transient server-side failure.
    #[error("IAM service temporarily unavailable: {0}")]
    Unavailable(String),

    /// No response was received: connection failure or transport timeout.
    #[error("IAM service temporarily unavailable: {0}")]
    Connection(String),

    /// Any other service error. Not retried.
    #[error("Failed to apply revocation policy: {0}")]
    ServiceError(String),
}

impl AwsProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Throttled(_) | Self::Unavailable(_) | Self::Connection(_)
        )
    }
}

impl From<AwsProviderError> for RevocationError {
    fn from(err: AwsProviderError) -> Self {
        if err.is_retryable() {
            RevocationError::Retryable(err.to_string())
        } else {
            RevocationError::Fatal(err.to_string())
        }
    }
}

/// Classify an IAM error by its service error code.
///
/// `role_name` is used for the not-found message, `detail` is the service's
/// own message. A missing or unrecognised code is fatal: an unknown failure
/// class is never retried.
pub fn classify_error_code(
    code: Option<&str>,
    detail: &str,
    role_name: &str,
) -> AwsProviderError {
    let detail = detail.to_owned();
    match code {
        Some("NoSuchEntity" | "NoSuchEntityException") => {
            AwsProviderError::NoSuchEntity(role_name.to_owned())
        }
        Some("MalformedPolicyDocument" | "MalformedPolicyDocumentException") => {
            AwsProviderError::MalformedPolicy(detail)
        }
        Some(
            "AccessDenied"
            | "AccessDeniedException"
            | "UnauthorizedOperation"
            | "UnrecognizedClientException"
            | "InvalidClientTokenId"
            | "SignatureDoesNotMatch",
        ) => AwsProviderError::AccessDenied(detail),
        Some(
            "Throttling"
            | "ThrottlingException"
            | "RequestLimitExceeded"
            | "TooManyRequestsException",
        ) => AwsProviderError::Throttled(detail),
        Some(
            "ServiceUnavailable"
            | "ServiceUnavailableException"
            | "ServiceFailure"
            | "ServiceFailureException",
        ) => AwsProviderError::Unavailable(detail),
        _ => AwsProviderError::ServiceError(detail),
    }
}
