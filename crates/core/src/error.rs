use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure of the revocation action, tagged with retry semantics.
///
/// The host framework only looks at whether an error is retryable; the
/// message is carried through unchanged for operators.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(into = "ErrorReport", from = "ErrorReport")]
pub enum RevocationError {
    /// A permanent failure: bad input, missing role, authorization failure,
    /// malformed policy, or anything unrecognised.
    #[error("{0}")]
    Fatal(String),

    /// A transient infrastructure failure; the job may succeed if re-run.
    #[error("{0}")]
    Retryable(String),
}

impl RevocationError {
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self::Retryable(message.into())
    }

    /// Wrap an error that was never classified as a fatal failure.
    pub fn unexpected(err: impl std::fmt::Display) -> Self {
        Self::Fatal(format!("Unexpected error: {err}"))
    }

    /// Returns `true` if the host framework should re-run the job.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Fatal(msg) | Self::Retryable(msg) => msg,
        }
    }
}

/// Wire form of a [`RevocationError`] as exchanged with the host framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Human-readable failure description.
    pub message: String,
    /// Whether the host should retry the job.
    #[serde(default)]
    pub retryable: bool,
}

impl From<RevocationError> for ErrorReport {
    fn from(err: RevocationError) -> Self {
        let retryable = err.is_retryable();
        let message = match err {
            RevocationError::Fatal(msg) | RevocationError::Retryable(msg) => msg,
        };
        Self { message, retryable }
    }
}

impl From<ErrorReport> for RevocationError {
    fn from(report: ErrorReport) -> Self {
        if report.retryable {
            Self::Retryable(report.message)
        } else {
            Self::Fatal(report.message)
        }
    }
}
