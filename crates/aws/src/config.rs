use serde::{Deserialize, Serialize};

/// Default STS session name used when assuming a role.
pub const DEFAULT_SESSION_NAME: &str = "revoker-session-revocation";

/// Settings shared by every IAM client the action creates.
///
/// The region is not part of this configuration: it arrives with each
/// invocation. Credentials come from the job secrets. What remains is an
/// endpoint override for local development (e.g. `LocalStack`) and an
/// optional role to assume on top of the supplied credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct IamClientConfig {
    /// Optional endpoint URL override.
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Optional IAM role ARN to assume via STS before calling IAM.
    #[serde(default)]
    pub role_arn: Option<String>,

    /// Optional STS session name (defaults to [`DEFAULT_SESSION_NAME`]).
    #[serde(default)]
    pub session_name: Option<String>,

    /// Optional external ID for cross-account trust policies.
    #[serde(default)]
    pub external_id: Option<String>,
}

impl std::fmt::Debug for IamClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamClientConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("role_arn", &self.role_arn.as_ref().map(|_| "[REDACTED]"))
            .field("session_name", &self.session_name)
            .field("external_id", &self.external_id.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl IamClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    #[must_use]
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = Some(session_name.into());
        self
    }

    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn session_name(&self) -> &str {
        self.session_name.as_deref().unwrap_or(DEFAULT_SESSION_NAME)
    }
}
