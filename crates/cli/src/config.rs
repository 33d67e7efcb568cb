use std::path::Path;

use anyhow::Context;
use revoker_aws::IamClientConfig;
use serde::Deserialize;

/// Settings loaded from the optional TOML configuration file.
///
/// ```toml
/// dry_run = false
///
/// [aws]
/// endpoint_url = "http://localhost:4566"
/// role_arn = "arn:aws:iam::123456789012:role/session-revoker"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct RevokerConfig {
    /// IAM client settings shared by every invocation.
    #[serde(default)]
    pub aws: IamClientConfig,

    /// Log the policy instead of attaching it.
    #[serde(default)]
    pub dry_run: bool,
}

impl RevokerConfig {
    /// Load the configuration from `path`, or use defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
