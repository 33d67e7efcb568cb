use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use crate::error::RevocationError;

/// Secret names recognised for the access key id, in lookup order.
pub const ACCESS_KEY_ID_NAMES: &[&str] = &["AWS_ACCESS_KEY_ID", "accessKeyId"];

/// Secret names recognised for the secret access key, in lookup order.
pub const SECRET_ACCESS_KEY_NAMES: &[&str] = &["AWS_SECRET_ACCESS_KEY", "secretAccessKey"];

/// Secret names recognised for an optional session token, in lookup order.
pub const SESSION_TOKEN_NAMES: &[&str] = &["AWS_SESSION_TOKEN", "sessionToken"];

/// Context handed to the action by the host job framework.
#[derive(Debug, Default, Deserialize)]
pub struct JobContext {
    /// Outputs of earlier jobs and other values placeholders resolve against.
    #[serde(default)]
    pub data: Value,

    /// Secret values keyed by name.
    #[serde(default)]
    pub secrets: Secrets,
}

/// Named secret values. Never printed.
///
/// Only string values are kept: a non-string entry (a port number, a null
/// placeholder) is dropped rather than failing the whole context.
#[derive(Default, Deserialize)]
#[serde(from = "Value")]
pub struct Secrets(HashMap<String, SecretString>);

impl From<Value> for Secrets {
    fn from(value: Value) -> Self {
        let Value::Object(entries) = value else {
            return Self::default();
        };
        entries
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::String(secret) => Some((name, secret)),
                _ => None,
            })
            .collect()
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.0.keys().collect();
        names.sort();
        f.debug_struct("Secrets")
            .field("names", &names)
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Secrets {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), SecretString::new(value.into()));
    }

    /// The first non-blank secret among `names`.
    pub fn first_present(&self, names: &[&str]) -> Option<&SecretString> {
        names
            .iter()
            .filter_map(|name| self.0.get(*name))
            .find(|secret| !secret.expose_secret().trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Secrets {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut secrets = Self::default();
        for (name, value) in iter {
            secrets.insert(name, value);
        }
        secrets
    }
}

/// Static AWS credentials taken from the job secrets.
pub struct AwsCredentials {
    pub access_key_id: SecretString,
    pub secret_access_key: SecretString,
    pub session_token: Option<SecretString>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &"[REDACTED]")
            .field("secret_access_key", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl AwsCredentials {
    pub fn from_secrets(secrets: &Secrets) -> Result<Self, RevocationError> {
        let copy = |secret: &SecretString| SecretString::new(secret.expose_secret().clone());

        let (Some(access_key_id), Some(secret_access_key)) = (
            secrets.first_present(ACCESS_KEY_ID_NAMES),
            secrets.first_present(SECRET_ACCESS_KEY_NAMES),
        ) else {
            return Err(RevocationError::fatal(
                "Missing required credentials in secrets",
            ));
        };

        Ok(Self {
            access_key_id: copy(access_key_id),
            secret_access_key: copy(secret_access_key),
            session_token: secrets.first_present(SESSION_TOKEN_NAMES).map(copy),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn credentials_from_upper_snake_names() {
        let secrets: Secrets = [
            ("AWS_ACCESS_KEY_ID", "AKIAEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI"),
        ]
        .into_iter()
        .collect();
        let creds = AwsCredentials::from_secrets(&secrets).unwrap();
        assert_eq!(creds.access_key_id.expose_secret(), "AKIAEXAMPLE");
        assert_eq!(creds.secret_access_key.expose_secret(), "wJalrXUtnFEMI");
        assert!(creds.session_token.is_none());
    }

    #[test]
    fn credentials_from_camel_case_aliases() {
        let secrets: Secrets = [
            ("accessKeyId", "AKIAALIAS"),
            ("secretAccessKey", "secret"),
            ("sessionToken", "token"),
        ]
        .into_iter()
        .collect();
        let creds = AwsCredentials::from_secrets(&secrets).unwrap();
        assert_eq!(creds.access_key_id.expose_secret(), "AKIAALIAS");
        assert_eq!(
            creds.session_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("token")
        );
    }

    #[test]
    fn missing_either_credential_is_fatal() {
        let only_key: Secrets = [("AWS_ACCESS_KEY_ID", "AKIA")].into_iter().collect();
        let err = AwsCredentials::from_secrets(&only_key).unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(err.message(), "Missing required credentials in secrets");

        let only_secret: Secrets = [("AWS_SECRET_ACCESS_KEY", "s")].into_iter().collect();
        assert!(AwsCredentials::from_secrets(&only_secret).is_err());

        let blank: Secrets = [("AWS_ACCESS_KEY_ID", "AKIA"), ("AWS_SECRET_ACCESS_KEY", "  ")]
            .into_iter()
            .collect();
        assert!(AwsCredentials::from_secrets(&blank).is_err());
    }

    #[test]
    fn debug_never_prints_secret_values() {
        let secrets: Secrets = [
            ("AWS_ACCESS_KEY_ID", "AKIAEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI"),
        ]
        .into_iter()
        .collect();
        let debug = format!("{secrets:?}");
        assert!(debug.contains("AWS_ACCESS_KEY_ID"));
        assert!(!debug.contains("wJalrXUtnFEMI"));

        let creds = AwsCredentials::from_secrets(&secrets).unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("AKIAEXAMPLE"));
    }

    #[test]
    fn context_deserializes_from_host_json() {
        let ctx: JobContext = serde_json::from_value(json!({
            "data": {"outputs": {"lookup": {"role": "deploy"}}},
            "secrets": {"AWS_ACCESS_KEY_ID": "AKIA", "AWS_SECRET_ACCESS_KEY": "s"},
            "env": {"STAGE": "prod"}
        }))
        .unwrap();
        assert_eq!(ctx.data["outputs"]["lookup"]["role"], "deploy");
        assert!(AwsCredentials::from_secrets(&ctx.secrets).is_ok());
    }

    #[test]
    fn non_string_secrets_are_ignored() {
        let ctx: JobContext = serde_json::from_value(json!({
            "secrets": {
                "AWS_ACCESS_KEY_ID": "AKIA",
                "AWS_SECRET_ACCESS_KEY": "s",
                "DB_PORT": 5432,
                "FEATURE_FLAGS": {"beta": true}
            }
        }))
        .unwrap();
        let creds = AwsCredentials::from_secrets(&ctx.secrets).unwrap();
        assert_eq!(creds.access_key_id.expose_secret(), "AKIA");
        assert!(format!("{:?}", ctx.secrets).contains("AWS_ACCESS_KEY_ID"));
        assert!(!format!("{:?}", ctx.secrets).contains("DB_PORT"));
    }

    #[test]
    fn null_credential_is_missing() {
        let ctx: JobContext = serde_json::from_value(json!({
            "secrets": {"AWS_ACCESS_KEY_ID": null, "AWS_SECRET_ACCESS_KEY": "s"}
        }))
        .unwrap();
        let err = AwsCredentials::from_secrets(&ctx.secrets).unwrap_err();
        assert_eq!(err, RevocationError::fatal("Missing required credentials in secrets"));
    }

    #[test]
    fn non_object_secrets_are_empty() {
        let ctx: JobContext = serde_json::from_value(json!({"secrets": 42})).unwrap();
        assert!(AwsCredentials::from_secrets(&ctx.secrets).is_err());
    }

    #[test]
    fn empty_context_has_no_credentials() {
        let ctx: JobContext = serde_json::from_value(json!({})).unwrap();
        assert!(ctx.data.is_null());
        assert!(AwsCredentials::from_secrets(&ctx.secrets).is_err());
    }
}
