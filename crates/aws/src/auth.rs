use aws_config::Region;
use aws_config::retry::RetryConfig;
use aws_sdk_iam::config::Credentials;
use revoker_core::AwsCredentials;
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::config::IamClientConfig;

/// Provider name reported by the static credentials.
const CREDENTIALS_SOURCE: &str = "revoker-job-secrets";

/// Convert job-secret credentials into SDK credentials.
pub fn static_credentials(credentials: &AwsCredentials) -> Credentials {
    Credentials::new(
        credentials.access_key_id.expose_secret().clone(),
        credentials.secret_access_key.expose_secret().clone(),
        credentials
            .session_token
            .as_ref()
            .map(|token| token.expose_secret().clone()),
        None,
        CREDENTIALS_SOURCE,
    )
}

/// Build an AWS SDK configuration for one invocation.
///
/// The credentials from the job secrets are used as-is, never the ambient
/// environment chain. The SDK retry layer is disabled: the host framework
/// owns retry policy and expects exactly one attempt. Optionally:
/// - overrides the endpoint URL for local development (e.g. `LocalStack`)
/// - assumes an IAM role via STS, using the supplied credentials as the
///   source identity
pub async fn build_sdk_config(
    config: &IamClientConfig,
    region: &str,
    credentials: &AwsCredentials,
) -> aws_config::SdkConfig {
    let region = Region::new(region.to_owned());
    let mut loader = aws_config::from_env()
        .region(region.clone())
        .credentials_provider(static_credentials(credentials))
        .retry_config(RetryConfig::disabled());

    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    if let Some(role_arn) = &config.role_arn {
        let session_name = config.session_name();
        info!(session_name = %session_name, "assuming IAM role via STS before revocation");

        // STS calls made by the assume-role provider inherit the endpoint
        // override and the secret-sourced credentials from the base config.
        let base_config = loader.load().await;

        let mut provider_builder = aws_config::sts::AssumeRoleProvider::builder(role_arn)
            .session_name(session_name)
            .region(region.clone());

        if let Some(ref external_id) = config.external_id {
            provider_builder = provider_builder.external_id(external_id);
        }

        let assume_role_provider = provider_builder.configure(&base_config).build().await;

        let mut final_loader = aws_config::from_env()
            .region(region)
            .credentials_provider(assume_role_provider)
            .retry_config(RetryConfig::disabled());

        if let Some(endpoint) = &config.endpoint_url {
            final_loader = final_loader.endpoint_url(endpoint);
        }

        return final_loader.load().await;
    }

    loader.load().await
}

#[cfg(test)]
mod tests {
    use revoker_core::Secrets;

    use super::*;

    fn credentials(with_token: bool) -> AwsCredentials {
        let mut secrets: Secrets = [
            ("AWS_ACCESS_KEY_ID", "AKIAEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI"),
        ]
        .into_iter()
        .collect();
        if with_token {
            secrets.insert("AWS_SESSION_TOKEN", "FwoGZXIvYXdz");
        }
        AwsCredentials::from_secrets(&secrets).unwrap()
    }

    #[test]
    fn static_credentials_copy_secret_values() {
        let creds = static_credentials(&credentials(false));
        assert_eq!(creds.access_key_id(), "AKIAEXAMPLE");
        assert_eq!(creds.secret_access_key(), "wJalrXUtnFEMI");
        assert!(creds.session_token().is_none());
        assert!(creds.expiry().is_none());
    }

    #[test]
    fn static_credentials_carry_session_token() {
        let creds = static_credentials(&credentials(true));
        assert_eq!(creds.session_token(), Some("FwoGZXIvYXdz"));
    }
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use revoker_core::Secrets;

    use super::*;

    // The AWS SDK needs a TLS root certificate store to load a config, so
    // these only run in integration mode.

    fn credentials() -> AwsCredentials {
        let secrets: Secrets = [("AWS_ACCESS_KEY_ID", "AKIA"), ("AWS_SECRET_ACCESS_KEY", "s")]
            .into_iter()
            .collect();
        AwsCredentials::from_secrets(&secrets).unwrap()
    }

    #[tokio::test]
    async fn build_sdk_config_sets_region() {
        let sdk_config =
            build_sdk_config(&IamClientConfig::new(), "ap-northeast-1", &credentials()).await;
        assert_eq!(
            sdk_config.region().map(|r| r.as_ref()),
            Some("ap-northeast-1")
        );
    }

    #[tokio::test]
    async fn build_sdk_config_disables_retries() {
        let sdk_config =
            build_sdk_config(&IamClientConfig::new(), "us-east-1", &credentials()).await;
        let retry = sdk_config.retry_config().unwrap();
        assert_eq!(retry.max_attempts(), 1);
    }

    #[tokio::test]
    async fn build_sdk_config_with_endpoint() {
        let config = IamClientConfig::new().with_endpoint_url("http://localhost:4566");
        let sdk_config = build_sdk_config(&config, "us-west-2", &credentials()).await;
        assert_eq!(
            sdk_config.endpoint_url(),
            Some("http://localhost:4566")
        );
    }
}
