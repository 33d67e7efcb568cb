use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_iam::operation::put_role_policy::PutRolePolicyError;
use revoker_core::{AwsCredentials, RevocationError};
use revoker_provider::{ApplierFactory, DynPolicyApplier, PolicyApplier};
use tracing::{debug, error, info, instrument};

use crate::auth::build_sdk_config;
use crate::config::IamClientConfig;
use crate::error::{AwsProviderError, classify_error_code};

/// Classify a failed `PutRolePolicy` call.
///
/// Transport failures (no response at all) are transient. Service errors are
/// classified by their declared type or error code. Anything else, such as a
/// request that could not be constructed or a response that could not be
/// parsed, is fatal.
pub fn classify_put_role_policy_error(
    err: &SdkError<PutRolePolicyError>,
    role_name: &str,
) -> AwsProviderError {
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            AwsProviderError::Connection(DisplayErrorContext(err).to_string())
        }
        SdkError::ServiceError(service) => classify_service_error(service.err(), role_name),
        _ => AwsProviderError::ServiceError(DisplayErrorContext(err).to_string()),
    }
}

/// Classify the service-level error returned by IAM.
pub fn classify_service_error(err: &PutRolePolicyError, role_name: &str) -> AwsProviderError {
    let detail = service_error_detail(err);
    if err.is_no_such_entity_exception() {
        return AwsProviderError::NoSuchEntity(role_name.to_owned());
    }
    if err.is_malformed_policy_document_exception() {
        return AwsProviderError::MalformedPolicy(detail);
    }
    if err.is_service_failure_exception() {
        return AwsProviderError::Unavailable(detail);
    }
    classify_error_code(err.code(), &detail, role_name)
}

/// The service's message, from the response metadata or, failing that, the
/// modelled exception itself.
fn service_error_detail(err: &PutRolePolicyError) -> String {
    let modelled = match err {
        PutRolePolicyError::NoSuchEntityException(e) => e.message(),
        PutRolePolicyError::MalformedPolicyDocumentException(e) => e.message(),
        PutRolePolicyError::ServiceFailureException(e) => e.message(),
        PutRolePolicyError::LimitExceededException(e) => e.message(),
        PutRolePolicyError::UnmodifiableEntityException(e) => e.message(),
        _ => None,
    };
    ProvideErrorMetadata::message(err)
        .or(modelled)
        .unwrap_or("no details provided")
        .to_owned()
}

/// Attaches inline policies through the IAM `PutRolePolicy` API.
pub struct IamPolicyApplier {
    client: aws_sdk_iam::Client,
}

impl std::fmt::Debug for IamPolicyApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamPolicyApplier")
            .field("client", &"<IamClient>")
            .finish()
    }
}

impl IamPolicyApplier {
    /// Build an IAM client for `region` using the supplied credentials.
    pub async fn new(
        config: &IamClientConfig,
        region: &str,
        credentials: &AwsCredentials,
    ) -> Self {
        let sdk_config = build_sdk_config(config, region, credentials).await;
        let client = aws_sdk_iam::Client::new(&sdk_config);
        Self { client }
    }
}

impl PolicyApplier for IamPolicyApplier {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "aws-iam"
    }

    #[instrument(skip(self, policy_document), fields(applier = "aws-iam"))]
    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), RevocationError> {
        debug!("calling IAM PutRolePolicy");

        self.client
            .put_role_policy()
            .role_name(role_name)
            .policy_name(policy_name)
            .policy_document(policy_document)
            .send()
            .await
            .map_err(|e| {
                let aws_err = classify_put_role_policy_error(&e, role_name);
                error!(
                    error = %DisplayErrorContext(&e),
                    retryable = aws_err.is_retryable(),
                    "IAM PutRolePolicy failed"
                );
                RevocationError::from(aws_err)
            })?;

        info!(role_name = %role_name, policy_name = %policy_name, "inline policy attached");
        Ok(())
    }
}

/// Creates an [`IamPolicyApplier`] per invocation.
#[derive(Debug, Clone, Default)]
pub struct IamApplierFactory {
    config: IamClientConfig,
}

impl IamApplierFactory {
    pub fn new(config: IamClientConfig) -> Self {
        Self { config }
    }
}

impl ApplierFactory for IamApplierFactory {
    #[instrument(skip(self, credentials))]
    async fn connect(
        &self,
        region: &str,
        credentials: AwsCredentials,
    ) -> Result<Box<dyn DynPolicyApplier>, RevocationError> {
        let applier = IamPolicyApplier::new(&self.config, region, &credentials).await;
        Ok(Box::new(applier))
    }
}
