use async_trait::async_trait;
use revoker_core::{AwsCredentials, POLICY_NAME, RevocationError};
use tracing::{debug, instrument};

/// Attaches an inline policy document to a role.
///
/// Implementations perform exactly one remote call per invocation and report
/// failures already classified as fatal or retryable. They never retry.
///
/// This trait is **not** object-safe because it uses native `async fn`
/// methods. Use [`DynPolicyApplier`] for dynamic dispatch; every
/// `PolicyApplier` implements it through a blanket implementation.
pub trait PolicyApplier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Attach `policy_document` to `role_name` under `policy_name`.
    fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> impl std::future::Future<Output = Result<(), RevocationError>> + Send;
}

/// Object-safe applier for use behind `Box<dyn DynPolicyApplier>`.
///
/// Implement [`PolicyApplier`] instead and rely on the blanket
/// implementation.
#[async_trait]
pub trait DynPolicyApplier: Send + Sync {
    fn name(&self) -> &str;

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), RevocationError>;
}

#[async_trait]
impl<T: PolicyApplier + Sync> DynPolicyApplier for T {
    fn name(&self) -> &str {
        PolicyApplier::name(self)
    }

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), RevocationError> {
        PolicyApplier::put_role_policy(self, role_name, policy_name, policy_document).await
    }
}

/// Builds an applier bound to a region and a set of credentials.
///
/// The handler only learns the region and credentials during `invoke`, so
/// it cannot be handed a ready-made client.
pub trait ApplierFactory: Send + Sync {
    fn connect(
        &self,
        region: &str,
        credentials: AwsCredentials,
    ) -> impl std::future::Future<Output = Result<Box<dyn DynPolicyApplier>, RevocationError>> + Send;
}

/// Attach the revocation policy to `role_name`.
///
/// Single attempt. Returns `true` once the policy is in place; any failure is
/// returned with its classification intact.
#[instrument(skip(applier, policy_document), fields(applier = applier.name(), policy = POLICY_NAME))]
pub async fn apply_policy(
    applier: &dyn DynPolicyApplier,
    role_name: &str,
    policy_document: &str,
) -> Result<bool, RevocationError> {
    debug!(bytes = policy_document.len(), "attaching revocation policy");
    applier
        .put_role_policy(role_name, POLICY_NAME, policy_document)
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records calls and answers with a scripted result.
    struct RecordingApplier {
        outcome: Option<RevocationError>,
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingApplier {
        fn new(outcome: Option<RevocationError>) -> Self {
            Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl PolicyApplier for RecordingApplier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn put_role_policy(
            &self,
            role_name: &str,
            policy_name: &str,
            policy_document: &str,
        ) -> Result<(), RevocationError> {
            self.calls.lock().unwrap().push((
                role_name.to_owned(),
                policy_name.to_owned(),
                policy_document.to_owned(),
            ));
            match &self.outcome {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn apply_uses_fixed_policy_name() {
        let applier = RecordingApplier::new(None);
        let applied = apply_policy(&applier, "deploy", "{}").await.unwrap();
        assert!(applied);

        let calls = applier.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            (
                "deploy".to_owned(),
                "AWSRevokeOlderSessions".to_owned(),
                "{}".to_owned()
            )
        );
    }

    #[tokio::test]
    async fn apply_passes_classification_through() {
        let applier = RecordingApplier::new(Some(RevocationError::retryable(
            "IAM service temporarily unavailable (throttled): Rate exceeded",
        )));
        let err = apply_policy(&applier, "deploy", "{}").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(applier.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blanket_dyn_applier_impl() {
        let applier: Box<dyn DynPolicyApplier> = Box::new(RecordingApplier::new(None));
        assert_eq!(applier.name(), "recording");
        applier
            .put_role_policy("r", "AWSRevokeOlderSessions", "{}")
            .await
            .unwrap();
    }
}
