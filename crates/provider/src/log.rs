use revoker_core::{AwsCredentials, RevocationError};
use tracing::info;

use crate::applier::{ApplierFactory, DynPolicyApplier, PolicyApplier};

/// An applier that logs the policy it would attach and reports success
/// without performing any external I/O.
///
/// Used for dry runs and local development where no IAM endpoint is
/// available.
#[derive(Debug, Clone)]
pub struct LogApplier {
    name: String,
}

impl LogApplier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PolicyApplier for LogApplier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), RevocationError> {
        info!(
            applier = %self.name,
            role_name = %role_name,
            policy_name = %policy_name,
            policy_document = %policy_document,
            "dry run: revocation policy not attached"
        );
        Ok(())
    }
}

impl ApplierFactory for LogApplier {
    #[allow(clippy::unused_async)]
    async fn connect(
        &self,
        region: &str,
        _credentials: AwsCredentials,
    ) -> Result<Box<dyn DynPolicyApplier>, RevocationError> {
        info!(applier = %self.name, region = %region, "dry run: no IAM client created");
        Ok(Box::new(self.clone()))
    }
}
