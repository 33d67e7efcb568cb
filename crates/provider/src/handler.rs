//! The revocation action as seen by the host job framework.
//!
//! `invoke` walks a fixed sequence of stages:
//!
//! ```text
//! Init -> Validating -> Building -> Applying -> Done
//!                 \________\__________\--> Failed | FailedRetryable
//! ```
//!
//! Nothing is retried here. A failure leaves with its classification and the
//! host decides whether to run the job again.

use std::convert::Infallible;
use std::fmt;

use chrono::Utc;
use revoker_core::{
    AwsCredentials, ErrorParams, HaltAcknowledgement, HaltParams, JobContext, RevocationError,
    RevocationRequest, RevocationResult, build_policy, resolve_placeholders,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::applier::{ApplierFactory, apply_policy};

/// Progress of a single `invoke`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Validating,
    Building,
    Applying,
    Done,
    Failed,
    FailedRetryable,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Validating => "validating",
            Self::Building => "building",
            Self::Applying => "applying",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::FailedRetryable => "failed_retryable",
        }
    }

    /// Terminal stage reached when `err` ends the run.
    pub fn failed_with(err: &RevocationError) -> Self {
        if err.is_retryable() {
            Self::FailedRetryable
        } else {
            Self::Failed
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Revokes sessions of one role per invocation.
pub struct RevokeSessionsHandler<F> {
    factory: F,
}

impl<F: ApplierFactory> RevokeSessionsHandler<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Run the revocation.
    #[instrument(skip_all)]
    pub async fn invoke(
        &self,
        params: &Value,
        context: &JobContext,
    ) -> Result<RevocationResult, RevocationError> {
        let mut stage = Stage::Init;
        match self.run(params, context, &mut stage).await {
            Ok(result) => {
                info!(
                    role_name = %result.role_name,
                    token_issue_time = %result.token_issue_time,
                    "revocation policy applied"
                );
                Ok(result)
            }
            Err(err) => {
                error!(
                    stage = %stage,
                    outcome = %Stage::failed_with(&err),
                    retryable = err.is_retryable(),
                    error = %err,
                    "revocation failed"
                );
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        params: &Value,
        context: &JobContext,
        stage: &mut Stage,
    ) -> Result<RevocationResult, RevocationError> {
        let params = resolve_placeholders(params, &context.data);

        advance(stage, Stage::Validating);
        let request = RevocationRequest::from_params(&params).into_validated()?;
        let credentials = AwsCredentials::from_secrets(&context.secrets)?;

        advance(stage, Stage::Building);
        let cutoff = request.cutoff(Utc::now())?;
        let document = build_policy(cutoff, request.conditions.as_ref())?;

        advance(stage, Stage::Applying);
        let applier = self.factory.connect(&request.region, credentials).await?;
        apply_policy(applier.as_ref(), &request.role_name, &document).await?;

        advance(stage, Stage::Done);
        Ok(RevocationResult::applied(request.role_name, cutoff, Utc::now()))
    }

    /// Re-raise an error the host received from an earlier `invoke`.
    ///
    /// Retry scheduling belongs to the host; this only hands the error back
    /// with its classification unchanged.
    pub fn error(&self, params: &Value) -> Result<Infallible, RevocationError> {
        let err = ErrorParams::from_params(params)
            .error
            .unwrap_or_else(|| RevocationError::unexpected("no error supplied"));
        debug!(retryable = err.is_retryable(), error = %err, "re-raising error");
        Err(err)
    }

    /// Acknowledge a shutdown request. There is never in-flight work to undo.
    pub fn halt(&self, params: &Value) -> HaltAcknowledgement {
        let params = HaltParams::from_params(params);
        let ack = HaltAcknowledgement::new(params.role_name, params.reason, Utc::now());
        info!(role_name = %ack.role_name, reason = %ack.reason, "revocation halted");
        ack
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "stage transition");
    *stage = next;
}
