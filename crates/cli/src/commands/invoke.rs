use anyhow::{Context, bail};
use clap::Args;
use revoker_aws::{IamApplierFactory, IamClientConfig};
use revoker_core::JobContext;
use revoker_provider::{LogApplier, RevokeSessionsHandler};

use super::{Outcome, STDIN, read_json, to_outcome};

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Action parameters (JSON, @file path, or - for stdin).
    #[arg(long)]
    pub params: String,
    /// Job context with `data` and `secrets` (JSON, @file path, or - for stdin).
    #[arg(long, default_value = "{}")]
    pub context: String,
}

pub async fn run(
    args: &InvokeArgs,
    aws: &IamClientConfig,
    dry_run: bool,
) -> anyhow::Result<Outcome> {
    if args.params == STDIN && args.context == STDIN {
        bail!("only one of --params and --context can be read from stdin");
    }
    let params = read_json(&args.params)?;
    let context: JobContext =
        serde_json::from_value(read_json(&args.context)?).context("invalid job context")?;

    let result = if dry_run {
        RevokeSessionsHandler::new(LogApplier::new("dry-run"))
            .invoke(&params, &context)
            .await
    } else {
        RevokeSessionsHandler::new(IamApplierFactory::new(aws.clone()))
            .invoke(&params, &context)
            .await
    };
    to_outcome(result)
}
