use clap::Args;
use revoker_provider::{LogApplier, RevokeSessionsHandler};

use super::{Outcome, read_json, to_outcome};

#[derive(Args, Debug)]
pub struct HaltArgs {
    /// Halt parameters with optional `reason` and `roleName` (JSON, @file path, or - for stdin).
    #[arg(long, default_value = "{}")]
    pub params: String,
}

pub fn run(args: &HaltArgs) -> anyhow::Result<Outcome> {
    let params = read_json(&args.params)?;
    let ack = RevokeSessionsHandler::new(LogApplier::new("halt")).halt(&params);
    to_outcome(Ok(ack))
}
