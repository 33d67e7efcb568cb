use clap::Args;
use revoker_provider::{LogApplier, RevokeSessionsHandler};

use super::{Outcome, read_json};

#[derive(Args, Debug)]
pub struct ErrorArgs {
    /// Error parameters carrying the failure to re-raise (JSON, @file path, or - for stdin).
    #[arg(long, default_value = "{}")]
    pub params: String,
}

pub fn run(args: &ErrorArgs) -> anyhow::Result<Outcome> {
    let params = read_json(&args.params)?;
    let handler = RevokeSessionsHandler::new(LogApplier::new("error"));
    match handler.error(&params) {
        Err(err) => Ok(Err(err)),
    }
}
