pub mod error;
pub mod halt;
pub mod invoke;

use std::io::Read;

use anyhow::Context;
use revoker_core::RevocationError;
use serde::Serialize;
use serde_json::{Value, json};

/// Exit status for a failure the host should retry (`EX_TEMPFAIL`).
pub const EXIT_RETRYABLE: i32 = 75;
/// Exit status for a failure that must not be retried.
pub const EXIT_FATAL: i32 = 1;

/// Argument value that reads the document from stdin.
pub const STDIN: &str = "-";

/// What a command produced: a JSON document, or a classified failure.
pub type Outcome = Result<Value, RevocationError>;

/// Read a JSON argument: inline text, `@path` for a file, or `-` for stdin.
pub fn read_json(arg: &str) -> anyhow::Result<Value> {
    read_json_from(arg, std::io::stdin().lock())
}

pub fn read_json_from(arg: &str, mut stdin: impl Read) -> anyhow::Result<Value> {
    let content = if arg == STDIN {
        let mut buf = String::new();
        stdin
            .read_to_string(&mut buf)
            .context("failed to read JSON from stdin")?;
        buf
    } else if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?
    } else {
        arg.to_owned()
    };
    serde_json::from_str(&content).context("argument is not valid JSON")
}

pub fn to_outcome<T: Serialize>(result: Result<T, RevocationError>) -> anyhow::Result<Outcome> {
    match result {
        Ok(value) => Ok(Ok(serde_json::to_value(value)?)),
        Err(err) => Ok(Err(err)),
    }
}

/// Render an outcome for stdout and pick the process exit status.
pub fn render(outcome: &Outcome) -> anyhow::Result<(String, i32)> {
    match outcome {
        Ok(value) => Ok((serde_json::to_string_pretty(value)?, 0)),
        Err(err) => {
            let code = if err.is_retryable() {
                EXIT_RETRYABLE
            } else {
                EXIT_FATAL
            };
            let body = json!({ "error": err });
            Ok((serde_json::to_string_pretty(&body)?, code))
        }
    }
}
