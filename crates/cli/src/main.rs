//! Revoker CLI
//!
//! Runs the IAM session revocation action from the command line. Results are
//! printed as JSON on stdout; logs go to stderr.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::RevokerConfig;

/// Revoke active sessions of an IAM role.
#[derive(Parser, Debug)]
#[command(name = "revoker", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "REVOKER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log the policy instead of attaching it.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Attach the revocation policy to a role.
    Invoke(commands::invoke::InvokeArgs),
    /// Acknowledge a shutdown request.
    Halt(commands::halt::HaltArgs),
    /// Re-raise a failure from an earlier invocation.
    Error(commands::error::ErrorArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RevokerConfig::load(cli.config.as_deref())?;
    let dry_run = cli.dry_run || config.dry_run;

    let outcome = match cli.command {
        Command::Invoke(args) => commands::invoke::run(&args, &config.aws, dry_run).await?,
        Command::Halt(args) => commands::halt::run(&args)?,
        Command::Error(args) => commands::error::run(&args)?,
    };

    let (body, code) = commands::render(&outcome)?;
    println!("{body}");
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
