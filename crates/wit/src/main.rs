use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::load_config;
use commands::{CommandContext, CommandError};
use dispatch::{DatasetCommand, DatasetDispatch, StandaloneCommand, StandaloneDispatch};
use wit_query::listing::ListingError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("{error_json}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the level
/// picked from `--verbose` and `--quiet`.
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directive(cli)));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn default_log_directive(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    }
}

async fn run(cli: &Cli) -> commands::Result<()> {
    let config = load_config()?;
    let ctx = CommandContext::from_cli(cli, &config);

    if let Some(dispatch) = StandaloneDispatch::try_from_cli(cli) {
        return dispatch.execute(&ctx, &config);
    }

    match DatasetDispatch::from_cli(cli) {
        Some(dispatch) => dispatch.execute(&ctx, &config).await,
        None => Err(CommandError::InvalidArgument(format!(
            "unsupported command: {:?}",
            cli.command
        ))),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Listing(ListingError::BadFilterSyntax(_)) => "FILTER_ERROR",
        CommandError::Listing(ListingError::Registry(_)) => "REGISTRY_ERROR",
        CommandError::Listing(_) => "LISTING_ERROR",
        CommandError::Registry(_) => "REGISTRY_ERROR",
        CommandError::DatasetStore(_) => "DATASET_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::InvalidArgument(_) => "INVALID_ARGUMENT",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the process exit status for an error.
fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Config(_) => 5,
        CommandError::DatasetStore(_) => 5,
        CommandError::Listing(ListingError::Source(_)) => 5,
        CommandError::Filter(_) => 1,
        CommandError::Listing(_) => 1,
        CommandError::Registry(_) => 1,
        CommandError::InvalidArgument(_) => 1,
        CommandError::Io(_) => 3,
        CommandError::Json(_) => 1,
    }
}
