//! seedrank command-line entry point.
//!
//! Binary name: `srank`
//!
//! Parses CLI arguments, sets up tracing, opens the embedding store and
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, LogFormatArg};
use seedrank_observe::tracing_setup::{LogFormat, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = log_directive(cli.verbose, cli.quiet);
    let format = match cli.log_format {
        LogFormatArg::Text => LogFormat::Text,
        LogFormatArg::Json => LogFormat::Json,
    };
    init_tracing(format, filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

/// Default log filter for the verbosity flags; `RUST_LOG` still overrides it.
fn log_directive(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,seedrank=debug",
        _ => "trace",
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "srank", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    tracing::debug!(data_dir = %state.data_dir.display(), "seedrank initialized");
    dispatch(cli, &state).await
}

async fn dispatch(cli: Cli, state: &AppState) -> anyhow::Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Put { item_id, vector } => cli::embedding::put(state, &item_id, &vector, json).await,
        Commands::Import { path } => cli::embedding::import(state, &path, json).await,
        Commands::Get { item_id } => cli::embedding::get(state, &item_id, json).await,
        Commands::Delete { item_id } => cli::embedding::delete(state, &item_id, json).await,
        Commands::Similar { item_id, count } => {
            cli::embedding::similar(state, &item_id, count, json).await
        }
        Commands::Scan { offset, limit } => cli::embedding::scan(state, offset, limit, json).await,
        Commands::Neighbors { count, output } => {
            cli::neighbors::run(state, count, output.as_deref(), json).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directive_from_flags() {
        assert_eq!(log_directive(0, false), "warn");
        assert_eq!(log_directive(0, true), "error");
        assert_eq!(log_directive(1, true), "info,seedrank=debug");
        assert_eq!(log_directive(3, false), "trace");
    }
}
