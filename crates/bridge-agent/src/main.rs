//! `bridge-register` registers a freshly bootstrapped node with BRIDGE.
//!
//! Exit code 0 and the registration JSON on stdout on success; a non-zero
//! code per error kind and a one-line diagnostic on stderr otherwise.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bridge_agent::cli::Cli;
use bridge_agent::runner;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries the registration response only.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "bridge-register starting"
    );

    let compact = cli.compact;
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("registration failed: {e}");
            return ExitCode::from(e.exit_code());
        }
    };

    match runner::run(&config).await {
        Ok(result) => {
            let body = result.into_body();
            let printed = if compact {
                serde_json::to_string(&body)
            } else {
                serde_json::to_string_pretty(&body)
            };
            match printed {
                Ok(text) => {
                    println!("{text}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("registration succeeded but the response could not be printed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "registration failed");
            eprintln!("registration failed: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
