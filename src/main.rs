//! Rust Bank Server CLI
//!
//! Serves the ledger over TCP until interrupted.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --config config.json
//! cargo run -- --port 9000 --interest-interval 0 --delay-ms 3000
//! RUST_LOG=debug cargo run -- --workers 4
//! ```
//!
//! Configuration comes from the `--config` file, or `config.json` in the
//! working directory when present, with command-line flags taking precedence.
//!
//! # Exit Codes
//!
//! - 0: Clean shutdown (Ctrl-C)
//! - 1: Error (bad configuration, address in use, etc.)

use rust_bank_server::cli::{self, CliArgs};
use rust_bank_server::{Config, LedgerError, LedgerServer};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), LedgerError> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.worker_threads())
        .enable_all()
        .build()?;

    runtime.block_on(serve(config))
}

async fn serve(config: Config) -> Result<(), LedgerError> {
    let server = LedgerServer::bind(&config).await?;
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received");
                signal_token.cancel();
            }
            Err(e) => error!(error = %e, "failed to listen for interrupt"),
        }
    });

    server.run(shutdown).await
}
