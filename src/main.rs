//! `replset-bootstrap` entry point.
//!
//! Container entrypoint for a single-node replica set: the process lives as
//! long as the database daemon and exits with its status.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use replset_bootstrap::config::{self, BootstrapConfig, LogFormat};
use replset_bootstrap::daemon::exit_code;
use replset_bootstrap::error::FAILURE_EXIT_CODE;
use replset_bootstrap::observability::init_logging;

#[derive(Parser)]
#[command(name = "replset-bootstrap", version)]
#[command(about = "Bootstrap and supervise a single-node replica set", long_about = None)]
struct Cli {
    /// TOML configuration file; REPLSET_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (overrides the config file)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Default)]
enum Commands {
    /// Install keyfile, start the daemon, initialize, and stay attached (default)
    #[default]
    Run,
    /// Validate the configuration and print it with secrets redacted
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = config::load_config(cli.config.as_deref());

    let observability = loaded
        .as_ref()
        .map(|c| c.observability.clone())
        .unwrap_or_default();
    let level = cli.log_level.as_deref().unwrap_or(&observability.log_level);
    let format = cli.log_format.unwrap_or(observability.log_format);
    if let Err(e) = init_logging(level, format) {
        eprintln!("replset-bootstrap: {e}");
        return ExitCode::from(FAILURE_EXIT_CODE);
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::from(FAILURE_EXIT_CODE);
        }
    };

    match cli.command.unwrap_or_default() {
        Commands::CheckConfig => check_config(&config),
        Commands::Run => run(&config).await,
    }
}

fn check_config(config: &BootstrapConfig) -> ExitCode {
    match toml::to_string_pretty(&config.redacted()) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to render configuration");
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

async fn run(config: &BootstrapConfig) -> ExitCode {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        set = %config.replica_set.name,
        daemon = %config.daemon.binary,
        keyfile = %config.keyfile.destination.display(),
        "replset-bootstrap starting"
    );

    match replset_bootstrap::run(config).await {
        Ok(status) => {
            let code = exit_code(status);
            tracing::info!(code, "Exiting with daemon status");
            ExitCode::from(code)
        }
        Err(e) => {
            let code = e.exit_code();
            tracing::error!(error = %e, code, "Bootstrap failed");
            ExitCode::from(code)
        }
    }
}
