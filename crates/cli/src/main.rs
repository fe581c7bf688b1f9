use crate::{
    commands::Commands,
    conn::{ConnectionPinger, SessionPinger},
    error::CliError,
    output::CheckReport,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use connectors::sql::base::settings::ConnectionSettings;
use engine_config::settings::{load_configuration, validated::Configuration};
use engine_core::connectors::sink::StdoutSink;
use engine_processing::health::Health;
use engine_runtime::runtime::SourceRuntime;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod error;
mod output;
mod shutdown;

const DEFAULT_SOURCE_NAME: &str = "sql-source";

#[derive(Parser)]
#[command(name = "sqlpoll", version = "0.1.0", about = "Checkpointed SQL table poller")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // stdout carries the events, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match execute(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn execute(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Run { config, name } => {
            let config = load_configuration(&config, &name)?;
            run(&config).await
        }
        Commands::Check { config, name, json } => {
            let config = load_configuration(&config, &name)?;
            check(&config, json)?;
            Ok(ExitCode::Success)
        }
        Commands::TestConn { url, config } => {
            let settings = match (url, config) {
                (Some(url), _) => ConnectionSettings::new(url),
                (None, Some(path)) => load_configuration(&path, DEFAULT_SOURCE_NAME)?.connection,
                (None, None) => return Err(CliError::Ping("no connection given".into())),
            };
            SessionPinger { settings }.ping().await?;
            Ok(ExitCode::Success)
        }
    }
}

async fn run(config: &Configuration) -> Result<ExitCode, CliError> {
    let handle = SourceRuntime::connect(config, Arc::new(StdoutSink::stdout())).await?;

    let shutdown = ShutdownCoordinator::new(handle.cancel_token());
    shutdown.register_handlers();
    tokio::spawn(log_health(handle.health()));

    let cursor = handle.wait().await?;
    info!(cursor = %cursor, "Poller exited");

    if shutdown.is_shutdown_requested() {
        return Ok(ExitCode::ShutdownRequested);
    }
    Ok(ExitCode::Success)
}

fn check(config: &Configuration, as_json: bool) -> Result<(), CliError> {
    let checkpoint = config.status_store().read()?;
    if let Some(cp) = &checkpoint {
        config.identity().verify(&cp.identity)?;
    }
    output::print_report(&CheckReport::new(config, checkpoint), as_json)
}

async fn log_health(mut rx: watch::Receiver<Health>) {
    while rx.changed().await.is_ok() {
        let health = rx.borrow_and_update().clone();
        match health {
            Health::Degraded { .. } => warn!(health = %health, "Poller health changed"),
            _ => info!(health = %health, "Poller health changed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_file(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_run_command() {
        let cli = Cli::try_parse_from(["sqlpoll", "run", "--config", "poller.json", "--name", "orders"])
            .unwrap();
        match cli.command {
            Commands::Run { config, name } => {
                assert_eq!(config, "poller.json");
                assert_eq!(name, "orders");
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_conn_needs_a_target() {
        assert!(Cli::try_parse_from(["sqlpoll", "test-conn"]).is_err());
        assert!(Cli::try_parse_from(["sqlpoll", "test-conn", "--url", "mysql://h/db"]).is_ok());
    }

    #[test]
    fn check_reports_checkpoint_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let file = settings_file(&format!(
            r#"{{
                "status.file.name": "orders.status",
                "status.file.path": "{}",
                "connection.url": "mysql://localhost/shop",
                "table": "orders",
                "incremental.column.name": "id"
            }}"#,
            dir.path().display()
        ));

        let config = load_configuration(file.path(), "orders").unwrap();
        assert!(check(&config, true).is_ok());

        let store = config.status_store();
        store.ensure_directory().unwrap();
        let mut other = config.identity();
        other.table = "customers".into();
        store
            .write(&engine_core::state::models::Checkpoint::new(other, "5".into()))
            .unwrap();

        assert!(matches!(check(&config, false), Err(CliError::Checkpoint(_))));
    }
}
