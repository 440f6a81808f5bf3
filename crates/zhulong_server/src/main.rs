//! Server entry point.

use clap::Parser;
use log::{error, info};
use std::process::ExitCode;
use zhulong_core::{default_log_level, init_logging_with, open_db, LogEcho};
use zhulong_server::config::ServerConfig;
use zhulong_server::{build_router, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    let config = ServerConfig::parse();

    if let Err(message) = start_logging(&config) {
        eprintln!("zhulong: {message}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=server_exit module=server status=error error={message}");
            eprintln!("zhulong: {message}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(config: &ServerConfig) -> Result<(), String> {
    let log_dir = config
        .absolute_log_dir()
        .map_err(|err| format!("cannot resolve log directory: {err}"))?;
    let level = config.log_level.as_deref().unwrap_or(default_log_level());
    init_logging_with(level, &log_dir.to_string_lossy(), LogEcho::Stderr)
}

async fn run(config: ServerConfig) -> Result<(), String> {
    // Migrate once up front so schema problems fail fast.
    open_db(&config.db_path).map_err(|err| {
        format!(
            "cannot open database `{}`: {err}",
            config.db_path.display()
        )
    })?;

    let app = build_router(AppState::from_config(&config));
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|err| format!("cannot bind {}: {err}", config.bind))?;

    info!(
        "event=server_start module=server status=ok bind={} db_path={} version={}",
        config.bind,
        config.db_path.display(),
        env!("CARGO_PKG_VERSION")
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| format!("server error: {err}"))?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=signal_listen module=server status=error error={err}");
    }
}
