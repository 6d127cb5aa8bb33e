//! User API server entry point.
//!
//! # Responsibility
//! - Load configuration, initialize logging and open the selected backend.
//! - Serve the core handler over HTTP until Ctrl-C.

mod app;
mod config;

use config::{ServerConfig, StorageBackend};
use log::{error, info};
use std::process::ExitCode;
use std::sync::Arc;
use user_api_core::db::open_db;
use user_api_core::{
    init_logging, InMemoryUserRepository, RepoResult, SqliteUserRepository, UserHandler,
    UserRepository,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("user-api: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("user-api: {err}");
        return ExitCode::FAILURE;
    }

    let repo = match build_repository(&config) {
        Ok(repo) => repo,
        Err(err) => {
            error!(
                "event=server_start module=server status=error backend={} error_code=storage_open_failed error={}",
                config.backend.as_str(),
                err
            );
            return ExitCode::FAILURE;
        }
    };

    let state = app::AppState {
        handler: UserHandler::new(repo),
        request_timeout: config.request_timeout,
    };

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(
                "event=server_start module=server status=error addr={} error_code=bind_failed error={}",
                config.bind_addr, err
            );
            return ExitCode::FAILURE;
        }
    };

    info!(
        "event=server_start module=server status=ok addr={} backend={}",
        config.bind_addr,
        config.backend.as_str()
    );

    if let Err(err) = axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("event=server_stop module=server status=error error={}", err);
        return ExitCode::FAILURE;
    }

    info!("event=server_stop module=server status=ok");
    ExitCode::SUCCESS
}

fn build_repository(config: &ServerConfig) -> RepoResult<Arc<dyn UserRepository>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryUserRepository::new())),
        StorageBackend::Sqlite => {
            let conn = open_db(&config.db_path)?;
            Ok(Arc::new(SqliteUserRepository::try_new(conn)?))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            "event=server_stop module=server status=error error_code=signal_failed error={}",
            err
        );
        std::future::pending::<()>().await;
    }
}
