#![forbid(unsafe_code)]

use temdb_server::config::{usage, version_line};
use temdb_server::{AppState, Command, ServerConfig, router, telemetry};
use temdb_storage::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match ServerConfig::from_process()? {
        Command::Help => {
            print!("{}", usage());
            return Ok(());
        }
        Command::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        Command::Serve(config) => config,
    };
    telemetry::init(&config).map_err(|err| err.to_string())?;

    let store = SqliteStore::open(&config.storage_dir)?;
    let app = router(AppState::new(store, &config));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        bind = %listener.local_addr()?,
        storage_dir = %config.storage_dir.display(),
        "temdb_server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("temdb_server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
