#![doc = include_str!("../README.md")]

mod server;

use clap::Parser;
use pwhash::HashService;
use server::config::{CliArgs, ServerConfig};
use server::service::handler::router;
use server::telemetry::init_telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    init_telemetry()?;

    let listener = TcpListener::bind(config.server_addr).await?;
    log_startup_info(&config);

    let service = HashService::new(config.service_config());
    tokio::spawn(shutdown_signal(Arc::clone(service.coordinator())));

    run_server(listener, service).await?;

    tracing::info!("Server shutdown gracefully");
    Ok(())
}

/// Serves `service` on `listener` until its shutdown coordinator stops.
///
/// The coordinator's drain runs on its own task. The listener is only
/// released once every in-flight digest has been stored (or the configured
/// drain limit has elapsed). Submissions that raced the end of the drain are
/// waited for before returning.
async fn run_server(listener: TcpListener, service: HashService) -> anyhow::Result<()> {
    let coordinator = Arc::clone(service.coordinator());
    let tracked = service.clone();

    let drain = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.run().await })
    };

    axum::serve(listener, router(service))
        .with_graceful_shutdown(coordinator.stopped())
        .await?;

    match drain.await? {
        Ok(()) => {
            if tracked.outstanding() > 0 {
                tracing::info!(
                    "Waiting for {} late digest(s) accepted during shutdown",
                    tracked.outstanding()
                );
                tracked.await_outstanding().await;
            }
        }
        Err(e) => tracing::warn!("Stopped before every digest completed: {e}"),
    }
    Ok(())
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting hash service on {} with full config: {:#?}",
            config.server_addr,
            config
        );
    } else {
        tracing::info!(
            "Starting hash service on {} (digest delay {:?})",
            config.server_addr,
            config.hash_delay
        );
    }
}

async fn shutdown_signal(coordinator: Arc<pwhash::ShutdownCoordinator>) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
        () = coordinator.triggered() => return,
    }

    tracing::info!("Shutdown signal received, draining in-flight digests...");
    coordinator.trigger();
}
