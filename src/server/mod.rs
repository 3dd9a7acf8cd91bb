//! HTTP liveness server.
//!
//! Runs on its own OS thread with a single-threaded runtime so a busy bot
//! runtime can never delay health checks.

pub mod routes;

pub use routes::{LIVENESS_BODY, create_router};

use std::future::Future;
use std::net::SocketAddr;
use std::thread::JoinHandle;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Start the liveness server with graceful shutdown support.
///
/// # Errors
/// Returns an error if the port cannot be bound or serving fails.
pub async fn run_server_with_shutdown<F>(
    port: u16,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app: Router = create_router().layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Liveness server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

/// Serve liveness on `port` from a dedicated thread for the life of the process.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn_liveness_thread(port: u16) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("liveness".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to create liveness runtime: {e}");
                    return;
                }
            };

            if let Err(e) = rt.block_on(run_server_with_shutdown(port, std::future::pending())) {
                tracing::error!("Liveness server error: {e}");
            }
        })
}
