//! HTTP surface of the service.
//!
//! Provides three endpoints:
//! - `/` - one joke per request, built around the next prefetched name
//! - `/status` - JSON snapshot of the queue and pipeline counters
//! - `/metrics` - Prometheus-compatible metrics
//!
//! Each connection is served by hyper's HTTP/1 builder so that a client which
//! never finishes its request head, or idles on a keep-alive connection, is
//! dropped after the header read timeout. Handlers that outlive the request
//! timeout are answered with 408. When the shutdown token fires the server
//! stops accepting and drains in-flight requests.

mod handlers;
mod types;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerTimeouts;
use handlers::{joke_handler, metrics_handler, status_handler};
pub use handlers::render_metrics;
pub use types::{AppState, NameCounts, QueueStatus, RequestCounts, StatusResponse};

/// Builds the router with all endpoints bound to `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(joke_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Binds the listening socket on all interfaces.
pub async fn bind(port: u16) -> Result<TcpListener, anyhow::Error> {
    TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind server to port {}: {}", port, e))
}

/// Serves requests on `listener` until `shutdown` is cancelled.
///
/// Returns after every open connection has finished its in-flight request.
pub async fn start_server(
    listener: TcpListener,
    state: AppState,
    timeouts: ServerTimeouts,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let addr = listener
        .local_addr()
        .map_err(|e| anyhow::anyhow!("Failed to read listener address: {}", e))?;

    log::info!("Listening on http://{}/", addr);
    log::info!("  - Metrics: http://{}/metrics", addr);
    log::info!("  - Status: http://{}/status", addr);
    log::debug!(
        "Header read timeout {:?}, request timeout {:?}",
        timeouts.header_read,
        timeouts.request
    );

    let app = build_router(state).layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        timeouts.request,
    ));

    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    log::trace!("Accepted connection from {}", peer);
                    connections.spawn(serve_connection(
                        stream,
                        app.clone(),
                        timeouts,
                        shutdown.clone(),
                    ));
                }
                // Per-connection failures (e.g. the peer reset before accept)
                Err(e) => log::warn!("Failed to accept connection: {}", e),
            },
            // Reap finished connections so the set does not grow without bound
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(listener);
    log::info!("Draining {} open connection(s)", connections.len());
    while connections.join_next().await.is_some() {}

    log::info!("Server stopped");
    Ok(())
}

/// Runs one HTTP/1 connection until the peer closes it, a timeout fires, or
/// shutdown completes the request in flight.
async fn serve_connection(
    stream: TcpStream,
    app: Router,
    timeouts: ServerTimeouts,
    shutdown: CancellationToken,
) {
    let io = TokioIo::new(stream);
    let service = TowerToHyperService::new(app);

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(timeouts.header_read)
        .keep_alive(true);

    let conn = builder.serve_connection(io, service);
    tokio::pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        _ = shutdown.cancelled() => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };

    // Timeouts and client disconnects land here
    if let Err(e) = result {
        log::debug!("Connection closed with error: {}", e);
    }
}
