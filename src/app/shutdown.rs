//! Graceful shutdown handling.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `token` on ctrl-c or, on unix, SIGTERM.
pub async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("Received ctrl-c, shutting down"),
        _ = terminate => log::info!("Received SIGTERM, shutting down"),
        _ = token.cancelled() => return,
    }
    token.cancel();
}

/// Shuts down all background tasks gracefully.
///
/// Cancels `cancel` and waits for every task to observe it. The producer
/// exits at its next suspension point, so a pending names call is dropped.
pub async fn shutdown_gracefully(cancel: CancellationToken, tasks: Vec<JoinHandle<()>>) {
    cancel.cancel();
    for result in futures::future::join_all(tasks).await {
        if let Err(join_error) = result {
            log::warn!("Background task panicked: {:?}", join_error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_gracefully_waits_for_tasks() {
        let cancel = CancellationToken::new();
        let child = cancel.child_token();
        let task = tokio::spawn(async move { child.cancelled().await });

        shutdown_gracefully(cancel.clone(), vec![task]).await;
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_shutdown_gracefully_survives_panicked_task() {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(async { panic!("boom") });
        shutdown_gracefully(cancel, vec![task]).await;
    }

    #[tokio::test]
    async fn test_cancel_on_signal_returns_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        cancel_on_signal(token).await;
    }
}
