//! Graceful shutdown signal handling.
//!
//! Produces a future that resolves when the process should stop accepting
//! connections, for `axum::serve(..).with_graceful_shutdown()`. Both
//! listeners share the signal, so one Ctrl+C stops the emulation and
//! passthrough servers together.

/// Resolves when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for SIGINT: {e}");
        }
    };

    #[cfg(unix)]
    {
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    tracing::error!("failed to listen for SIGTERM: {e}");
                }
            }
        };

        tokio::select! {
            () = ctrl_c => {
                tracing::info!("received SIGINT, shutting down");
            }
            () = terminate => {
                tracing::info!("received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        tracing::info!("received Ctrl+C, shutting down");
    }
}
