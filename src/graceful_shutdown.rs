//! Graceful shutdown

use tokio::signal;

/// Handler for graceful shutdown
///
/// Resolves on Ctrl+C, or on SIGTERM on Unix. Requests in flight, like an inbound message
/// waiting on the provider, are allowed to finish.
pub async fn handler() {
    let interrupt = async {
        signal::ctrl_c().await.expect("Valid Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Valid terminate handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = interrupt => "interrupt",
        () = terminate => "terminate",
    };

    tracing::info!("Received {signal} signal, shutting down");
}
