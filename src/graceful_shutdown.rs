//! Graceful shutdown

use std::future::pending;

use tokio::signal;

/// Handler for graceful shutdown
///
/// Resolves on Ctrl+C or SIGTERM, open requests are finished by the server afterwards.
/// A signal that can not be listened to never resolves.
pub async fn handler() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Could not listen to Ctrl+C: {err}");

            pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                tracing::error!("Could not listen to SIGTERM: {err}");

                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    let received = tokio::select! {
        () = ctrl_c => "Ctrl+C",
        () = terminate => "SIGTERM",
    };

    tracing::info!("{received} received, starting graceful shutdown");
}
