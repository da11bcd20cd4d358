//! The single cancellation token that propagates from process root into
//! every long-lived loop (readers, worker-pool shards, batch-writer
//! shards). There is no hidden background task tied to any object's
//! `Drop` impl — cancellation is always explicit.

use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Returns a fresh root token. Clone it into every task that needs to
/// observe shutdown; call [`trigger_on_signal`] once from `main`.
pub fn root_token() -> CancellationToken {
    CancellationToken::new()
}

/// Waits for SIGINT/SIGTERM (or just Ctrl-C on platforms without the
/// `unix` signal API) and cancels `token` when either fires.
pub async fn trigger_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }

    log::info!("shutdown signal received, cancelling root token");
    token.cancel();
}
