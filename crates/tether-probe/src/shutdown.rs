//! Graceful shutdown.
//!
//! ```text
//!   Ctrl-C ──► facade.close(drain) ──► status CLOSING, /health 503
//!                     │
//!                     ▼  drain window elapses
//!              status CLOSED ──► server stops accepting
//! ```

use std::time::Duration;

use tether_control::{CloseOptions, Facade, Lifecycle};

use crate::upstream::Upstream;

/// Close the facade, waiting out the drain window.
///
/// # Errors
///
/// Returns the close override's error, if any. The facade then stays
/// `CLOSING`.
pub async fn drain(facade: &Facade<Upstream>, delay: Duration) -> tether_control::Result<()> {
    tracing::info!(facade_id = %facade.id(), delay = ?delay, "Draining facade");
    facade.close(CloseOptions::with_delay(delay)).await?;
    tracing::info!(facade_id = %facade.id(), status = %facade.status(), "Facade closed");
    Ok(())
}

/// Resolve once Ctrl-C is received and the facade has drained.
///
/// Intended for `axum::serve(..).with_graceful_shutdown(..)`.
pub async fn shutdown_signal(facade: Facade<Upstream>, delay: Duration) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");

    if let Err(err) = drain(&facade, delay).await {
        tracing::error!(error = %err, "Facade failed to close");
    }
}

#[cfg(test)]
mod tests {
    use tether_control::Status;

    use super::*;
    use crate::config::ProbeConfig;
    use crate::upstream::build_facade;

    #[tokio::test(start_paused = true)]
    async fn drain_reports_closing_until_the_window_passes() {
        let config = ProbeConfig::default();
        let facade = build_facade(Upstream::new(&config).unwrap(), &config).unwrap();

        let draining = facade.clone();
        let task = tokio::spawn(async move { drain(&draining, Duration::from_secs(5)).await });
        tokio::task::yield_now().await;

        assert_eq!(facade.status(), Status::Closing);
        assert!(!facade.is_healthy().await.unwrap());

        task.await.unwrap().unwrap();
        assert_eq!(facade.status(), Status::Closed);
    }
}
