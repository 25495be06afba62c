//! Outbound call rate gate.
//!
//! Serializes access to the Riot API so the aggregate call rate never
//! exceeds the configured budget: at most `max_calls` admissions per
//! sliding `window`. Callers block in [`RateGate::acquire`] until a permit
//! frees up or their cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Error returned when an [`RateGate::acquire`] wait is cancelled.
#[derive(Debug, thiserror::Error)]
#[error("rate gate acquire cancelled")]
pub struct GateCancelled;

/// Bounded-budget admission gate for outbound API calls.
///
/// Backed by a `tokio::sync::Semaphore`, whose waiter queue is FIFO, so
/// admission order is approximately arrival order and no caller starves.
/// Each admission schedules its permit to return after `window` elapses,
/// which bounds the call rate to `max_calls` per window.
///
/// The gate only paces outbound calls; if the upstream still answers with
/// a 429, backing off and retrying that call is the caller's concern.
#[derive(Debug)]
pub struct RateGate {
    permits: Arc<Semaphore>,
    window: Duration,
}

impl RateGate {
    /// Create a gate admitting at most `max_calls` per `window`.
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_calls)),
            window,
        }
    }

    /// Block until a call slot is available, or fail with [`GateCancelled`]
    /// if `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), GateCancelled> {
        let permit = tokio::select! {
            permit = self.permits.clone().acquire_owned() => {
                match permit {
                    Ok(p) => p,
                    // The semaphore is never closed; treat it as cancellation
                    // rather than panicking.
                    Err(_) => return Err(GateCancelled),
                }
            }
            _ = cancel.cancelled() => return Err(GateCancelled),
        };

        // Consume the permit now and give it back once the window has
        // passed, so the budget is a sliding per-window count rather than
        // a concurrency limit.
        permit.forget();

        let permits = Arc::clone(&self.permits);
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            permits.add_permits(1);
            trace!("rate gate permit returned");
        });

        Ok(())
    }

    /// Number of call slots currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
