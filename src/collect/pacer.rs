//! Fixed spacing between sequential collection calls.
//!
//! The collection stage is single-threaded, so unlike a shared per-domain
//! limiter the pacer needs no locking: it is owned by the collection context
//! and borrowed mutably for each call.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Enforces a minimum gap between consecutive calls.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    last_call: Option<Instant>,
}

impl Pacer {
    /// Creates a pacer with the given minimum gap.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_call: None,
        }
    }

    /// Configured gap.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until the gap since the previous call has elapsed, then records this call.
    ///
    /// The first call proceeds immediately.
    pub async fn acquire(&mut self) {
        if let Some(last_call) = self.last_call {
            let elapsed = last_call.elapsed();
            if elapsed < self.delay {
                let wait = self.delay.saturating_sub(elapsed);
                trace!(wait_ms = wait.as_millis(), "pacing collection call");
                tokio::time::sleep(wait).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}
