//! Global interval gate for outbound stats API traffic.
//!
//! The provider quota is a per-account budget, not per resource, so the gate
//! enforces a minimum spacing between *consecutive requests to the API*,
//! regardless of which endpoint or key they target. Callers await the gate
//! instead of blocking a thread; while one task sleeps inside the gate,
//! later callers queue on the lock behind it.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

/// Serializes callers so consecutive requests stay `min_gap` apart.
#[derive(Debug)]
pub struct IntervalGate {
    min_gap: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl IntervalGate {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until a request slot is available, then claim it.
    ///
    /// The first caller passes immediately. Each subsequent caller sleeps
    /// out the remainder of the gap since the previous claim. The lock is
    /// held across the sleep on purpose: that is what serializes a burst of
    /// concurrent callers into evenly spaced requests.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_gap {
                let remaining = self.min_gap - elapsed;
                debug!(?remaining, "rate gate: waiting for next request slot");
                sleep(remaining).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_call_passes_immediately() {
        let gate = IntervalGate::new(Duration::from_millis(500));
        let t0 = Instant::now();
        gate.wait().await;
        assert!(t0.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_consecutive_calls_are_spaced() {
        let gate = IntervalGate::new(Duration::from_millis(50));
        let t0 = Instant::now();
        gate.wait().await;
        gate.wait().await;
        assert!(t0.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_spacing_is_global_not_per_key() {
        // Three queued callers take at least two full gaps regardless of
        // what they are about to request.
        let gate = IntervalGate::new(Duration::from_millis(30));
        let t0 = Instant::now();
        gate.wait().await;
        gate.wait().await;
        gate.wait().await;
        assert!(t0.elapsed() >= Duration::from_millis(60));
    }
}
