//! Randomized pauses between browser actions.
//!
//! Pauses only pace requests to look less mechanical; they are not a
//! backpressure mechanism and cannot be cancelled.

use jobscout_core::DelayBounds;
use rand::Rng;
use std::time::Duration;

/// Draw a uniformly random duration within `bounds`.
pub fn sample_delay(bounds: DelayBounds) -> Duration {
    if bounds.max_ms == 0 {
        return Duration::ZERO;
    }
    let (low, high) = if bounds.min_ms <= bounds.max_ms {
        (bounds.min_ms, bounds.max_ms)
    } else {
        (bounds.max_ms, bounds.min_ms)
    };
    Duration::from_millis(rand::thread_rng().gen_range(low..=high))
}

/// Sleep for a random duration within `bounds`.
pub async fn human_pause(bounds: DelayBounds) {
    let delay = sample_delay(bounds);
    if delay.is_zero() {
        return;
    }
    tracing::trace!("Pausing for {:?}", delay);
    tokio::time::sleep(delay).await;
}
