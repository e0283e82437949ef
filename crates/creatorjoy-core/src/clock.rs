//! Strictly increasing timestamps for record creation.
//!
//! Two profiles created in the same clock tick would otherwise tie on
//! `created_at`, and "most recently created first" would stop being a total
//! order.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

/// Hands out UTC timestamps that never repeat or go backwards.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    /// Create a clock with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current time, nudged forward by a nanosecond if it does not
    /// come after the last timestamp handed out.
    pub async fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().await;
        let mut now = Utc::now();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::nanoseconds(1);
            }
        }
        *last = Some(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timestamps_strictly_increase() {
        let clock = MonotonicClock::new();
        let mut prev = clock.now().await;
        for _ in 0..1000 {
            let next = clock.now().await;
            assert!(next > prev);
            prev = next;
        }
    }
}
