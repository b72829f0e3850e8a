//! Politeness delay between reader requests
//!
//! Each pause is drawn uniformly from `[min_delay, max_delay]` seconds. The
//! coordinator skips the pause after the last URL of a run.

use crate::config::CrawlConfig;
use rand::Rng;
use std::time::Duration;

/// Randomized delay policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayPolicy {
    min_secs: f64,
    max_secs: f64,
}

impl DelayPolicy {
    /// Creates a policy from bounds in seconds
    ///
    /// Bounds are assumed to be validated (finite, non-negative, min <= max).
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(config.min_delay, config.max_delay)
    }

    /// A policy that never waits
    pub fn none() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Draws the next pause
    pub fn next_delay(&self) -> Duration {
        let secs = if self.max_secs > self.min_secs {
            rand::thread_rng().gen_range(self.min_secs..=self.max_secs)
        } else {
            self.min_secs
        };

        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::ZERO)
    }

    /// Sleeps for a freshly drawn pause
    pub async fn pause(&self) -> Duration {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::info!("Waiting {:.2} seconds before next request", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
