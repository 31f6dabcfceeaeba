//! Fixed pause between consecutive external calls.

use std::time::Duration;
use tokio::time::sleep;

/// Courtesy rate limit for the catalog and image hosts.
///
/// A zero delay disables pausing entirely, which is what tests use.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for the configured delay.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}
