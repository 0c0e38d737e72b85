//! Bounded polling at the driver round-trip boundary.

use std::time::{Duration, Instant};

use tracing::trace;

use uimap_core::{DriverSettings, Result};

/// How long, and how often, to retry a driver query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Maximum time to wait
    pub timeout: Duration,
    /// Delay between attempts
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::from_settings(&DriverSettings::default())
    }
}

impl WaitPolicy {
    /// Policy from the `driver` configuration section.
    pub fn from_settings(settings: &DriverSettings) -> Self {
        Self {
            timeout: Duration::from_millis(settings.explicit_wait_ms),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        }
    }

    /// Single attempt, no waiting.
    pub fn immediate() -> Self {
        Self {
            timeout: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
        }
    }

    /// Set timeout duration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Call `attempt` until it yields a value or the timeout is reached.
    ///
    /// Always attempts at least once. Errors from `attempt` are returned
    /// immediately.
    pub fn poll<T, F>(&self, mut attempt: F) -> Result<Option<T>>
    where
        F: FnMut() -> Result<Option<T>>,
    {
        let start = Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            if let Some(value) = attempt()? {
                return Ok(Some(value));
            }
            if start.elapsed() >= self.timeout {
                trace!("gave up after {} attempts", attempts);
                return Ok(None);
            }
            std::thread::sleep(self.poll_interval);
        }
    }
}
