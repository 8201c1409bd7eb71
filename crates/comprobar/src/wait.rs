//! Bounded polling primitives.
//!
//! A live page changes underneath the harness, so every lookup and every
//! assertion is a retry loop: probe, check, sleep, repeat, give up at a
//! deadline. This module owns that loop's timing so each call site only
//! writes the probe and the predicate.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default timeout for resolving and asserting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default timeout for network quiescence (10 seconds; slow pages settle late)
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 10_000;

/// Timing policy for a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Total budget in milliseconds before the loop gives up
    pub timeout_ms: u64,
    /// Sleep between probes in milliseconds
    pub interval_ms: u64,
    /// Separate budget for network-idle waits in milliseconds
    pub idle_timeout_ms: u64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
        }
    }
}

impl PollPolicy {
    /// Create a policy with the default interval
    #[must_use]
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Self::default()
        }
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Set the network-idle budget
    #[must_use]
    pub const fn with_idle_timeout(mut self, idle_timeout_ms: u64) -> Self {
        self.idle_timeout_ms = idle_timeout_ms;
        self
    }

    /// Total budget as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Probe interval as a [`Duration`]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Network-idle budget as a [`Duration`]
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

/// A running deadline for one polling loop.
///
/// Call sites probe, then either return or `tick().await` until `expired()`.
#[derive(Debug)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
    interval: Duration,
}

impl Deadline {
    /// Start a deadline over the policy's main timeout
    #[must_use]
    pub fn start(policy: &PollPolicy) -> Self {
        Self {
            start: Instant::now(),
            budget: policy.timeout(),
            interval: policy.interval(),
        }
    }

    /// Start a deadline over the policy's network-idle timeout
    #[must_use]
    pub fn start_idle(policy: &PollPolicy) -> Self {
        Self {
            start: Instant::now(),
            budget: policy.idle_timeout(),
            interval: policy.interval(),
        }
    }

    /// Whether the budget is exhausted
    #[must_use]
    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    /// Time spent so far
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time spent so far, in whole milliseconds
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Sleep one probe interval
    pub async fn tick(&self) {
        tokio::time::sleep(self.interval).await;
    }
}
