//! Relay timing configuration.

use std::time::Duration;

/// How often the monitoring task re-checks the timeout condition.
/// Bounds the worst-case latency between a timeout elapsing and the
/// pin going low.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(45);

/// How long the foreground `Off` path waits for the monitoring task to
/// observe a cancellation before forcing the pin low itself.
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_millis(50);

/// Pause between a direct pin write and the confirming read, giving the
/// hardware time to settle.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(5);

/// Timing knobs for a [`Relay`](crate::Relay).
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Monitoring loop tick.
    pub poll_interval: Duration,

    /// Bounded wait after signalling a cancellation.
    pub cancel_grace: Duration,

    /// Settle time between a direct write and its confirming read.
    pub settle_delay: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel_grace: DEFAULT_CANCEL_GRACE,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl RelayConfig {
    /// Set the monitoring loop tick.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the cancellation grace period.
    pub fn with_cancel_grace(mut self, cancel_grace: Duration) -> Self {
        self.cancel_grace = cancel_grace;
        self
    }

    /// Set the settle delay for direct writes.
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = RelayConfig::default();
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.cancel_grace, DEFAULT_CANCEL_GRACE);
        assert_eq!(config.settle_delay, DEFAULT_SETTLE_DELAY);
    }

    #[test]
    fn builders_override_one_field_at_a_time() {
        let config = RelayConfig::default()
            .with_poll_interval(Duration::from_millis(10))
            .with_cancel_grace(Duration::from_millis(20));
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.cancel_grace, Duration::from_millis(20));
        assert_eq!(config.settle_delay, DEFAULT_SETTLE_DELAY);
    }
}
