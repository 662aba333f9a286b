//! Gateway device configuration.

use std::net::SocketAddr;
use std::time::Duration;

use crate::core::constants::{
    DEFAULT_RECV_BUFFER_SIZE, INITIAL_RETRY_DELAY, MAX_ATTEMPTS, OPERATION_TIMEOUT,
};
use crate::transport::{Exchange, RetryController};

/// Timing and buffer settings shared by every operation on one device.
///
/// Defaults are the RFC 6886 values. Settings are fixed when the device is
/// built; individual calls cannot override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatPmpConfig {
    /// Maximum number of times a request is sent.
    pub max_attempts: u32,

    /// Wait after the first transmission; doubled after each one.
    pub initial_retry_delay: Duration,

    /// Absolute deadline for one operation.
    pub operation_timeout: Duration,

    /// Receive buffer size.
    pub recv_buffer_size: usize,
}

impl Default for NatPmpConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_retry_delay: INITIAL_RETRY_DELAY,
            operation_timeout: OPERATION_TIMEOUT,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

impl NatPmpConfig {
    /// Create a config builder.
    pub fn builder() -> NatPmpConfigBuilder {
        NatPmpConfigBuilder::new()
    }

    /// Fresh retry controller for one exchange.
    pub fn retry_controller(&self) -> RetryController {
        RetryController::new(self.initial_retry_delay, self.max_attempts)
    }

    /// Build an exchange with these settings.
    pub(crate) fn exchange(&self, gateway: SocketAddr) -> Exchange {
        Exchange::new(gateway)
            .retry(self.retry_controller())
            .timeout(self.operation_timeout)
            .recv_buffer_size(self.recv_buffer_size)
    }
}

/// Builder for [`NatPmpConfig`].
#[derive(Debug)]
pub struct NatPmpConfigBuilder {
    config: NatPmpConfig,
}

impl NatPmpConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: NatPmpConfig::default(),
        }
    }

    /// Set the maximum number of transmissions (at least one).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts.max(1);
        self
    }

    /// Set the wait after the first transmission.
    pub fn initial_retry_delay(mut self, delay: Duration) -> Self {
        self.config.initial_retry_delay = delay;
        self
    }

    /// Set the absolute deadline for one operation.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.config.operation_timeout = timeout;
        self
    }

    /// Set the receive buffer size.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.config.recv_buffer_size = size;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> NatPmpConfig {
        self.config
    }
}

impl Default for NatPmpConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NatPmpConfig::default();
        assert_eq!(config.max_attempts, 9);
        assert_eq!(config.initial_retry_delay, Duration::from_millis(250));
        assert_eq!(config.operation_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_builder() {
        let config = NatPmpConfig::builder()
            .max_attempts(4)
            .initial_retry_delay(Duration::from_millis(10))
            .operation_timeout(Duration::from_millis(500))
            .recv_buffer_size(64)
            .build();

        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.initial_retry_delay, Duration::from_millis(10));
        assert_eq!(config.operation_timeout, Duration::from_millis(500));
        assert_eq!(config.recv_buffer_size, 64);
    }

    #[test]
    fn test_at_least_one_attempt() {
        let config = NatPmpConfig::builder().max_attempts(0).build();
        assert_eq!(config.max_attempts, 1);
    }

    #[test]
    fn test_retry_controller_follows_config() {
        let config = NatPmpConfig::builder()
            .max_attempts(2)
            .initial_retry_delay(Duration::from_millis(100))
            .build();

        let mut retry = config.retry_controller();
        assert_eq!(retry.on_attempt(), Duration::from_millis(100));
        assert_eq!(retry.on_attempt(), Duration::from_millis(200));
        assert!(retry.is_exhausted());
    }
}
