//! Retransmission cadence.
//!
//! Governs when the same request is sent again; it never looks at responses.

use std::time::Duration;

use crate::core::constants::{INITIAL_RETRY_DELAY, MAX_ATTEMPTS, RETRY_BACKOFF};

/// Retry controller with exponential backoff.
///
/// Each call to [`RetryController::on_attempt`] records one transmission and
/// returns how long to wait before the next one. The wait doubles every time,
/// up to `max_attempts` transmissions.
#[derive(Debug, Clone)]
pub struct RetryController {
    /// Number of transmissions so far.
    attempts: u32,
    /// Maximum number of transmissions.
    max_attempts: u32,
    /// Wait after the next transmission.
    current_delay: Duration,
    /// Wait after the first transmission.
    initial_delay: Duration,
}

impl Default for RetryController {
    fn default() -> Self {
        Self::new(INITIAL_RETRY_DELAY, MAX_ATTEMPTS)
    }
}

impl RetryController {
    /// Create a new retry controller.
    pub fn new(initial_delay: Duration, max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            current_delay: initial_delay,
            initial_delay,
        }
    }

    /// Check if another transmission is allowed.
    pub fn should_send(&self) -> bool {
        self.attempts < self.max_attempts
    }

    /// Record a transmission and return the wait before the next one.
    pub fn on_attempt(&mut self) -> Duration {
        self.attempts += 1;

        let delay = self.current_delay;
        self.current_delay = self.current_delay.saturating_mul(RETRY_BACKOFF);
        delay
    }

    /// Reset to the initial delay.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current_delay = self.initial_delay;
    }

    /// Get the number of transmissions so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Check if every allowed transmission has been made.
    pub fn is_exhausted(&self) -> bool {
        !self.should_send()
    }

    /// Total time spent waiting if every attempt goes unanswered.
    pub fn total_delay(&self) -> Duration {
        (0..self.max_attempts).fold(Duration::ZERO, |total, n| {
            total.saturating_add(
                self.initial_delay
                    .saturating_mul(RETRY_BACKOFF.saturating_pow(n)),
            )
        })
    }
}
