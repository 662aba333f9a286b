//! Transport layer error types.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::core::CodecError;

/// Errors that end one request/response exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Gateway replied with a non-success result code.
    #[error("protocol failure: {0}")]
    Protocol(#[from] CodecError),

    /// I/O error (socket operations).
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// No accepted response before the deadline.
    #[error("no response from gateway within {0:?}")]
    Timeout(Duration),
}

impl ExchangeError {
    /// Check if the exchange ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::Timeout(_))
    }

    /// Check if the gateway answered with a failure.
    pub fn is_protocol_failure(&self) -> bool {
        matches!(self, ExchangeError::Protocol(_))
    }

    /// Result code reported by the gateway, if any.
    pub fn result_code(&self) -> Option<u16> {
        match self {
            ExchangeError::Protocol(CodecError::ResultCode { code, .. }) => Some(*code),
            _ => None,
        }
    }
}

/// Result type for exchanges.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_not_protocol_failure() {
        let err = ExchangeError::Timeout(Duration::from_secs(3));
        assert!(err.is_timeout());
        assert!(!err.is_protocol_failure());
        assert_eq!(err.result_code(), None);
    }

    #[test]
    fn test_protocol_failure_carries_code() {
        let err = ExchangeError::from(CodecError::result_code(3));
        assert!(err.is_protocol_failure());
        assert!(!err.is_timeout());
        assert_eq!(err.result_code(), Some(3));
    }

    #[test]
    fn test_io_error() {
        let err = ExchangeError::from(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(!err.is_timeout());
        assert!(!err.is_protocol_failure());
        assert_eq!(err.result_code(), None);
    }
}
