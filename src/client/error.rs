//! Errors returned by gateway device operations.

use std::fmt;

use thiserror::Error;

use crate::core::MappingProtocol;
use crate::transport::ExchangeError;

/// The mapping operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingVerb {
    /// Creating or renewing a mapping.
    Create,
    /// Deleting a mapping.
    Delete,
}

impl fmt::Display for MappingVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingVerb::Create => f.write_str("create"),
            MappingVerb::Delete => f.write_str("delete"),
        }
    }
}

/// Errors from a NAT-PMP gateway device.
#[derive(Debug, Error)]
pub enum NatPmpError {
    /// A create or delete exchange failed.
    #[error("failed to {verb} {protocol} mapping for private port {private_port}: {source}")]
    Mapping {
        /// Operation attempted.
        verb: MappingVerb,
        /// Protocol of the mapping.
        protocol: MappingProtocol,
        /// Private port of the mapping.
        private_port: u16,
        /// Underlying exchange failure.
        #[source]
        source: ExchangeError,
    },

    /// The external address could not be obtained.
    #[error("failed to get external address: {0}")]
    ExternalAddress(#[source] ExchangeError),

    /// The protocol has no way to answer this query.
    #[error("{operation} is not supported by NAT-PMP")]
    Unsupported {
        /// Name of the unsupported operation.
        operation: &'static str,
    },
}

impl NatPmpError {
    /// The underlying exchange failure, if any.
    pub fn exchange_error(&self) -> Option<&ExchangeError> {
        match self {
            NatPmpError::Mapping { source, .. } => Some(source),
            NatPmpError::ExternalAddress(source) => Some(source),
            NatPmpError::Unsupported { .. } => None,
        }
    }

    /// Check if the operation ran out of time.
    ///
    /// Retrying later may succeed, unlike a protocol failure.
    pub fn is_timeout(&self) -> bool {
        self.exchange_error().is_some_and(ExchangeError::is_timeout)
    }

    /// Check if the gateway answered with a failure.
    pub fn is_protocol_failure(&self) -> bool {
        self.exchange_error()
            .is_some_and(ExchangeError::is_protocol_failure)
    }

    /// Check if the operation is not available over NAT-PMP.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, NatPmpError::Unsupported { .. })
    }

    /// Result code reported by the gateway, if any.
    pub fn result_code(&self) -> Option<u16> {
        self.exchange_error().and_then(ExchangeError::result_code)
    }
}

/// Result type for gateway device operations.
pub type NatPmpResult<T> = Result<T, NatPmpError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::CodecError;

    #[test]
    fn test_mapping_error_message() {
        let err = NatPmpError::Mapping {
            verb: MappingVerb::Delete,
            protocol: MappingProtocol::Tcp,
            private_port: 8080,
            source: ExchangeError::Timeout(Duration::from_secs(3)),
        };

        assert_eq!(
            err.to_string(),
            "failed to delete TCP mapping for private port 8080: no response from gateway within 3s"
        );
        assert!(err.is_timeout());
        assert!(!err.is_protocol_failure());
        assert!(!err.is_unsupported());
    }

    #[test]
    fn test_protocol_failure_classification() {
        let err = NatPmpError::Mapping {
            verb: MappingVerb::Create,
            protocol: MappingProtocol::Udp,
            private_port: 1234,
            source: CodecError::result_code(2).into(),
        };

        assert!(err.is_protocol_failure());
        assert!(!err.is_timeout());
        assert_eq!(err.result_code(), Some(2));
    }

    #[test]
    fn test_unsupported() {
        let err = NatPmpError::Unsupported {
            operation: "all_mappings",
        };

        assert!(err.is_unsupported());
        assert!(err.exchange_error().is_none());
        assert_eq!(err.to_string(), "all_mappings is not supported by NAT-PMP");
    }
}
