//! Error types for the NAT-PMP wire codec.

use thiserror::Error;

use super::constants::*;

/// Errors produced while decoding a gateway datagram.
///
/// Structural problems (short datagram, foreign version, unknown opcode) are
/// noise on the socket and are dropped silently by the receive loop. A
/// non-success result code is a real protocol failure and is surfaced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Datagram is shorter than the fixed response layout.
    #[error("datagram too short: expected {expected} bytes, got {actual}")]
    TooShort {
        /// Minimum size for this response.
        expected: usize,
        /// Size actually received.
        actual: usize,
    },

    /// Version byte does not match [`NATPMP_VERSION`].
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    /// Opcode does not answer the request in flight.
    #[error("unexpected opcode: {0:#04x}")]
    UnexpectedOpcode(u8),

    /// Gateway replied with a non-success result code.
    #[error("gateway returned result code {code}: {description}")]
    ResultCode {
        /// Numeric result code from the response.
        code: u16,
        /// Human-readable description of `code`.
        description: &'static str,
    },
}

impl CodecError {
    /// Build the protocol failure for a result code.
    pub fn result_code(code: u16) -> Self {
        CodecError::ResultCode {
            code,
            description: describe_result_code(code),
        }
    }

    /// Check if this datagram should be discarded without ending the exchange.
    pub fn is_silent_drop(&self) -> bool {
        matches!(
            self,
            CodecError::TooShort { .. }
                | CodecError::UnsupportedVersion(_)
                | CodecError::UnexpectedOpcode(_)
        )
    }
}

/// Describe a gateway result code.
///
/// Codes past [`RESULT_UNSUPPORTED_OPCODE`] are not defined by the protocol
/// and map to a generic description.
pub fn describe_result_code(code: u16) -> &'static str {
    match code {
        RESULT_SUCCESS => "success",
        RESULT_UNSUPPORTED_VERSION => "unsupported version",
        RESULT_REFUSED => "refused (not authorized)",
        RESULT_NETWORK_FAILURE => "network failure",
        RESULT_OUT_OF_RESOURCES => "out of resources",
        RESULT_UNSUPPORTED_OPCODE => "unsupported opcode",
        _ => "unknown result code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_defined_codes() {
        assert_eq!(describe_result_code(0), "success");
        assert_eq!(describe_result_code(1), "unsupported version");
        assert_eq!(describe_result_code(2), "refused (not authorized)");
        assert_eq!(describe_result_code(3), "network failure");
        assert_eq!(describe_result_code(4), "out of resources");
        assert_eq!(describe_result_code(5), "unsupported opcode");
    }

    #[test]
    fn test_describe_out_of_range() {
        assert_eq!(describe_result_code(6), "unknown result code");
        assert_eq!(describe_result_code(u16::MAX), "unknown result code");
    }

    #[test]
    fn test_silent_drop_errors() {
        assert!(CodecError::TooShort { expected: 16, actual: 3 }.is_silent_drop());
        assert!(CodecError::UnsupportedVersion(2).is_silent_drop());
        assert!(CodecError::UnexpectedOpcode(0x81).is_silent_drop());

        assert!(!CodecError::result_code(RESULT_REFUSED).is_silent_drop());
    }

    #[test]
    fn test_result_code_message() {
        let err = CodecError::result_code(RESULT_OUT_OF_RESOURCES);
        assert_eq!(
            err.to_string(),
            "gateway returned result code 4: out of resources"
        );
    }
}
