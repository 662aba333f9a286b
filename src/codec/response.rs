//! Response decoding.

use std::net::Ipv4Addr;

use crate::core::constants::*;
use crate::core::{CodecError, MappingProtocol};

/// Decoded mapping response.
///
/// Wire format (16 bytes, big-endian):
/// ```text
/// +---------+--------+--------+-------+--------------+-------------+----------+
/// | Version | Opcode | Result | Epoch | Private port | Public port | Lifetime |
/// | 1 byte  | 1 byte | 2 bytes| 4 B   | 2 bytes      | 2 bytes     | 4 bytes  |
/// +---------+--------+--------+-------+--------------+-------------+----------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResponse {
    /// Mapping protocol answered (from the opcode with the response bit masked off).
    pub protocol: MappingProtocol,
    /// Result code (zero on success).
    pub result_code: u16,
    /// Seconds since the gateway's mapping table was last reset.
    pub epoch: u32,
    /// Private port the mapping applies to.
    pub private_port: u16,
    /// Public port assigned by the gateway.
    pub public_port: u16,
    /// Granted lifetime in seconds; zero acknowledges a delete.
    pub lifetime: u32,
}

impl MapResponse {
    /// Parse a datagram received from the gateway.
    ///
    /// Short datagrams, foreign versions and non-mapping opcodes come back as
    /// errors for which [`CodecError::is_silent_drop`] holds. A non-success
    /// result code is returned as [`CodecError::ResultCode`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < MAP_RESPONSE_SIZE {
            return Err(CodecError::TooShort {
                expected: MAP_RESPONSE_SIZE,
                actual: bytes.len(),
            });
        }

        if bytes[0] != NATPMP_VERSION {
            return Err(CodecError::UnsupportedVersion(bytes[0]));
        }

        let protocol = MappingProtocol::from_opcode(bytes[1] & !OPCODE_RESPONSE_BIT)
            .ok_or(CodecError::UnexpectedOpcode(bytes[1]))?;

        let result_code = u16::from_be_bytes([bytes[2], bytes[3]]);
        if result_code != RESULT_SUCCESS {
            return Err(CodecError::result_code(result_code));
        }

        Ok(Self {
            protocol,
            result_code,
            epoch: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            private_port: u16::from_be_bytes([bytes[8], bytes[9]]),
            public_port: u16::from_be_bytes([bytes[10], bytes[11]]),
            lifetime: u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        })
    }

    /// Serialize as the gateway would send it.
    pub fn to_bytes(&self) -> [u8; MAP_RESPONSE_SIZE] {
        let mut buf = [0u8; MAP_RESPONSE_SIZE];
        buf[0] = NATPMP_VERSION;
        buf[1] = self.protocol.opcode() | OPCODE_RESPONSE_BIT;
        buf[2..4].copy_from_slice(&self.result_code.to_be_bytes());
        buf[4..8].copy_from_slice(&self.epoch.to_be_bytes());
        buf[8..10].copy_from_slice(&self.private_port.to_be_bytes());
        buf[10..12].copy_from_slice(&self.public_port.to_be_bytes());
        buf[12..16].copy_from_slice(&self.lifetime.to_be_bytes());
        buf
    }

    /// Check if this response acknowledges a delete.
    pub fn is_delete_ack(&self) -> bool {
        self.lifetime == 0
    }
}

/// Decoded external address response.
///
/// Wire format (12 bytes): version, opcode 128, result code, epoch, IPv4 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalAddressResponse {
    /// Result code (zero on success).
    pub result_code: u16,
    /// Seconds since the gateway's mapping table was last reset.
    pub epoch: u32,
    /// The gateway's public IPv4 address.
    pub address: Ipv4Addr,
}

impl ExternalAddressResponse {
    /// Parse a datagram received from the gateway.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < EXTERNAL_ADDRESS_RESPONSE_SIZE {
            return Err(CodecError::TooShort {
                expected: EXTERNAL_ADDRESS_RESPONSE_SIZE,
                actual: bytes.len(),
            });
        }

        if bytes[0] != NATPMP_VERSION {
            return Err(CodecError::UnsupportedVersion(bytes[0]));
        }

        if bytes[1] & !OPCODE_RESPONSE_BIT != OPCODE_EXTERNAL_ADDRESS {
            return Err(CodecError::UnexpectedOpcode(bytes[1]));
        }

        let result_code = u16::from_be_bytes([bytes[2], bytes[3]]);
        if result_code != RESULT_SUCCESS {
            return Err(CodecError::result_code(result_code));
        }

        Ok(Self {
            result_code,
            epoch: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            address: Ipv4Addr::new(bytes[8], bytes[9], bytes[10], bytes[11]),
        })
    }

    /// Serialize as the gateway would send it.
    pub fn to_bytes(&self) -> [u8; EXTERNAL_ADDRESS_RESPONSE_SIZE] {
        let mut buf = [0u8; EXTERNAL_ADDRESS_RESPONSE_SIZE];
        buf[0] = NATPMP_VERSION;
        buf[1] = OPCODE_EXTERNAL_ADDRESS | OPCODE_RESPONSE_BIT;
        buf[2..4].copy_from_slice(&self.result_code.to_be_bytes());
        buf[4..8].copy_from_slice(&self.epoch.to_be_bytes());
        buf[8..12].copy_from_slice(&self.address.octets());
        buf
    }
}
