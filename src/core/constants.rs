//! Protocol constants from RFC 6886.
//!
//! These values are fixed by the protocol and MUST NOT be changed.

use std::time::Duration;

// =============================================================================
// ENDPOINT
// =============================================================================

/// Well-known UDP port the gateway listens on.
pub const NATPMP_PORT: u16 = 5351;

/// Protocol version carried in the first byte of every message.
pub const NATPMP_VERSION: u8 = 0;

// =============================================================================
// OPCODES
// =============================================================================

/// Request the gateway's external address.
pub const OPCODE_EXTERNAL_ADDRESS: u8 = 0;

/// Create or delete a UDP mapping.
pub const OPCODE_MAP_UDP: u8 = 1;

/// Create or delete a TCP mapping.
pub const OPCODE_MAP_TCP: u8 = 2;

/// Set on the opcode of every response (request opcode + 128).
pub const OPCODE_RESPONSE_BIT: u8 = 0x80;

// =============================================================================
// RESULT CODES
// =============================================================================

/// Request succeeded.
pub const RESULT_SUCCESS: u16 = 0;

/// Gateway does not speak this protocol version.
pub const RESULT_UNSUPPORTED_VERSION: u16 = 1;

/// Gateway supports mapping but it is disabled or the request was refused.
pub const RESULT_REFUSED: u16 = 2;

/// Gateway has no external connectivity (e.g. no DHCP lease).
pub const RESULT_NETWORK_FAILURE: u16 = 3;

/// Gateway cannot create any more mappings.
pub const RESULT_OUT_OF_RESOURCES: u16 = 4;

/// Gateway does not understand the opcode.
pub const RESULT_UNSUPPORTED_OPCODE: u16 = 5;

// =============================================================================
// MESSAGE SIZES
// =============================================================================

/// Mapping request size (version + opcode + reserved + ports + lifetime).
pub const MAP_REQUEST_SIZE: usize = 12;

/// Minimum mapping response size.
pub const MAP_RESPONSE_SIZE: usize = 16;

/// External address request size (version + opcode).
pub const EXTERNAL_ADDRESS_REQUEST_SIZE: usize = 2;

/// Minimum external address response size.
pub const EXTERNAL_ADDRESS_RESPONSE_SIZE: usize = 12;

/// Receive buffer large enough for any NAT-PMP datagram.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 1100;

// =============================================================================
// TIMING
// =============================================================================

/// Delay before the first retransmission; doubled after every attempt.
pub const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Maximum number of times a request is sent.
pub const MAX_ATTEMPTS: u32 = 9;

/// Retry backoff multiplier.
pub const RETRY_BACKOFF: u32 = 2;

/// Absolute deadline for one operation, covering every attempt and the receive.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(3);
