//! The port mapping record shared between the caller and the gateway device.

use std::fmt;
use std::time::{Duration, SystemTime};

use super::constants::{OPCODE_MAP_TCP, OPCODE_MAP_UDP};

/// Transport protocol of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingProtocol {
    /// TCP mapping.
    Tcp,
    /// UDP mapping.
    Udp,
}

impl MappingProtocol {
    /// Request opcode for creating or deleting a mapping of this protocol.
    pub fn opcode(self) -> u8 {
        match self {
            MappingProtocol::Tcp => OPCODE_MAP_TCP,
            MappingProtocol::Udp => OPCODE_MAP_UDP,
        }
    }

    /// Parse a base (request) opcode.
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            OPCODE_MAP_TCP => Some(MappingProtocol::Tcp),
            OPCODE_MAP_UDP => Some(MappingProtocol::Udp),
            _ => None,
        }
    }
}

impl fmt::Display for MappingProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingProtocol::Tcp => f.write_str("TCP"),
            MappingProtocol::Udp => f.write_str("UDP"),
        }
    }
}

/// Key identifying a mapping on one gateway.
pub type MappingKey = (MappingProtocol, u16);

/// A private-to-public port translation maintained by the gateway.
///
/// The public port and expiration are only meaningful after a create exchange
/// has been accepted; a delete exchange never writes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    protocol: MappingProtocol,
    private_port: u16,
    public_port: u16,
    lifetime: u32,
    expiration: Option<SystemTime>,
}

impl Mapping {
    /// Create a mapping request with no preferred public port.
    pub fn new(protocol: MappingProtocol, private_port: u16, lifetime: u32) -> Self {
        Self {
            protocol,
            private_port,
            public_port: 0,
            lifetime,
            expiration: None,
        }
    }

    /// Ask the gateway for a specific public port.
    pub fn with_public_port(mut self, public_port: u16) -> Self {
        self.public_port = public_port;
        self
    }

    /// Mapping protocol.
    pub fn protocol(&self) -> MappingProtocol {
        self.protocol
    }

    /// Port on the local host.
    pub fn private_port(&self) -> u16 {
        self.private_port
    }

    /// Port on the gateway's public address (requested, or assigned once created).
    pub fn public_port(&self) -> u16 {
        self.public_port
    }

    /// Requested lifetime in seconds.
    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    /// Change the requested lifetime for the next exchange.
    pub fn set_lifetime(&mut self, lifetime: u32) {
        self.lifetime = lifetime;
    }

    /// When the gateway will drop the mapping, if it has been created.
    pub fn expiration(&self) -> Option<SystemTime> {
        self.expiration
    }

    /// Registry key for this mapping.
    pub fn key(&self) -> MappingKey {
        (self.protocol, self.private_port)
    }

    /// Time left before the gateway drops the mapping.
    ///
    /// Returns `None` if the mapping was never created.
    pub fn remaining_lifetime(&self) -> Option<Duration> {
        self.expiration.map(|expiration| {
            expiration
                .duration_since(SystemTime::now())
                .unwrap_or(Duration::ZERO)
        })
    }

    /// Check if a created mapping has passed its expiration.
    pub fn is_expired(&self) -> bool {
        self.remaining_lifetime() == Some(Duration::ZERO)
    }

    /// Fold an accepted create response into the mapping.
    pub(crate) fn apply_created(
        &mut self,
        protocol: MappingProtocol,
        public_port: u16,
        lifetime: u32,
        now: SystemTime,
    ) {
        self.protocol = protocol;
        self.public_port = public_port;
        self.expiration = Some(now + Duration::from_secs(u64::from(lifetime)));
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.protocol, self.private_port, self.public_port
        )
    }
}
