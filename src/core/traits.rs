//! Core traits for port-mapping gateways.
//!
//! NAT-PMP is one implementation; other transports (such as UPnP IGD) plug in
//! behind the same interface.

use std::future::Future;
use std::net::IpAddr;

use super::mapping::{Mapping, MappingProtocol};

/// A gateway that can open and close port mappings for this host.
///
/// # Requirements
///
/// - `create_mapping` MUST only mutate the mapping when the gateway accepted it
/// - `delete_mapping` MUST NOT write a public port or expiration
/// - Queries the protocol cannot answer MUST fail, never return an empty success
pub trait PortMapper: Send + Sync {
    /// Error returned by every operation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Ask the gateway to create (or renew) a mapping.
    ///
    /// On success the mapping carries the assigned public port and expiration.
    fn create_mapping(
        &self,
        mapping: &mut Mapping,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Ask the gateway to remove a mapping.
    fn delete_mapping(
        &self,
        mapping: &mut Mapping,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// The gateway's public address.
    fn external_address(&self) -> impl Future<Output = Result<IpAddr, Self::Error>> + Send;

    /// Every mapping the gateway currently holds.
    fn all_mappings(&self) -> impl Future<Output = Result<Vec<Mapping>, Self::Error>> + Send;

    /// The mapping the gateway holds for a protocol and public port.
    fn specific_mapping(
        &self,
        protocol: MappingProtocol,
        public_port: u16,
    ) -> impl Future<Output = Result<Mapping, Self::Error>> + Send;
}
