//! NAT-PMP gateway device.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::SystemTime;

use tokio::sync::{Mutex, RwLock};
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use super::config::NatPmpConfig;
use super::error::{MappingVerb, NatPmpError, NatPmpResult};
use crate::codec::{
    ExternalAddressResponse, MapResponse, encode_external_address_request, encode_map_request,
};
use crate::core::constants::NATPMP_PORT;
use crate::core::{CodecError, Mapping, MappingKey, MappingProtocol, PortMapper};
use crate::transport::{ExchangeError, ExchangeResult};

/// A gateway reachable over NAT-PMP.
///
/// Built from the addresses found by gateway discovery. Every operation opens
/// its own socket, and operations are serialized: the protocol carries no
/// transaction identifier, so overlapping exchanges could take each other's
/// responses.
///
/// # Example
///
/// ```no_run
/// use natpmp_client::client::NatPmpDevice;
/// use natpmp_client::core::{Mapping, MappingProtocol};
///
/// # async fn example() -> Result<(), natpmp_client::client::NatPmpError> {
/// let device = NatPmpDevice::new(
///     "192.168.1.1".parse().unwrap(),
///     "192.168.1.20".parse().unwrap(),
///     "203.0.113.7".parse().unwrap(),
/// );
///
/// let mut mapping = Mapping::new(MappingProtocol::Tcp, 8080, 3600);
/// device.create_mapping(&mut mapping).await?;
/// println!("public port {}", mapping.public_port());
///
/// device.delete_mapping(&mut mapping).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NatPmpDevice {
    /// Gateway endpoint.
    gateway: SocketAddr,
    /// Address of the local interface facing the gateway.
    local_address: IpAddr,
    /// Public address last reported by the gateway.
    public_address: RwLock<IpAddr>,
    /// Mappings created through this device and not yet deleted.
    active_mappings: RwLock<HashMap<MappingKey, Mapping>>,
    /// Held for the duration of each exchange.
    exchange_lock: Mutex<()>,
    /// Timing settings.
    config: NatPmpConfig,
}

impl NatPmpDevice {
    /// Create a device for the gateway at `gateway` on the NAT-PMP port.
    pub fn new(gateway: IpAddr, local_address: IpAddr, public_address: IpAddr) -> Self {
        Self {
            gateway: SocketAddr::new(gateway, NATPMP_PORT),
            local_address,
            public_address: RwLock::new(public_address),
            active_mappings: RwLock::new(HashMap::new()),
            exchange_lock: Mutex::new(()),
            config: NatPmpConfig::default(),
        }
    }

    /// Use custom timing settings.
    pub fn with_config(mut self, config: NatPmpConfig) -> Self {
        self.config = config;
        self
    }

    /// Talk to the gateway on a port other than [`NATPMP_PORT`].
    pub fn with_gateway_port(mut self, port: u16) -> Self {
        self.gateway.set_port(port);
        self
    }

    /// Gateway endpoint.
    pub fn gateway(&self) -> SocketAddr {
        self.gateway
    }

    /// Address of the local interface facing the gateway.
    pub fn local_address(&self) -> IpAddr {
        self.local_address
    }

    /// Timing settings.
    pub fn config(&self) -> &NatPmpConfig {
        &self.config
    }

    /// Ask the gateway to create (or renew) a mapping.
    ///
    /// On success the mapping carries the public port and protocol the gateway
    /// granted and expires after the granted lifetime; it is then listed in
    /// [`NatPmpDevice::active_mappings`]. On failure the mapping is untouched.
    pub async fn create_mapping(&self, mapping: &mut Mapping) -> NatPmpResult<()> {
        let request = encode_map_request(mapping, true);
        let response = self
            .map_exchange(mapping.protocol(), &request)
            .await
            .map_err(|source| mapping_error(MappingVerb::Create, mapping, source))?;

        let mut active = self.active_mappings.write().await;

        if response.is_delete_ack() {
            debug!(%mapping, "gateway granted zero lifetime, mapping not created");
            active.remove(&mapping.key());
            return Ok(());
        }

        mapping.apply_created(
            response.protocol,
            response.public_port,
            response.lifetime,
            SystemTime::now(),
        );
        debug!(
            %mapping,
            lifetime = response.lifetime,
            epoch = response.epoch,
            "created NAT-PMP mapping"
        );

        active.insert(mapping.key(), mapping.clone());
        Ok(())
    }

    /// Ask the gateway to remove a mapping.
    ///
    /// The request carries the mapping's stored lifetime. The mapping itself is
    /// never written; on success it is dropped from
    /// [`NatPmpDevice::active_mappings`].
    pub async fn delete_mapping(&self, mapping: &mut Mapping) -> NatPmpResult<()> {
        let request = encode_map_request(mapping, false);
        let response = self
            .map_exchange(mapping.protocol(), &request)
            .await
            .map_err(|source| mapping_error(MappingVerb::Delete, mapping, source))?;

        if !response.is_delete_ack() {
            debug!(
                %mapping,
                lifetime = response.lifetime,
                "gateway acknowledged delete with nonzero lifetime"
            );
        }

        self.active_mappings.write().await.remove(&mapping.key());
        debug!(%mapping, "deleted NAT-PMP mapping");
        Ok(())
    }

    /// The gateway's public address as last known.
    ///
    /// Answers from the cached value without network I/O, under the same
    /// deadline as the other operations.
    pub async fn external_address(&self) -> NatPmpResult<IpAddr> {
        let timeout = self.config.operation_timeout;

        time::timeout(timeout, async { *self.public_address.read().await })
            .await
            .map_err(|_| NatPmpError::ExternalAddress(ExchangeError::Timeout(timeout)))
    }

    /// Query the gateway for its public address and update the cached value.
    pub async fn refresh_external_address(&self) -> NatPmpResult<IpAddr> {
        let request = encode_external_address_request();

        let response = self
            .exchange(&request, ExternalAddressResponse::from_bytes)
            .await
            .map_err(|source| {
                warn!(gateway = %self.gateway, error = %source, "external address query failed");
                NatPmpError::ExternalAddress(source)
            })?;

        let address = IpAddr::V4(response.address);
        *self.public_address.write().await = address;
        debug!(gateway = %self.gateway, %address, "refreshed external address");

        Ok(address)
    }

    /// Every mapping the gateway holds.
    ///
    /// Always fails: NAT-PMP cannot enumerate mappings.
    pub async fn all_mappings(&self) -> NatPmpResult<Vec<Mapping>> {
        Err(NatPmpError::Unsupported {
            operation: "all_mappings",
        })
    }

    /// The mapping the gateway holds for a protocol and public port.
    ///
    /// Always fails: NAT-PMP cannot query mappings.
    pub async fn specific_mapping(
        &self,
        _protocol: MappingProtocol,
        _public_port: u16,
    ) -> NatPmpResult<Mapping> {
        Err(NatPmpError::Unsupported {
            operation: "specific_mapping",
        })
    }

    /// Snapshot of the mappings created through this device and not deleted.
    pub async fn active_mappings(&self) -> Vec<Mapping> {
        self.active_mappings.read().await.values().cloned().collect()
    }

    /// Look up an active mapping by protocol and private port.
    pub async fn active_mapping(&self, key: MappingKey) -> Option<Mapping> {
        self.active_mappings.read().await.get(&key).cloned()
    }

    /// Run a map exchange, accepting only replies for `protocol`.
    async fn map_exchange(
        &self,
        protocol: MappingProtocol,
        request: &[u8],
    ) -> ExchangeResult<MapResponse> {
        self.exchange(request, |datagram| {
            let response = MapResponse::from_bytes(datagram)?;
            if response.protocol != protocol {
                return Err(CodecError::UnexpectedOpcode(datagram[1]));
            }
            Ok(response)
        })
        .await
    }

    /// Run one exchange under the device lock.
    ///
    /// The deadline starts before the lock is taken, so time spent queued
    /// behind other operations counts against it.
    async fn exchange<T, D>(&self, request: &[u8], decode: D) -> ExchangeResult<T>
    where
        D: FnMut(&[u8]) -> Result<T, CodecError>,
    {
        let timeout = self.config.operation_timeout;
        let deadline = Instant::now() + timeout;

        let _exchange = time::timeout_at(deadline, self.exchange_lock.lock())
            .await
            .map_err(|_| {
                debug!(gateway = %self.gateway, "deadline passed waiting for exchange lock");
                ExchangeError::Timeout(timeout)
            })?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        self.config
            .exchange(self.gateway)
            .timeout(remaining)
            .run(request, decode)
            .await
            .map_err(|e| match e {
                ExchangeError::Timeout(_) => ExchangeError::Timeout(timeout),
                other => other,
            })
    }
}

fn mapping_error(verb: MappingVerb, mapping: &Mapping, source: ExchangeError) -> NatPmpError {
    warn!(%verb, %mapping, error = %source, "NAT-PMP mapping operation failed");

    NatPmpError::Mapping {
        verb,
        protocol: mapping.protocol(),
        private_port: mapping.private_port(),
        source,
    }
}

impl PortMapper for NatPmpDevice {
    type Error = NatPmpError;

    async fn create_mapping(&self, mapping: &mut Mapping) -> NatPmpResult<()> {
        NatPmpDevice::create_mapping(self, mapping).await
    }

    async fn delete_mapping(&self, mapping: &mut Mapping) -> NatPmpResult<()> {
        NatPmpDevice::delete_mapping(self, mapping).await
    }

    async fn external_address(&self) -> NatPmpResult<IpAddr> {
        NatPmpDevice::external_address(self).await
    }

    async fn all_mappings(&self) -> NatPmpResult<Vec<Mapping>> {
        NatPmpDevice::all_mappings(self).await
    }

    async fn specific_mapping(
        &self,
        protocol: MappingProtocol,
        public_port: u16,
    ) -> NatPmpResult<Mapping> {
        NatPmpDevice::specific_mapping(self, protocol, public_port).await
    }
}
