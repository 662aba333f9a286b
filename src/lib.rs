//! # natpmp-client
//!
//! Client for the **NAT** **P**ort **M**apping **P**rotocol (RFC 6886).
//!
//! NAT-PMP lets a host ask its gateway to forward a public port to a private
//! one, or to report the gateway's public address, over a small UDP
//! request/response exchange. This crate provides:
//!
//! - **Wire codec**: fixed-layout big-endian requests and responses
//! - **Retransmission**: exponential backoff bounded by an absolute deadline
//! - **Gateway device**: create, delete and query operations that update a
//!   caller-owned [`Mapping`]
//!
//! Gateway discovery and persistence of mappings are left to the caller.
//!
//! ## Feature Flags
//!
//! - `transport` (default): UDP exchange and retry controller
//! - `client` (default): [`client::NatPmpDevice`]
//!
//! ## Modules
//!
//! - [`core`](crate::core): Constants, mapping types, error types and traits (always included)
//! - [`codec`]: Wire format (always included)
//! - [`transport`]: UDP exchange (requires `transport` feature)
//! - [`client`]: Gateway device API (requires `client` feature)
//!
//! ## Example Usage
//!
//! ```rust
//! use natpmp_client::codec::encode_map_request;
//! use natpmp_client::core::{Mapping, MappingProtocol};
//!
//! let mapping = Mapping::new(MappingProtocol::Udp, 1234, 3600).with_public_port(5678);
//! let request = encode_map_request(&mapping, true);
//!
//! assert_eq!(request, [0, 1, 0, 0, 0x04, 0xd2, 0x16, 0x2e, 0, 0, 0x0e, 0x10]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Wire codec (always included)
pub mod codec;

// Transport layer (feature-gated)
#[cfg(feature = "transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "transport")))]
pub mod transport;

// Client API (feature-gated)
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::codec::*;
    pub use crate::core::*;

    #[cfg(feature = "transport")]
    pub use crate::transport::{
        Exchange, ExchangeError, ExchangeResult, ExchangeState, GatewaySocket, RetryController,
    };

    #[cfg(feature = "client")]
    pub use crate::client::*;
}

// Re-export commonly used items at crate root
pub use crate::core::{CodecError, Mapping, MappingProtocol, PortMapper};

#[cfg(feature = "client")]
pub use crate::client::{NatPmpConfig, NatPmpDevice, NatPmpError, NatPmpResult};
