//! NAT-PMP transport layer.
//!
//! Owns the network side of the protocol:
//!
//! - **Sockets**: [`GatewaySocket`], one ephemeral UDP socket per exchange
//! - **Retransmission**: [`RetryController`] with exponential backoff
//! - **Exchanges**: [`Exchange`] racing sends against receives under a deadline
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          Gateway device API             │
//! ├─────────────────────────────────────────┤
//! │         Transport Layer                 │  ← This module
//! │   socket, retry, exchange               │
//! ├─────────────────────────────────────────┤
//! │            Wire codec                   │
//! ├─────────────────────────────────────────┤
//! │              UDP                        │
//! └─────────────────────────────────────────┘
//! ```

mod error;
mod exchange;
mod retry;
mod socket;

pub use error::*;
pub use exchange::*;
pub use retry::RetryController;
pub use socket::*;
