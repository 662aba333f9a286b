//! NAT-PMP client library.
//!
//! High-level API over one gateway device.

mod config;
mod device;
mod error;

pub use config::*;
pub use device::*;
pub use error::*;
