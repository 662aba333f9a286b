//! NAT-PMP wire codec.
//!
//! Fixed-layout, big-endian messages with no checksums: integrity is left to
//! UDP. Encoding cannot fail; decoding distinguishes socket noise (silently
//! dropped) from gateway-reported failures.

mod request;
mod response;

pub use request::*;
pub use response::*;
