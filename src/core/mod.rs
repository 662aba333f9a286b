//! Core types, constants, and traits (always included).

pub mod constants;
mod error;
mod mapping;
mod traits;

pub use error::*;
pub use mapping::*;
pub use traits::*;
