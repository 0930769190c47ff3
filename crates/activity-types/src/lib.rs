//! Core types for the employee activity log.
//!
//! JSON field names are camelCase so persisted collections stay readable by the web client.

mod dto;
#[cfg(feature = "test-util")]
pub mod fixtures;
mod record;
mod traits;

pub use dto::*;
pub use record::*;
pub use traits::*;
