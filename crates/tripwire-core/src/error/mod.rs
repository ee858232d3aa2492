//! Error types for Tripwire
//!
//! Every fallible registry operation returns [`RegistryResult`]. A failed
//! `get_or_create` never leaves a partially created breaker behind, so callers
//! may retry with a corrected name or a different exporter.

mod constructors;
mod types;

pub use types::{RegistryError, RegistryResult};
