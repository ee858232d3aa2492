//! Configuration management for Tripwire

pub mod file_loader;
pub mod registry_config;

pub use file_loader::load_from_file;
pub use registry_config::{BreakerOverride, IdentifierConfig, RegistryConfig};
