//! Core error types for Tripwire

use thiserror::Error;

use crate::export::{ExportError, IdentifierError};

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Main error type for the circuit breaker registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The breaker name was rejected before any lookup took place
    #[error("Invalid circuit breaker name: {message}")]
    InvalidName { message: String },

    /// The name cannot be turned into an external identifier
    #[error("Invalid external identifier for circuit breaker '{name}': {source}")]
    InvalidIdentifier {
        name: String,
        #[source]
        source: IdentifierError,
    },

    /// The bound exporter refused or failed to publish the breaker
    #[error("Failed to publish circuit breaker as '{identifier}': {source}")]
    PublishFailure {
        identifier: String,
        #[source]
        source: ExportError,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },
}

impl RegistryError {
    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "TRIPWIRE_INVALID_NAME",
            Self::InvalidIdentifier { .. } => "TRIPWIRE_INVALID_IDENTIFIER",
            Self::PublishFailure { .. } => "TRIPWIRE_PUBLISH_FAILURE",
            Self::Config { .. } => "TRIPWIRE_CONFIG",
        }
    }

    /// Get optional context about the error
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } => context.as_deref(),
            _ => None,
        }
    }

    /// Whether the failure happened while exporting a new breaker
    pub fn is_export_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier { .. } | Self::PublishFailure { .. }
        )
    }
}
