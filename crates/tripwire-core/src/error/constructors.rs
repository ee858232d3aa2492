//! Constructor methods for RegistryError

use super::types::RegistryError;
use crate::export::{ExportError, ExternalIdentifier, IdentifierError};

impl RegistryError {
    /// Create a new invalid name error
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::InvalidName {
            message: message.into(),
        }
    }

    /// Create an invalid identifier error for the given breaker name
    pub fn invalid_identifier(name: impl Into<String>, source: IdentifierError) -> Self {
        Self::InvalidIdentifier {
            name: name.into(),
            source,
        }
    }

    /// Create a publish failure error
    pub fn publish_failure(identifier: &ExternalIdentifier, source: ExportError) -> Self {
        Self::PublishFailure {
            identifier: identifier.to_string(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }
}
