//! Exporter capability consumed by the registry

use std::sync::Arc;
use thiserror::Error;

use super::identifier::ExternalIdentifier;
use crate::circuit_breaker::CircuitBreaker;

/// Reasons an exporter refuses a breaker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Something is already published under this identifier
    #[error("'{identifier}' is already published")]
    AlreadyPublished { identifier: String },

    /// The management plane rejected or could not complete publication
    #[error("'{identifier}' was rejected: {reason}")]
    Rejected { identifier: String, reason: String },
}

impl ExportError {
    /// Create a rejection for the given identifier
    pub fn rejected(identifier: &ExternalIdentifier, reason: impl Into<String>) -> Self {
        Self::Rejected {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }
}

/// Publishes newly created breakers to a management plane
///
/// Called by the registry while it holds the creation lock for the breaker's
/// name. Implementations must not call back into the registry.
#[cfg_attr(test, mockall::automock)]
pub trait BreakerExporter: Send + Sync {
    /// Publish `breaker` under `identifier`
    fn publish(
        &self,
        breaker: Arc<CircuitBreaker>,
        identifier: &ExternalIdentifier,
    ) -> Result<(), ExportError>;
}
