//! Publishing circuit breakers to an external management plane
//!
//! A breaker is published under an [`ExternalIdentifier`] of the form
//! `<namespace>:type=<kind>,value=<name>`. Exporters implement
//! [`BreakerExporter`]; [`InMemoryExporter`] is an in-process plane that
//! keeps published breakers inspectable by identifier.

mod exporter;
mod identifier;
mod in_memory;

pub use exporter::{BreakerExporter, ExportError};
pub use identifier::{ExternalIdentifier, IdentifierError};
pub use in_memory::InMemoryExporter;

#[cfg(test)]
pub use exporter::MockBreakerExporter;
