//! External identifier syntax

use std::fmt;
use thiserror::Error;

/// Characters that may not appear in a namespace
const NAMESPACE_RESERVED: &[char] = &[':', '*', '?', '\n'];

/// Characters that may not appear in an unquoted property value
const VALUE_RESERVED: &[char] = &[',', '=', ':', '"', '*', '?', '\n'];

/// Reasons an identifier cannot be built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The namespace contains a reserved character
    #[error("namespace contains illegal character {character:?}")]
    IllegalNamespace { character: char },

    /// A property value is empty
    #[error("property '{key}' has an empty value")]
    EmptyProperty { key: &'static str },

    /// A property value contains a reserved character
    #[error("property '{key}' contains illegal character {character:?}")]
    IllegalCharacter { key: &'static str, character: char },
}

/// Identifier under which a breaker is known to a management plane
///
/// Construction validates every component. Reserved characters are rejected,
/// never escaped or stripped, so the rendered form always round-trips to the
/// same namespace, kind and value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalIdentifier {
    namespace: String,
    kind: String,
    value: String,
    rendered: String,
}

impl ExternalIdentifier {
    /// Build `<namespace>:type=<kind>,value=<value>`
    pub fn new(namespace: &str, kind: &str, value: &str) -> Result<Self, IdentifierError> {
        Self::check_qualifier(namespace, kind)?;
        check_property("value", value)?;

        Ok(Self {
            rendered: format!("{namespace}:type={kind},value={value}"),
            namespace: namespace.to_string(),
            kind: kind.to_string(),
            value: value.to_string(),
        })
    }

    /// Check the parts shared by every identifier of one registry
    pub fn check_qualifier(namespace: &str, kind: &str) -> Result<(), IdentifierError> {
        if let Some(character) = namespace.chars().find(|c| NAMESPACE_RESERVED.contains(c)) {
            return Err(IdentifierError::IllegalNamespace { character });
        }
        check_property("type", kind)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The breaker name carried by this identifier
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for ExternalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl AsRef<str> for ExternalIdentifier {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

fn check_property(key: &'static str, value: &str) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::EmptyProperty { key });
    }
    match value.chars().find(|c| VALUE_RESERVED.contains(c)) {
        Some(character) => Err(IdentifierError::IllegalCharacter { key, character }),
        None => Ok(()),
    }
}
