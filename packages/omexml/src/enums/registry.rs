//! Registry of legal literals per enumeration kind.

use std::collections::HashMap;

use strum::IntoEnumIterator;

use super::types::{EnumKind, EnumValue, ExperimentType, NamingConvention};
use crate::error::EnumerationError;
use crate::schema::SchemaVersion;

/// Maps each enumerated value domain to the literals a schema version allows.
///
/// The registry is built once per schema version and is read-only afterwards,
/// so one instance can be shared between parse sessions.
#[derive(Debug, Clone, Default)]
pub struct EnumerationRegistry {
    literals: HashMap<EnumKind, Vec<&'static str>>,
}

impl EnumerationRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the registry for a schema version.
    #[must_use]
    pub fn for_version(version: SchemaVersion) -> Self {
        let mut registry = Self::new();
        match version {
            SchemaVersion::V2010_04 => {
                registry.register(
                    EnumKind::NamingConvention,
                    NamingConvention::iter().map(<&'static str>::from),
                );
                registry.register(
                    EnumKind::ExperimentType,
                    ExperimentType::iter().map(<&'static str>::from),
                );
            }
        }
        registry
    }

    /// Register the legal literals of a kind, replacing any previous set.
    pub fn register(&mut self, kind: EnumKind, literals: impl IntoIterator<Item = &'static str>) {
        self.literals.insert(kind, literals.into_iter().collect());
    }

    /// The legal literals of a kind, in schema order.
    #[must_use]
    pub fn literals(&self, kind: EnumKind) -> Option<&[&'static str]> {
        self.literals.get(&kind).map(Vec::as_slice)
    }

    /// Check whether `raw` is a legal literal of `kind`.
    #[must_use]
    pub fn is_valid(&self, kind: EnumKind, raw: &str) -> bool {
        self.literals(kind)
            .is_some_and(|literals| literals.contains(&raw))
    }

    /// Resolve a raw string to a typed enumeration member.
    ///
    /// Matching is exact: no case folding and no whitespace trimming.
    ///
    /// # Errors
    /// Returns `EnumerationError::UnknownKind` if the kind has no registered
    /// literals, or `EnumerationError::InvalidLiteral` if `raw` is not one of them.
    pub fn resolve(&self, kind: EnumKind, raw: &str) -> Result<EnumValue, EnumerationError> {
        let literals = self
            .literals(kind)
            .ok_or(EnumerationError::UnknownKind(kind))?;

        if !literals.contains(&raw) {
            return Err(EnumerationError::InvalidLiteral {
                kind,
                value: raw.to_string(),
            });
        }

        EnumValue::parse(kind, raw).ok_or_else(|| EnumerationError::InvalidLiteral {
            kind,
            value: raw.to_string(),
        })
    }
}
