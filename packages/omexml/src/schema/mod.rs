//! Entity kind catalog.
//!
//! The catalog is a fixed table of entity kinds and their property
//! descriptors per schema version. Together with the enumeration registry it
//! forms the read-only [`Schema`] every parse session is driven by.

mod config;
mod registry;
mod types;

use std::sync::LazyLock;

pub use config::create_2010_04_registry;
pub use registry::SchemaRegistry;
pub use types::{
    BackReferenceSpec, Cardinality, EntityKind, KindSpec, PropertyKind, PropertySpec,
    SchemaVersion, ValueType,
};

use crate::enums::EnumerationRegistry;

static SCHEMA_2010_04: LazyLock<Schema> = LazyLock::new(|| Schema::new(SchemaVersion::V2010_04));

/// Kind catalog and enumeration tables of one schema version.
#[derive(Debug, Clone)]
pub struct Schema {
    version: SchemaVersion,
    kinds: SchemaRegistry,
    enumerations: EnumerationRegistry,
}

impl Schema {
    /// Build the schema for a version.
    ///
    /// Prefer [`Schema::v2010_04`], which builds it once per process.
    #[must_use]
    pub fn new(version: SchemaVersion) -> Self {
        let kinds = match version {
            SchemaVersion::V2010_04 => create_2010_04_registry(),
        };
        Self {
            version,
            kinds,
            enumerations: EnumerationRegistry::for_version(version),
        }
    }

    /// Assemble a schema from custom tables.
    #[must_use]
    pub fn from_parts(
        version: SchemaVersion,
        kinds: SchemaRegistry,
        enumerations: EnumerationRegistry,
    ) -> Self {
        Self {
            version,
            kinds,
            enumerations,
        }
    }

    /// Shared schema for OME-XML 2010-04.
    #[must_use]
    pub fn v2010_04() -> &'static Schema {
        &SCHEMA_2010_04
    }

    /// The schema version.
    #[must_use]
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// The kind registry.
    #[must_use]
    pub fn kinds(&self) -> &SchemaRegistry {
        &self.kinds
    }

    /// The enumeration registry.
    #[must_use]
    pub fn enumerations(&self) -> &EnumerationRegistry {
        &self.enumerations
    }

    /// Get the specification of a kind.
    #[must_use]
    pub fn kind(&self, kind: EntityKind) -> Option<&KindSpec> {
        self.kinds.get(kind)
    }
}
