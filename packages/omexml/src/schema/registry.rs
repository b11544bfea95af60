//! Kind registry mapping element names to kind specifications.

use std::collections::HashMap;

use super::types::{BackReferenceSpec, EntityKind, KindSpec, PropertyKind};

/// Registry of kind specifications for one schema version.
///
/// Registering a kind also derives the back-reference collections its
/// reference properties maintain on their targets.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    kinds: HashMap<EntityKind, KindSpec>,
    back_references: HashMap<EntityKind, Vec<BackReferenceSpec>>,
}

impl SchemaRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind specification.
    pub fn register(&mut self, spec: KindSpec) {
        for property in &spec.properties {
            if let PropertyKind::Reference {
                targets,
                back_reference,
            } = &property.kind
            {
                for target in targets {
                    let entries = self.back_references.entry(*target).or_default();
                    debug_assert!(
                        entries.iter().all(|b| b.name != *back_reference),
                        "duplicate back reference {back_reference} on {target}"
                    );
                    entries.push(BackReferenceSpec {
                        name: back_reference,
                        source: spec.kind,
                        forward: property.name,
                    });
                }
            }
        }
        self.kinds.insert(spec.kind, spec);
    }

    /// Get the specification of a kind.
    #[must_use]
    pub fn get(&self, kind: EntityKind) -> Option<&KindSpec> {
        self.kinds.get(&kind)
    }

    /// Find the kind whose element name is `tag`.
    #[must_use]
    pub fn kind_for_tag(&self, tag: &str) -> Option<EntityKind> {
        tag.parse()
            .ok()
            .filter(|kind| self.kinds.contains_key(kind))
    }

    /// Check if a kind is registered.
    #[must_use]
    pub fn has_kind(&self, kind: EntityKind) -> bool {
        self.kinds.contains_key(&kind)
    }

    /// Back-reference collections maintained on `kind`.
    #[must_use]
    pub fn back_references(&self, kind: EntityKind) -> &[BackReferenceSpec] {
        self.back_references
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Look up one back-reference collection of `kind` by name.
    #[must_use]
    pub fn back_reference(&self, kind: EntityKind, name: &str) -> Option<&BackReferenceSpec> {
        self.back_references(kind).iter().find(|b| b.name == name)
    }

    /// All registered kinds, sorted.
    #[must_use]
    pub fn registered_kinds(&self) -> Vec<EntityKind> {
        let mut kinds: Vec<EntityKind> = self.kinds.keys().copied().collect();
        kinds.sort();
        kinds
    }
}
