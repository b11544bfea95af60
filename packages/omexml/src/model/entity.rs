//! Entity nodes stored in the model graph arena.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::value::Value;
use crate::config::ID_ATTRIBUTE;
use crate::schema::EntityKind;

/// Handle of an entity within one [`ModelGraph`](super::ModelGraph).
///
/// Handles are only meaningful for the graph that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    /// Arena index of the entity.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Content of one property slot.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Attribute or simple element value.
    Scalar(Value),

    /// Single owned child.
    Child(EntityId),

    /// Owned children in document order.
    Children(Vec<EntityId>),
}

/// A typed node of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    parent: Option<EntityId>,
    pub(crate) properties: HashMap<&'static str, PropertyValue>,
    /// Resolved forward links per reference property, in insertion order.
    pub(crate) references: HashMap<&'static str, Vec<EntityId>>,
    pub(crate) back_references: HashMap<&'static str, Vec<EntityId>>,
}

impl Entity {
    pub(crate) fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            parent: None,
            properties: HashMap::new(),
            references: HashMap::new(),
            back_references: HashMap::new(),
        }
    }

    /// The kind of this entity.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The `ID` attribute, if set.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self.properties.get(ID_ATTRIBUTE) {
            Some(PropertyValue::Scalar(Value::String(id))) => Some(id),
            _ => None,
        }
    }

    /// The owning entity, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: EntityId) {
        self.parent = Some(parent);
    }

    /// Raw content of a property slot.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Scalar value of a property, if set.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&Value> {
        match self.properties.get(name) {
            Some(PropertyValue::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    /// Entities linking to this one through the named back-reference.
    #[must_use]
    pub fn back_references(&self, name: &str) -> &[EntityId] {
        self.back_references
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Forward reference targets of a property, empty if none.
    #[must_use]
    pub fn references(&self, name: &str) -> &[EntityId] {
        self.references
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Owned children stored under a property, empty if none.
    #[must_use]
    pub fn children(&self, name: &str) -> &[EntityId] {
        match self.properties.get(name) {
            Some(PropertyValue::Child(child)) => std::slice::from_ref(child),
            Some(PropertyValue::Children(children)) => children,
            _ => &[],
        }
    }

    pub(crate) fn references_mut(&mut self, name: &'static str) -> &mut Vec<EntityId> {
        self.references.entry(name).or_default()
    }

    pub(crate) fn back_references_mut(&mut self, name: &'static str) -> &mut Vec<EntityId> {
        self.back_references.entry(name).or_default()
    }
}
