//! Arena graph holding every entity of one document.
//!
//! Entities are addressed by [`EntityId`] handles and looked up by their
//! string ID through an index. All property access is driven by the kind
//! catalog: scalar, child and link operations take a property name and check
//! it against the entity's [`KindSpec`].
//!
//! Link operations accept either a forward reference property (e.g. a Well's
//! `ReagentRef`) or a back-reference name (a Reagent's `Well`). Either way the
//! forward collection of the source and the back-reference collection of the
//! target are updated together.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::entity::{Entity, EntityId, PropertyValue};
use super::value::Value;
use crate::config::ID_ATTRIBUTE;
use crate::error::{ModelError, Result};
use crate::schema::{EntityKind, KindSpec, PropertyKind, PropertySpec, Schema};

/// Counts describing a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    /// Total number of entities.
    pub entities: usize,

    /// Number of entities without an owner.
    pub roots: usize,

    /// Number of forward reference links.
    pub references: usize,

    /// Number of entities with an ID.
    pub identified: usize,

    /// Entity count per kind.
    pub kinds: BTreeMap<EntityKind, usize>,
}

/// Which side of a reference a property name addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Forward,
    Backward,
}

/// A reference property together with its reverse collection.
#[derive(Debug, Clone, Copy)]
struct LinkPath<'s> {
    source: EntityKind,
    forward: &'static str,
    back: &'static str,
    targets: &'s [EntityKind],
    singular: bool,
}

/// Saved state of an entity subtree, see [`ModelGraph::snapshot`].
#[derive(Debug)]
pub(crate) struct Snapshot {
    mark: usize,
    entities: Vec<(EntityId, Entity)>,
}

/// Per-document object graph.
#[derive(Debug, Clone)]
pub struct ModelGraph<'s> {
    schema: &'s Schema,
    entities: Vec<Entity>,
    ids: HashMap<String, EntityId>,
}

impl<'s> ModelGraph<'s> {
    /// Create an empty graph over `schema`.
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            entities: Vec::new(),
            ids: HashMap::new(),
        }
    }

    /// The schema the graph is typed by.
    #[must_use]
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Create an empty, unowned entity of `kind`.
    ///
    /// # Errors
    /// Returns `ModelError::UnknownKind` if the schema has no such kind.
    pub fn create(&mut self, kind: EntityKind) -> Result<EntityId> {
        self.kind_spec(kind)?;
        let id = EntityId(self.entities.len());
        self.entities.push(Entity::new(kind));
        Ok(id)
    }

    /// Get an entity.
    ///
    /// # Errors
    /// Returns `ModelError::UnknownEntity` for a handle from another graph.
    pub fn get(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(id.0).ok_or(ModelError::UnknownEntity(id))
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities
            .get_mut(id.0)
            .ok_or(ModelError::UnknownEntity(id))
    }

    /// Kind of an entity.
    ///
    /// # Errors
    /// Returns `ModelError::UnknownEntity` for a handle from another graph.
    pub fn kind(&self, id: EntityId) -> Result<EntityKind> {
        self.get(id).map(Entity::kind)
    }

    /// Find the entity holding a string ID.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<EntityId> {
        self.ids.get(id).copied()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(index, entity)| (EntityId(index), entity))
    }

    /// Entities without an owner, in creation order.
    #[must_use]
    pub fn roots(&self) -> Vec<EntityId> {
        self.entities()
            .filter(|(_, entity)| entity.parent().is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Human-readable label for messages, e.g. `Reagent 'Reagent:1'`.
    #[must_use]
    pub fn describe(&self, id: EntityId) -> String {
        match self.entities.get(id.0) {
            Some(entity) => match entity.id() {
                Some(string_id) => format!("{} '{}'", entity.kind(), string_id),
                None => format!("{} {}", entity.kind(), id),
            },
            None => id.to_string(),
        }
    }

    fn kind_spec(&self, kind: EntityKind) -> Result<&'s KindSpec> {
        self.schema.kind(kind).ok_or(ModelError::UnknownKind(kind))
    }

    fn spec_of(&self, id: EntityId) -> Result<&'s KindSpec> {
        let kind = self.kind(id)?;
        self.kind_spec(kind)
    }

    fn scalar_spec(&self, id: EntityId, name: &str) -> Result<(EntityKind, &'s PropertySpec)> {
        let spec = self.spec_of(id)?;
        let property = spec
            .property(name)
            .ok_or_else(|| ModelError::UnknownProperty {
                kind: spec.kind,
                property: name.to_string(),
            })?;
        if property.value_type().is_none() {
            return Err(ModelError::PropertyTypeMismatch {
                kind: spec.kind,
                property: name.to_string(),
                expected: "scalar",
            });
        }
        Ok((spec.kind, property))
    }

    // Scalars

    /// Get a scalar property.
    ///
    /// # Errors
    /// Returns an error if the kind has no scalar property `name`.
    pub fn property(&self, id: EntityId, name: &str) -> Result<Option<&Value>> {
        self.scalar_spec(id, name)?;
        Ok(self.get(id)?.scalar(name))
    }

    /// Set a scalar property, returning the previous value.
    ///
    /// Setting `ID` registers the entity in the ID index.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidValue` if the value does not have the
    /// declared type, or `ModelError::DuplicateId` if another entity holds
    /// the ID.
    pub fn set_property(
        &mut self,
        id: EntityId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let value = value.into();
        let (kind, spec) = self.scalar_spec(id, name)?;
        if let Some(expected) = spec.value_type().filter(|vt| !value.matches(*vt)) {
            return Err(ModelError::InvalidValue {
                entity: kind,
                property: name.to_string(),
                value: value.to_string(),
                expected,
            });
        }

        if spec.name == ID_ATTRIBUTE {
            if let Value::String(new_id) = &value {
                self.register_id(id, new_id)?;
            }
        }

        let previous = self
            .entity_mut(id)?
            .properties
            .insert(spec.name, PropertyValue::Scalar(value));
        Ok(match previous {
            Some(PropertyValue::Scalar(old)) => Some(old),
            _ => None,
        })
    }

    /// Remove a scalar property, returning the previous value.
    ///
    /// # Errors
    /// Returns an error if the kind has no scalar property `name`.
    pub fn unset_property(&mut self, id: EntityId, name: &str) -> Result<Option<Value>> {
        let (_, spec) = self.scalar_spec(id, name)?;
        if spec.name == ID_ATTRIBUTE {
            self.unregister_id(id);
        }
        Ok(match self.entity_mut(id)?.properties.remove(spec.name) {
            Some(PropertyValue::Scalar(old)) => Some(old),
            _ => None,
        })
    }

    fn register_id(&mut self, id: EntityId, new_id: &str) -> Result<()> {
        match self.ids.get(new_id) {
            Some(holder) if *holder == id => return Ok(()),
            Some(_) => return Err(ModelError::DuplicateId(new_id.to_string())),
            None => {}
        }
        self.unregister_id(id);
        self.ids.insert(new_id.to_string(), id);
        Ok(())
    }

    fn unregister_id(&mut self, id: EntityId) {
        let current = self
            .entities
            .get(id.0)
            .and_then(Entity::id)
            .map(str::to_string);
        if let Some(current) = current {
            if self.ids.get(&current) == Some(&id) {
                self.ids.remove(&current);
            }
        }
    }

    // Children

    fn child_spec(&self, parent: EntityId, kind: EntityKind) -> Result<&'s PropertySpec> {
        let spec = self.spec_of(parent)?;
        spec.properties
            .iter()
            .find(|p| p.kind == PropertyKind::Child(kind))
            .ok_or_else(|| ModelError::KindMismatch {
                property: spec.kind.to_string(),
                actual: kind,
            })
    }

    /// Attach `child` as an owned child of `parent`.
    ///
    /// # Errors
    /// Returns an error if `parent` cannot own children of the child's kind,
    /// if the child already has an owner, if it would own itself, or if a
    /// singular child slot is already taken.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        let child_kind = self.kind(child)?;
        let spec = self.child_spec(parent, child_kind)?;
        if self.get(child)?.parent().is_some() {
            return Err(ModelError::AlreadyOwned(child));
        }

        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(ModelError::OwnershipCycle(child));
            }
            ancestor = self.get(current)?.parent();
        }

        let parent_kind = self.kind(parent)?;
        let holder = self.entity_mut(parent)?;
        if spec.is_singular() {
            if holder.properties.contains_key(spec.name) {
                return Err(ModelError::Cardinality {
                    entity: parent_kind,
                    tag: spec.name.to_string(),
                    count: 2,
                });
            }
            holder.properties.insert(spec.name, PropertyValue::Child(child));
        } else {
            match holder
                .properties
                .entry(spec.name)
                .or_insert_with(|| PropertyValue::Children(Vec::new()))
            {
                PropertyValue::Children(children) => children.push(child),
                slot => *slot = PropertyValue::Children(vec![child]),
            }
        }

        self.entity_mut(child)?.set_parent(parent);
        Ok(())
    }

    /// Owned children of `parent` of the given kind.
    ///
    /// # Errors
    /// Returns an error if `parent` cannot own children of `kind`.
    pub fn children(&self, parent: EntityId, kind: EntityKind) -> Result<&[EntityId]> {
        let spec = self.child_spec(parent, kind)?;
        Ok(self.get(parent)?.children(spec.name))
    }

    // Links

    fn link_path(&self, id: EntityId, name: &str) -> Result<(Side, LinkPath<'s>)> {
        let spec = self.spec_of(id)?;
        if let Some(property) = spec.property(name) {
            return match &property.kind {
                PropertyKind::Reference {
                    targets,
                    back_reference,
                } => Ok((
                    Side::Forward,
                    LinkPath {
                        source: spec.kind,
                        forward: property.name,
                        back: *back_reference,
                        targets,
                        singular: property.is_singular(),
                    },
                )),
                _ => Err(ModelError::PropertyTypeMismatch {
                    kind: spec.kind,
                    property: name.to_string(),
                    expected: "reference",
                }),
            };
        }

        let unknown = || ModelError::UnknownProperty {
            kind: spec.kind,
            property: name.to_string(),
        };
        let back = self
            .schema
            .kinds()
            .back_reference(spec.kind, name)
            .ok_or_else(unknown)?;
        let forward = self
            .kind_spec(back.source)?
            .property(back.forward)
            .ok_or_else(unknown)?;
        match &forward.kind {
            PropertyKind::Reference { targets, .. } => Ok((
                Side::Backward,
                LinkPath {
                    source: back.source,
                    forward: forward.name,
                    back: back.name,
                    targets,
                    singular: forward.is_singular(),
                },
            )),
            _ => Err(unknown()),
        }
    }

    fn linked(&self, id: EntityId, name: &str) -> Result<&[EntityId]> {
        let (side, path) = self.link_path(id, name)?;
        let entity = self.get(id)?;
        Ok(match side {
            Side::Forward => entity.references(path.forward),
            Side::Backward => entity.back_references(path.back),
        })
    }

    /// Check that `other` may sit on the far side of `name`.
    fn check_far_side(
        &self,
        name: &str,
        side: Side,
        path: &LinkPath<'_>,
        other: EntityId,
    ) -> Result<()> {
        let actual = self.kind(other)?;
        let accepted = match side {
            Side::Forward => path.targets.contains(&actual),
            Side::Backward => actual == path.source,
        };
        if accepted {
            Ok(())
        } else {
            Err(ModelError::KindMismatch {
                property: name.to_string(),
                actual,
            })
        }
    }

    fn link_forward(&mut self, source: EntityId, path: &LinkPath<'_>, target: EntityId) {
        if path.singular {
            let existing = self.entities[source.0].references(path.forward).to_vec();
            for old in existing {
                self.unlink_forward(source, path, old);
            }
        }
        self.entities[source.0]
            .references_mut(path.forward)
            .push(target);
        self.entities[target.0]
            .back_references_mut(path.back)
            .push(source);
    }

    fn unlink_forward(&mut self, source: EntityId, path: &LinkPath<'_>, target: EntityId) -> bool {
        let removed = match self.entities[source.0].references.get_mut(path.forward) {
            Some(targets) => remove_first(targets, target),
            None => false,
        };
        if removed {
            if let Some(sources) = self.entities[target.0].back_references.get_mut(path.back) {
                remove_first(sources, source);
            }
        }
        removed
    }

    /// Number of entities linked through `name`.
    ///
    /// # Errors
    /// Returns an error if `name` is neither a reference nor a back-reference
    /// of the entity's kind.
    pub fn size_of_linked(&self, id: EntityId, name: &str) -> Result<usize> {
        self.linked(id, name).map(<[EntityId]>::len)
    }

    /// Snapshot of the entities linked through `name`.
    ///
    /// # Errors
    /// Returns an error if `name` is neither a reference nor a back-reference
    /// of the entity's kind.
    pub fn copy_linked(&self, id: EntityId, name: &str) -> Result<Vec<EntityId>> {
        self.linked(id, name).map(<[EntityId]>::to_vec)
    }

    /// The linked entity at `index`.
    ///
    /// # Errors
    /// Returns `ModelError::IndexOutOfBounds` past the end of the collection.
    pub fn get_linked(&self, id: EntityId, name: &str, index: usize) -> Result<EntityId> {
        let linked = self.linked(id, name)?;
        linked
            .get(index)
            .copied()
            .ok_or_else(|| ModelError::IndexOutOfBounds {
                property: name.to_string(),
                index,
                len: linked.len(),
            })
    }

    /// Replace the linked entity at `index`, returning the previous one.
    ///
    /// The reverse side of both the old and the new link is kept in step.
    ///
    /// # Errors
    /// Returns an error for an out-of-range index or a value of a kind the
    /// link does not accept.
    pub fn set_linked(
        &mut self,
        id: EntityId,
        name: &str,
        index: usize,
        value: EntityId,
    ) -> Result<EntityId> {
        let (side, path) = self.link_path(id, name)?;
        self.check_far_side(name, side, &path, value)?;
        let previous = self.get_linked(id, name, index)?;
        if previous == value {
            return Ok(previous);
        }

        match side {
            Side::Forward => {
                self.entities[id.0].references_mut(path.forward)[index] = value;
                if let Some(sources) = self.entities[previous.0]
                    .back_references
                    .get_mut(path.back)
                {
                    remove_first(sources, id);
                }
                self.entities[value.0]
                    .back_references_mut(path.back)
                    .push(id);
            }
            Side::Backward => {
                if let Some(targets) = self.entities[previous.0].references.get_mut(path.forward) {
                    remove_first(targets, id);
                }
                if path.singular {
                    let existing = self.entities[value.0].references(path.forward).to_vec();
                    for old in existing {
                        self.unlink_forward(value, &path, old);
                    }
                }
                self.entities[value.0]
                    .references_mut(path.forward)
                    .push(id);

                let sources = self.entities[id.0].back_references_mut(path.back);
                match sources.iter().position(|s| *s == previous) {
                    Some(position) => sources[position] = value,
                    None => sources.push(value),
                }
            }
        }
        Ok(previous)
    }

    /// Append a link through `name`.
    ///
    /// Linking the same pair twice records it twice. On a singular
    /// reference the current target is replaced.
    ///
    /// # Errors
    /// Returns an error if `name` is not a link of the entity's kind or
    /// `value` has a kind the link does not accept.
    pub fn link(&mut self, id: EntityId, name: &str, value: EntityId) -> Result<()> {
        let (side, path) = self.link_path(id, name)?;
        self.check_far_side(name, side, &path, value)?;
        match side {
            Side::Forward => self.link_forward(id, &path, value),
            Side::Backward => self.link_forward(value, &path, id),
        }
        Ok(())
    }

    /// Remove one link through `name`.
    ///
    /// Returns `false` if the pair was not linked.
    ///
    /// # Errors
    /// Returns an error if `name` is not a link of the entity's kind.
    pub fn unlink(&mut self, id: EntityId, name: &str, value: EntityId) -> Result<bool> {
        let (side, path) = self.link_path(id, name)?;
        self.get(value)?;
        Ok(match side {
            Side::Forward => self.unlink_forward(id, &path, value),
            Side::Backward => self.unlink_forward(value, &path, id),
        })
    }

    // Session support

    /// Arena length, used as a rollback mark.
    pub(crate) fn mark(&self) -> usize {
        self.entities.len()
    }

    /// Discard every entity created after `mark`, with its ID registrations.
    ///
    /// Entities before the mark must not refer to the discarded ones.
    pub(crate) fn rollback(&mut self, mark: usize) {
        self.entities.truncate(mark);
        self.ids.retain(|_, id| id.0 < mark);
    }

    /// Save `root` and its owned descendants, together with the current mark.
    ///
    /// # Errors
    /// Returns `ModelError::UnknownEntity` if `root` is not in the graph.
    pub(crate) fn snapshot(&self, root: EntityId) -> Result<Snapshot> {
        let mut entities = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let entity = self.get(id)?;
            for value in entity.properties.values() {
                match value {
                    PropertyValue::Child(child) => stack.push(*child),
                    PropertyValue::Children(children) => stack.extend(children.iter().copied()),
                    PropertyValue::Scalar(_) => {}
                }
            }
            entities.push((id, entity.clone()));
        }
        Ok(Snapshot {
            mark: self.mark(),
            entities,
        })
    }

    /// Discard entities created since `snapshot` and put the saved subtree
    /// back as it was, with its ID registrations.
    ///
    /// Entities outside the saved subtree must not have changed since.
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.rollback(snapshot.mark);
        let saved: HashSet<EntityId> = snapshot.entities.iter().map(|(id, _)| *id).collect();
        self.ids.retain(|_, holder| !saved.contains(holder));
        for (id, entity) in snapshot.entities {
            if let Some(string_id) = entity.id() {
                self.ids.insert(string_id.to_string(), id);
            }
            self.entities[id.0] = entity;
        }
    }

    /// Summarize the graph.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        let mut kinds = BTreeMap::new();
        let mut references = 0;
        let mut roots = 0;
        for entity in &self.entities {
            *kinds.entry(entity.kind()).or_insert(0) += 1;
            if entity.parent().is_none() {
                roots += 1;
            }
            references += entity.references.values().map(Vec::len).sum::<usize>();
        }
        GraphSummary {
            entities: self.entities.len(),
            roots,
            references,
            identified: self.ids.len(),
            kinds,
        }
    }
}

fn remove_first(items: &mut Vec<EntityId>, item: EntityId) -> bool {
    match items.iter().position(|i| *i == item) {
        Some(position) => {
            items.remove(position);
            true
        }
        None => false,
    }
}
