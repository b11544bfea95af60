//! Error types for the model graph.
//!
//! Uses the dual-error pattern: `ModelError` for library consumers with
//! detailed error context, and `EnumerationError` for the enumeration
//! registry, which knows nothing about entities or properties.
//! Non-fatal findings are reported as `ParseWarning`s.

use thiserror::Error;

use crate::enums::EnumKind;
use crate::model::EntityId;
use crate::schema::{EntityKind, ValueType};

/// Error returned by the enumeration registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumerationError {
    /// The literal is not a member of the enumeration.
    #[error("'{value}' is not a legal {kind} literal")]
    InvalidLiteral { kind: EnumKind, value: String },

    /// No literals are registered for the enumeration.
    #[error("No literals registered for enumeration {0}")]
    UnknownKind(EnumKind),
}

/// Main error type for the model library.
#[derive(Debug, Error)]
pub enum ModelError {
    /// An enumerated property was given a literal outside its set.
    #[error("Invalid enumeration value for {entity}.{property}: {source}")]
    Enumeration {
        entity: EntityKind,
        property: String,
        #[source]
        source: EnumerationError,
    },

    /// A scalar could not be coerced to its declared type.
    #[error("Invalid value '{value}' for {entity}.{property}: expected {expected}")]
    InvalidValue {
        entity: EntityKind,
        property: String,
        value: String,
        expected: ValueType,
    },

    /// A single-valued element occurred more than once.
    #[error("Element <{tag}> may occur at most once in <{entity}>, found {count}")]
    Cardinality {
        entity: EntityKind,
        tag: String,
        count: usize,
    },

    /// A reference stub names an ID that is not in the graph.
    #[error("Unresolved {property} from {source_entity}: no entity with ID '{target_id}'")]
    UnresolvedReference {
        source_entity: String,
        property: String,
        target_id: String,
    },

    /// A reference stub names an entity of a kind the property does not accept.
    #[error("{property} from {source_entity} cannot target '{target_id}', which is a {found}")]
    ReferenceKindMismatch {
        source_entity: String,
        property: String,
        target_id: String,
        found: EntityKind,
    },

    /// Element name does not match the entity kind (strict mode only).
    #[error("Expecting node name of {expected} got {found}")]
    TagMismatch { expected: String, found: String },

    /// Another entity already holds this ID.
    #[error("Duplicate ID '{0}'")]
    DuplicateId(String),

    /// A required attribute is absent.
    #[error("Missing attribute {attribute} on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    /// An entity without ID cannot be written as a reference target.
    #[error("{0} has no ID and cannot be the target of a reference")]
    MissingId(String),

    /// The kind declares no property with this name.
    #[error("{kind} has no property '{property}'")]
    UnknownProperty { kind: EntityKind, property: String },

    /// The property exists but is used as the wrong sort of property.
    #[error("{kind}.{property} is not a {expected} property")]
    PropertyTypeMismatch {
        kind: EntityKind,
        property: String,
        expected: &'static str,
    },

    /// An entity of the wrong kind was offered to a property.
    #[error("{property} cannot hold a {actual}")]
    KindMismatch { property: String, actual: EntityKind },

    /// The entity handle does not belong to this graph.
    #[error("Unknown entity {0}")]
    UnknownEntity(EntityId),

    /// The entity already has an owner.
    #[error("{0} is already owned by another entity")]
    AlreadyOwned(EntityId),

    /// Attaching the child would make it its own ancestor.
    #[error("{0} is an ancestor of the requested owner")]
    OwnershipCycle(EntityId),

    /// Positional access past the end of a collection.
    #[error("Index {index} out of bounds for {property} (length {len})")]
    IndexOutOfBounds {
        property: String,
        index: usize,
        len: usize,
    },

    /// The document element does not map to any entity kind.
    #[error("No entity kind for root element <{0}>")]
    UnknownRootElement(String),

    /// The kind is not registered in the schema.
    #[error("Kind {0} is not part of the schema")]
    UnknownKind(EntityKind),

    /// Element nesting exceeded the configured limit.
    #[error("Maximum nesting depth of {0} exceeded")]
    MaxDepthExceeded(usize),

    /// The input exceeds the configured size limit.
    #[error("Document too large: {size} bytes (maximum {max})")]
    DocumentTooLarge { size: usize, max: usize },

    /// Document output needs exactly one parentless entity.
    #[error("Graph has {0} root entities, expected exactly one")]
    RootCount(usize),

    /// Aggregate of reference resolution failures.
    #[error("{} reference(s) could not be resolved", .0.len())]
    Unresolved(Vec<ModelError>),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Serialized output was not UTF-8.
    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Non-fatal finding recorded while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWarning {
    /// The element name differs from the kind being parsed.
    #[error("Expecting node name of {expected} got {found}")]
    TagMismatch { expected: String, found: String },

    /// An ID does not follow the LSID convention of its kind.
    #[error("ID '{id}' of {kind} does not follow the {prefix}:<suffix> convention")]
    NonConformingId {
        kind: EntityKind,
        id: String,
        prefix: &'static str,
    },

    /// An owned child failed to parse and was left out.
    #[error("Skipped <{tag}> in {parent}: {reason}")]
    SkippedEntity {
        tag: String,
        parent: String,
        reason: String,
    },
}
