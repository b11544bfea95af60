//! Types describing entity kinds and their properties.

use std::fmt;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::enums::EnumKind;

/// Schema release a catalog describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SchemaVersion {
    #[strum(serialize = "2010-04")]
    V2010_04,
}

/// Closed catalog of entity kinds.
///
/// The string form of a kind is its element name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum EntityKind {
    #[strum(serialize = "OME")]
    #[serde(rename = "OME")]
    Ome,
    Screen,
    Reagent,
    Plate,
    Well,
    WellSample,
    PlateAcquisition,
    Experiment,
    Experimenter,
    StructuredAnnotations,
    CommentAnnotation,
    TagAnnotation,
    LongAnnotation,
    DoubleAnnotation,
    BooleanAnnotation,
    TimestampAnnotation,
}

impl EntityKind {
    /// All concrete annotation kinds, the targets of `AnnotationRef`.
    pub const ANNOTATIONS: [EntityKind; 6] = [
        Self::CommentAnnotation,
        Self::TagAnnotation,
        Self::LongAnnotation,
        Self::DoubleAnnotation,
        Self::BooleanAnnotation,
        Self::TimestampAnnotation,
    ];

    /// Element name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Check whether this kind is one of the annotation kinds.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        Self::ANNOTATIONS.contains(self)
    }
}

/// Semantic type of a scalar property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    Enum(EnumKind),
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("boolean"),
            Self::Enum(kind) => write!(f, "{kind}"),
        }
    }
}

/// How many times a property may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// 0..1
    Optional,
    /// 0..N
    Many,
}

/// Where a property lives in the XML and what it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    /// Scalar stored in an attribute.
    Attribute(ValueType),

    /// Scalar stored as the text of a child element.
    Element(ValueType),

    /// Owned child entity.
    Child(EntityKind),

    /// Non-owning link written as an ID stub element.
    Reference {
        /// Kinds the link may point at.
        targets: Vec<EntityKind>,
        /// Name of the reverse collection kept on the target.
        back_reference: &'static str,
    },
}

/// Declarative specification of one property of a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    /// Attribute or element name.
    pub name: &'static str,

    /// Location and content.
    pub kind: PropertyKind,

    /// Allowed number of occurrences.
    pub cardinality: Cardinality,
}

impl PropertySpec {
    /// Attribute property holding a string.
    #[must_use]
    pub fn attribute(name: &'static str) -> Self {
        Self::typed_attribute(name, ValueType::String)
    }

    /// Attribute property holding a value of `value_type`.
    #[must_use]
    pub fn typed_attribute(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            kind: PropertyKind::Attribute(value_type),
            cardinality: Cardinality::Optional,
        }
    }

    /// Simple (text-only) child element holding a value of `value_type`.
    #[must_use]
    pub fn element(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            kind: PropertyKind::Element(value_type),
            cardinality: Cardinality::Optional,
        }
    }

    /// Repeated owned children of `kind`, named after the kind.
    #[must_use]
    pub fn children(kind: EntityKind) -> Self {
        Self {
            name: kind.as_str(),
            kind: PropertyKind::Child(kind),
            cardinality: Cardinality::Many,
        }
    }

    /// Repeated reference stubs pointing at any of `targets`.
    #[must_use]
    pub fn reference(
        name: &'static str,
        targets: impl IntoIterator<Item = EntityKind>,
        back_reference: &'static str,
    ) -> Self {
        Self {
            name,
            kind: PropertyKind::Reference {
                targets: targets.into_iter().collect(),
                back_reference,
            },
            cardinality: Cardinality::Many,
        }
    }

    /// Restrict the property to at most one occurrence.
    #[must_use]
    pub fn singular(mut self) -> Self {
        self.cardinality = Cardinality::Optional;
        self
    }

    /// Check whether at most one occurrence is allowed.
    #[must_use]
    pub fn is_singular(&self) -> bool {
        self.cardinality == Cardinality::Optional
    }

    /// Scalar type, for attribute and simple element properties.
    #[must_use]
    pub fn value_type(&self) -> Option<ValueType> {
        match self.kind {
            PropertyKind::Attribute(value_type) | PropertyKind::Element(value_type) => {
                Some(value_type)
            }
            _ => None,
        }
    }
}

/// Declarative specification of an entity kind.
#[derive(Debug, Clone)]
pub struct KindSpec {
    /// The kind described.
    pub kind: EntityKind,

    /// Namespace URI of the kind's element and of its simple and stub elements.
    pub namespace: &'static str,

    /// Prefix expected in the kind's LSID-style IDs (e.g. "Reagent").
    pub id_prefix: Option<&'static str>,

    /// Properties in serialization order.
    pub properties: Vec<PropertySpec>,
}

impl KindSpec {
    /// Create a new kind specification without properties.
    #[must_use]
    pub fn new(kind: EntityKind, namespace: &'static str) -> Self {
        Self {
            kind,
            namespace,
            id_prefix: None,
            properties: Vec::new(),
        }
    }

    /// Set the ID prefix.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: &'static str) -> Self {
        self.id_prefix = Some(prefix);
        self
    }

    /// Set the properties.
    #[must_use]
    pub fn with_properties(mut self, properties: impl IntoIterator<Item = PropertySpec>) -> Self {
        self.properties = properties.into_iter().collect();
        self
    }

    /// Element name of the kind.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Look up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Reverse side of a reference property, derived when the kind is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackReferenceSpec {
    /// Name of the collection on the target.
    pub name: &'static str,

    /// Kind declaring the forward reference.
    pub source: EntityKind,

    /// Name of the forward reference property on `source`.
    pub forward: &'static str,
}
