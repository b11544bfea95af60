//! Kind catalog for the 2010-04 schema release.

use super::registry::SchemaRegistry;
use super::types::{EntityKind, KindSpec, PropertySpec, ValueType};
use crate::config::{OME_NAMESPACE, SA_NAMESPACE, SPW_NAMESPACE};
use crate::enums::EnumKind;

/// Create the kind registry for OME-XML 2010-04.
///
/// Covers the screen/plate/well hierarchy, experiments and structured
/// annotations:
///
/// ```text
/// OME
/// ├── Screen ── Reagent
/// ├── Plate
/// │   ├── Well ── WellSample
/// │   └── PlateAcquisition
/// ├── Experiment
/// ├── Experimenter
/// └── StructuredAnnotations
///     └── CommentAnnotation, TagAnnotation, LongAnnotation, ...
/// ```
///
/// Reference properties (`AnnotationRef`, `PlateRef`, `ReagentRef`, ...) link
/// across this tree and keep back-references on their targets.
#[must_use]
pub fn create_2010_04_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();

    registry.register(KindSpec::new(EntityKind::Ome, OME_NAMESPACE).with_properties([
        PropertySpec::attribute("UUID"),
        PropertySpec::attribute("Creator"),
        PropertySpec::children(EntityKind::Plate),
        PropertySpec::children(EntityKind::Screen),
        PropertySpec::children(EntityKind::Experiment),
        PropertySpec::children(EntityKind::Experimenter),
        PropertySpec::children(EntityKind::StructuredAnnotations).singular(),
    ]));

    // Screen/plate/well
    registry.register(
        KindSpec::new(EntityKind::Screen, SPW_NAMESPACE)
            .with_id_prefix("Screen")
            .with_properties([
                PropertySpec::attribute("ID"),
                PropertySpec::attribute("Name"),
                PropertySpec::attribute("ProtocolIdentifier"),
                PropertySpec::attribute("ProtocolDescription"),
                PropertySpec::attribute("ReagentSetDescription"),
                PropertySpec::attribute("ReagentSetIdentifier"),
                PropertySpec::attribute("Type"),
                PropertySpec::element("Description", ValueType::String),
                PropertySpec::children(EntityKind::Reagent),
                PropertySpec::reference("PlateRef", [EntityKind::Plate], "Screen"),
                PropertySpec::reference("AnnotationRef", EntityKind::ANNOTATIONS, "Screen"),
            ]),
    );

    registry.register(
        KindSpec::new(EntityKind::Reagent, SPW_NAMESPACE)
            .with_id_prefix("Reagent")
            .with_properties([
                PropertySpec::attribute("ReagentIdentifier"),
                PropertySpec::attribute("ID"),
                PropertySpec::attribute("Name"),
                PropertySpec::element("Description", ValueType::String),
                PropertySpec::reference("AnnotationRef", EntityKind::ANNOTATIONS, "Reagent"),
            ]),
    );

    registry.register(
        KindSpec::new(EntityKind::Plate, SPW_NAMESPACE)
            .with_id_prefix("Plate")
            .with_properties([
                PropertySpec::attribute("ID"),
                PropertySpec::attribute("Name"),
                PropertySpec::attribute("Status"),
                PropertySpec::attribute("ExternalIdentifier"),
                PropertySpec::typed_attribute(
                    "ColumnNamingConvention",
                    ValueType::Enum(EnumKind::NamingConvention),
                ),
                PropertySpec::typed_attribute(
                    "RowNamingConvention",
                    ValueType::Enum(EnumKind::NamingConvention),
                ),
                PropertySpec::typed_attribute("WellOriginX", ValueType::Float),
                PropertySpec::typed_attribute("WellOriginY", ValueType::Float),
                PropertySpec::typed_attribute("Rows", ValueType::Integer),
                PropertySpec::typed_attribute("Columns", ValueType::Integer),
                PropertySpec::element("Description", ValueType::String),
                PropertySpec::children(EntityKind::Well),
                PropertySpec::reference("AnnotationRef", EntityKind::ANNOTATIONS, "Plate"),
                PropertySpec::children(EntityKind::PlateAcquisition),
            ]),
    );

    registry.register(
        KindSpec::new(EntityKind::Well, SPW_NAMESPACE)
            .with_id_prefix("Well")
            .with_properties([
                PropertySpec::attribute("ID"),
                PropertySpec::typed_attribute("Column", ValueType::Integer),
                PropertySpec::typed_attribute("Row", ValueType::Integer),
                PropertySpec::attribute("ExternalDescription"),
                PropertySpec::attribute("ExternalIdentifier"),
                PropertySpec::attribute("Type"),
                PropertySpec::typed_attribute("Color", ValueType::Integer),
                PropertySpec::children(EntityKind::WellSample),
                PropertySpec::reference("ReagentRef", [EntityKind::Reagent], "Well").singular(),
                PropertySpec::reference("AnnotationRef", EntityKind::ANNOTATIONS, "Well"),
            ]),
    );

    registry.register(
        KindSpec::new(EntityKind::WellSample, SPW_NAMESPACE)
            .with_id_prefix("WellSample")
            .with_properties([
                PropertySpec::attribute("ID"),
                PropertySpec::typed_attribute("PosX", ValueType::Float),
                PropertySpec::typed_attribute("PosY", ValueType::Float),
                PropertySpec::attribute("Timepoint"),
                PropertySpec::typed_attribute("Index", ValueType::Integer),
                PropertySpec::reference("AnnotationRef", EntityKind::ANNOTATIONS, "WellSample"),
            ]),
    );

    registry.register(
        KindSpec::new(EntityKind::PlateAcquisition, SPW_NAMESPACE)
            .with_id_prefix("PlateAcquisition")
            .with_properties([
                PropertySpec::attribute("ID"),
                PropertySpec::attribute("Name"),
                PropertySpec::attribute("StartTime"),
                PropertySpec::attribute("EndTime"),
                PropertySpec::typed_attribute("MaximumFieldCount", ValueType::Integer),
                PropertySpec::element("Description", ValueType::String),
                PropertySpec::reference(
                    "WellSampleRef",
                    [EntityKind::WellSample],
                    "PlateAcquisition",
                ),
                PropertySpec::reference(
                    "AnnotationRef",
                    EntityKind::ANNOTATIONS,
                    "PlateAcquisition",
                ),
            ]),
    );

    // Experiments
    registry.register(
        KindSpec::new(EntityKind::Experiment, OME_NAMESPACE)
            .with_id_prefix("Experiment")
            .with_properties([
                PropertySpec::attribute("ID"),
                PropertySpec::typed_attribute("Type", ValueType::Enum(EnumKind::ExperimentType)),
                PropertySpec::element("Description", ValueType::String),
                PropertySpec::reference("ExperimenterRef", [EntityKind::Experimenter], "Experiment")
                    .singular(),
            ]),
    );

    registry.register(
        KindSpec::new(EntityKind::Experimenter, OME_NAMESPACE)
            .with_id_prefix("Experimenter")
            .with_properties([
                PropertySpec::attribute("ID"),
                PropertySpec::attribute("FirstName"),
                PropertySpec::attribute("MiddleName"),
                PropertySpec::attribute("LastName"),
                PropertySpec::attribute("Email"),
                PropertySpec::attribute("Institution"),
                PropertySpec::attribute("UserName"),
                PropertySpec::reference("AnnotationRef", EntityKind::ANNOTATIONS, "Experimenter"),
            ]),
    );

    // Structured annotations
    registry.register(
        KindSpec::new(EntityKind::StructuredAnnotations, SA_NAMESPACE).with_properties(
            EntityKind::ANNOTATIONS.map(PropertySpec::children),
        ),
    );

    for (kind, value_type) in [
        (EntityKind::CommentAnnotation, ValueType::String),
        (EntityKind::TagAnnotation, ValueType::String),
        (EntityKind::LongAnnotation, ValueType::Integer),
        (EntityKind::DoubleAnnotation, ValueType::Float),
        (EntityKind::BooleanAnnotation, ValueType::Boolean),
        (EntityKind::TimestampAnnotation, ValueType::String),
    ] {
        registry.register(
            KindSpec::new(kind, SA_NAMESPACE)
                .with_id_prefix("Annotation")
                .with_properties([
                    PropertySpec::attribute("ID"),
                    PropertySpec::attribute("Namespace"),
                    PropertySpec::element("Value", value_type),
                ]),
        );
    }

    registry
}
