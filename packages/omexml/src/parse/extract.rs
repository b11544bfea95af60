//! Property extraction and value coercion.
//!
//! Each function takes the element of an entity and one property descriptor
//! and returns what the descriptor finds there. Nothing here touches the
//! graph; the engine decides what to do with the result.

use roxmltree::Node;

use crate::config::{is_double_literal, ID_ATTRIBUTE};
use crate::error::{ModelError, Result};
use crate::model::Value;
use crate::schema::{EntityKind, PropertySpec, Schema, ValueType};
use crate::xml::{child_elements_named, element_text};

/// Coerce raw XML text to the declared type of a property.
///
/// Strings are kept verbatim. Numbers and booleans have surrounding
/// whitespace removed first; floats follow xsd:double (`INF`, `-INF`, `NaN`
/// and exponent notation) and booleans accept `true`, `1`, `false` and `0`.
/// Enumeration literals are matched exactly.
///
/// # Errors
/// Returns `ModelError::InvalidValue` for unparseable numbers and booleans,
/// or `ModelError::Enumeration` for a literal outside its enumeration.
pub fn coerce(
    schema: &Schema,
    entity: EntityKind,
    property: &str,
    value_type: ValueType,
    raw: &str,
) -> Result<Value> {
    let invalid = || ModelError::InvalidValue {
        entity,
        property: property.to_string(),
        value: raw.to_string(),
        expected: value_type,
    };

    match value_type {
        ValueType::String => Ok(Value::String(raw.to_string())),
        ValueType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid()),
        ValueType::Float => {
            let trimmed = raw.trim();
            match trimmed {
                "INF" => Ok(Value::Float(f64::INFINITY)),
                "-INF" => Ok(Value::Float(f64::NEG_INFINITY)),
                "NaN" => Ok(Value::Float(f64::NAN)),
                _ if is_double_literal(trimmed) => {
                    trimmed.parse::<f64>().map(Value::Float).map_err(|_| invalid())
                }
                _ => Err(invalid()),
            }
        }
        ValueType::Boolean => match raw.trim() {
            "true" | "1" => Ok(Value::Boolean(true)),
            "false" | "0" => Ok(Value::Boolean(false)),
            _ => Err(invalid()),
        },
        ValueType::Enum(kind) => schema
            .enumerations()
            .resolve(kind, raw)
            .map(Value::Enum)
            .map_err(|source| ModelError::Enumeration {
                entity,
                property: property.to_string(),
                source,
            }),
    }
}

/// Raw value of an attribute property, if present.
pub fn extract_attribute<'a>(node: Node<'a, '_>, property: &PropertySpec) -> Option<&'a str> {
    node.attribute(property.name)
}

/// Text of a simple child element.
///
/// Returns `None` when the element is absent.
///
/// # Errors
/// Returns `ModelError::Cardinality` if the element occurs more than once.
pub fn extract_simple_element(
    node: Node<'_, '_>,
    entity: EntityKind,
    property: &PropertySpec,
) -> Result<Option<String>> {
    let matches: Vec<_> = child_elements_named(node, property.name).collect();
    match matches.as_slice() {
        [] => Ok(None),
        [element] => Ok(Some(element_text(*element))),
        _ => Err(ModelError::Cardinality {
            entity,
            tag: property.name.to_string(),
            count: matches.len(),
        }),
    }
}

/// Elements of a complex child property, in document order.
///
/// # Errors
/// Returns `ModelError::Cardinality` if a singular child occurs more than once.
pub fn extract_child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    entity: EntityKind,
    property: &PropertySpec,
) -> Result<Vec<Node<'a, 'input>>> {
    let matches: Vec<_> = child_elements_named(node, property.name).collect();
    check_singular(entity, property, matches.len())?;
    Ok(matches)
}

/// Target IDs of the reference stubs of a property, in document order.
///
/// # Errors
/// Returns `ModelError::MissingAttribute` for a stub without `ID`, or
/// `ModelError::Cardinality` if a singular reference occurs more than once.
pub fn extract_reference_ids<'a>(
    node: Node<'a, '_>,
    entity: EntityKind,
    property: &PropertySpec,
) -> Result<Vec<&'a str>> {
    let ids = child_elements_named(node, property.name)
        .map(|stub| {
            stub.attribute(ID_ATTRIBUTE).ok_or_else(|| ModelError::MissingAttribute {
                element: property.name.to_string(),
                attribute: ID_ATTRIBUTE.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    check_singular(entity, property, ids.len())?;
    Ok(ids)
}

fn check_singular(entity: EntityKind, property: &PropertySpec, count: usize) -> Result<()> {
    if property.is_singular() && count > 1 {
        return Err(ModelError::Cardinality {
            entity,
            tag: property.name.to_string(),
            count,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{EnumKind, NamingConvention};
    use roxmltree::Document;

    fn schema() -> &'static Schema {
        Schema::v2010_04()
    }

    fn spec(kind: EntityKind, name: &str) -> &'static PropertySpec {
        schema().kind(kind).unwrap().property(name).unwrap()
    }

    #[test]
    fn test_coerce_string_verbatim() {
        let value = coerce(schema(), EntityKind::Reagent, "Name", ValueType::String, "  x ").unwrap();
        assert_eq!(value, Value::from("  x "));
    }

    #[test]
    fn test_coerce_numbers_trimmed() {
        let value = coerce(schema(), EntityKind::Plate, "Rows", ValueType::Integer, " 16\n").unwrap();
        assert_eq!(value, Value::Integer(16));

        let value = coerce(schema(), EntityKind::Plate, "WellOriginX", ValueType::Float, "0.5").unwrap();
        assert_eq!(value, Value::Float(0.5));

        let err = coerce(schema(), EntityKind::Plate, "Rows", ValueType::Integer, "1.5").unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidValue { expected: ValueType::Integer, .. }
        ));
    }

    #[test]
    fn test_coerce_float_schema_literals() {
        let coerce_float =
            |raw| coerce(schema(), EntityKind::Plate, "WellOriginX", ValueType::Float, raw);

        assert_eq!(coerce_float("INF").unwrap(), Value::Float(f64::INFINITY));
        assert_eq!(coerce_float(" -INF ").unwrap(), Value::Float(f64::NEG_INFINITY));
        assert!(coerce_float("NaN").unwrap().as_f64().is_some_and(f64::is_nan));
        assert_eq!(coerce_float("1e300").unwrap(), Value::Float(1e300));
        assert_eq!(coerce_float(".5").unwrap(), Value::Float(0.5));

        for raw in ["inf", "infinity", "-inf", "nan", "+INF"] {
            let err = coerce_float(raw).unwrap_err();
            assert!(
                matches!(err, ModelError::InvalidValue { expected: ValueType::Float, .. }),
                "raw {raw:?}"
            );
        }
    }

    #[test]
    fn test_coerce_boolean() {
        for (raw, expected) in [("true", true), ("1", true), (" false ", false), ("0", false)] {
            let value =
                coerce(schema(), EntityKind::BooleanAnnotation, "Value", ValueType::Boolean, raw)
                    .unwrap();
            assert_eq!(value, Value::Boolean(expected), "raw {raw:?}");
        }
        assert!(coerce(schema(), EntityKind::BooleanAnnotation, "Value", ValueType::Boolean, "yes")
            .is_err());
    }

    #[test]
    fn test_coerce_enum_exact() {
        let vt = ValueType::Enum(EnumKind::NamingConvention);
        let value = coerce(schema(), EntityKind::Plate, "RowNamingConvention", vt, "letter").unwrap();
        assert_eq!(value, Value::from(NamingConvention::Letter));

        let err = coerce(schema(), EntityKind::Plate, "RowNamingConvention", vt, "Letter").unwrap_err();
        assert!(matches!(err, ModelError::Enumeration { entity: EntityKind::Plate, .. }));
    }

    #[test]
    fn test_extract_attribute() {
        let doc = Document::parse(r#"<Reagent ID="Reagent:1" Name=""/>"#).unwrap();
        let root = doc.root_element();

        assert_eq!(extract_attribute(root, spec(EntityKind::Reagent, "ID")), Some("Reagent:1"));
        assert_eq!(extract_attribute(root, spec(EntityKind::Reagent, "Name")), Some(""));
        assert_eq!(
            extract_attribute(root, spec(EntityKind::Reagent, "ReagentIdentifier")),
            None
        );
    }

    #[test]
    fn test_extract_simple_element_cardinality() {
        let description = spec(EntityKind::Reagent, "Description");

        let doc = Document::parse("<Reagent/>").unwrap();
        assert_eq!(
            extract_simple_element(doc.root_element(), EntityKind::Reagent, description).unwrap(),
            None
        );

        let doc = Document::parse("<Reagent><Description>a</Description></Reagent>").unwrap();
        assert_eq!(
            extract_simple_element(doc.root_element(), EntityKind::Reagent, description).unwrap(),
            Some("a".to_string())
        );

        let doc = Document::parse(
            "<Reagent><Description>a</Description><Description>b</Description></Reagent>",
        )
        .unwrap();
        let err = extract_simple_element(doc.root_element(), EntityKind::Reagent, description)
            .unwrap_err();
        assert!(matches!(err, ModelError::Cardinality { count: 2, ref tag, .. } if tag == "Description"));
    }

    #[test]
    fn test_extract_reference_ids() {
        let doc = Document::parse(
            r#"<Reagent><AnnotationRef ID="A1"/><AnnotationRef ID="A2"/></Reagent>"#,
        )
        .unwrap();
        let ids = extract_reference_ids(
            doc.root_element(),
            EntityKind::Reagent,
            spec(EntityKind::Reagent, "AnnotationRef"),
        )
        .unwrap();
        assert_eq!(ids, vec!["A1", "A2"]);
    }

    #[test]
    fn test_extract_reference_ids_errors() {
        let reagent_ref = spec(EntityKind::Well, "ReagentRef");

        let doc = Document::parse(r#"<Well><ReagentRef/></Well>"#).unwrap();
        let err = extract_reference_ids(doc.root_element(), EntityKind::Well, reagent_ref)
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingAttribute { .. }));

        let doc = Document::parse(r#"<Well><ReagentRef ID="R1"/><ReagentRef ID="R2"/></Well>"#)
            .unwrap();
        let err = extract_reference_ids(doc.root_element(), EntityKind::Well, reagent_ref)
            .unwrap_err();
        assert!(matches!(err, ModelError::Cardinality { count: 2, .. }));
    }

    #[test]
    fn test_extract_child_elements() {
        let doc = Document::parse(
            "<OME><StructuredAnnotations/><StructuredAnnotations/></OME>",
        )
        .unwrap();
        let err = extract_child_elements(
            doc.root_element(),
            EntityKind::Ome,
            spec(EntityKind::Ome, "StructuredAnnotations"),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Cardinality { .. }));

        let doc = Document::parse("<Plate><Well/><Description/><Well/></Plate>").unwrap();
        let wells = extract_child_elements(
            doc.root_element(),
            EntityKind::Plate,
            spec(EntityKind::Plate, "Well"),
        )
        .unwrap();
        assert_eq!(wells.len(), 2);
    }
}
