//! Writing a model graph back to XML.
//!
//! Every entity becomes one element in its kind's namespace. Attributes are
//! written first, then simple elements, owned children and reference stubs
//! in the order the kind declares them. Back-references are never written.

use crate::config::ID_ATTRIBUTE;
use crate::error::{ModelError, Result};
use crate::model::{EntityId, ModelGraph};
use crate::schema::{KindSpec, PropertyKind};
use crate::xml::{XmlDocument, XmlElement};

fn kind_spec<'s>(graph: &ModelGraph<'s>, id: EntityId) -> Result<&'s KindSpec> {
    let kind = graph.kind(id)?;
    graph
        .schema()
        .kind(kind)
        .ok_or(ModelError::UnknownKind(kind))
}

/// Serialize one entity and everything it owns.
///
/// # Errors
/// Returns `ModelError::MissingId` if a reference points at an entity
/// without ID.
pub fn as_xml_element(graph: &ModelGraph<'_>, id: EntityId) -> Result<XmlElement> {
    let spec = kind_spec(graph, id)?;
    let mut element = XmlElement::new_ns(spec.namespace, spec.tag());
    fill_xml_element(graph, id, &mut element)?;
    Ok(element)
}

/// Write the properties of an entity into an existing element.
///
/// Attributes replace same-named ones already present; elements are
/// appended after the existing children.
///
/// # Errors
/// Returns `ModelError::MissingId` if a reference points at an entity
/// without ID.
pub fn fill_xml_element(
    graph: &ModelGraph<'_>,
    id: EntityId,
    element: &mut XmlElement,
) -> Result<()> {
    let spec = kind_spec(graph, id)?;
    let entity = graph.get(id)?;

    for property in &spec.properties {
        if let PropertyKind::Attribute(_) = property.kind {
            if let Some(value) = entity.scalar(property.name) {
                element.set_attribute(property.name, value.to_string());
            }
        }
    }

    for property in &spec.properties {
        match &property.kind {
            PropertyKind::Attribute(_) => {}
            PropertyKind::Element(_) => {
                if let Some(value) = entity.scalar(property.name) {
                    element.append_child(
                        XmlElement::new_ns(spec.namespace, property.name)
                            .with_text(value.to_string()),
                    );
                }
            }
            PropertyKind::Child(_) => {
                for child in entity.children(property.name) {
                    element.append_child(as_xml_element(graph, *child)?);
                }
            }
            PropertyKind::Reference { .. } => {
                for target in entity.references(property.name) {
                    let target_id = graph
                        .get(*target)?
                        .id()
                        .ok_or_else(|| ModelError::MissingId(graph.describe(*target)))?;
                    element.append_child(
                        XmlElement::new_ns(spec.namespace, property.name)
                            .with_attribute(ID_ATTRIBUTE, target_id),
                    );
                }
            }
        }
    }

    Ok(())
}

/// Serialize the graph's single root entity as a document.
///
/// # Errors
/// Returns `ModelError::RootCount` unless exactly one entity has no owner.
pub fn to_xml_document(graph: &ModelGraph<'_>) -> Result<XmlDocument> {
    match graph.roots().as_slice() {
        [root] => Ok(XmlDocument::new(as_xml_element(graph, *root)?)),
        roots => Err(ModelError::RootCount(roots.len())),
    }
}

/// Serialize the graph as indented XML text.
///
/// # Errors
/// Returns an error if the graph cannot be turned into a document.
#[tracing::instrument(skip(graph), fields(entities = graph.len()))]
pub fn to_xml_string(graph: &ModelGraph<'_>) -> Result<String> {
    to_xml_document(graph)?.to_xml_string()
}
