//! Read helpers over roxmltree nodes.
//!
//! Element matching is by local name only. OME-XML documents mix default
//! namespace declarations and prefixes freely, and the kind catalog keys its
//! properties on the unqualified tag.

use roxmltree::Node;

/// Local part of an element's tag.
///
/// ```
/// use roxmltree::Document;
/// use omexml::xml::local_name;
///
/// let xml = r#"<SPW:Plate xmlns:SPW="http://www.openmicroscopy.org/Schemas/SPW/2010-04"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(local_name(doc.root_element()), "Plate");
/// ```
pub fn local_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Whether `node` is an element whose local name is `name`.
pub fn is_element_named(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && local_name(node) == name
}

/// Direct element children, skipping text, comments and processing
/// instructions.
pub fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

/// Direct element children named `name`, in document order.
///
/// Grandchildren with the same name belong to a nested entity and are not
/// returned.
///
/// ```
/// use roxmltree::Document;
/// use omexml::xml::child_elements_named;
///
/// let xml = r#"<Plate><Well/><Description/><Well><Well/></Well></Plate>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// assert_eq!(child_elements_named(doc.root_element(), "Well").count(), 2);
/// ```
pub fn child_elements_named<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    child_elements(node).filter(move |child| local_name(*child) == name)
}

/// Concatenated descendant text of an element, untrimmed.
///
/// CDATA sections count as text.
pub fn element_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}
