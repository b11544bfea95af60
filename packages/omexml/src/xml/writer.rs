//! Owned output tree and its serialization to XML text.
//!
//! Serialization builds an [`XmlElement`] tree, which is then written with
//! quick-xml. Each element carries its namespace URI; a default namespace
//! declaration is emitted wherever the namespace differs from the parent's.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;

use crate::config::INDENT_WIDTH;
use crate::error::Result;

/// A node in the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// A namespace-qualified element with attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element without namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an element in `namespace`.
    #[must_use]
    pub fn new_ns(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.namespace = Some(namespace.into());
        element
    }

    /// The element name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace URI, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Set an attribute (builder form).
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Replace all children with a single text node.
    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.children = vec![XmlNode::Text(text.into())];
    }

    /// Replace all children with a single text node (builder form).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text_content(text);
        self
    }

    /// Append a child element.
    pub fn append_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// All child nodes.
    #[must_use]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child elements, in order.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated text of this element and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(t) => text.push_str(t),
                XmlNode::Element(element) => text.push_str(&element.text_content()),
            }
        }
        text
    }

    fn write<W: Write>(&self, writer: &mut Writer<W>, inherited_ns: Option<&str>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        if self.namespace.as_deref() != inherited_ns {
            start.push_attribute(("xmlns", self.namespace.as_deref().unwrap_or("")));
        }
        for (key, value) in &self.attributes {
            start.push_attribute(Attribute {
                key: QName(key.as_bytes()),
                value: Cow::Owned(escape_attribute(value).into_bytes()),
            });
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for node in &self.children {
            match node {
                XmlNode::Text(text) => {
                    writer.write_event(Event::Text(BytesText::from_escaped(escape_text(text))))?;
                }
                XmlNode::Element(child) => child.write(writer, self.namespace.as_deref())?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// Escape an attribute value so that a parser's attribute-value
/// normalization gives back the same string.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
        .replace('\r', "&#13;")
}

/// Escape character data. A literal carriage return would be folded by
/// end-of-line handling.
fn escape_text(text: &str) -> String {
    escape(text).replace('\r', "&#13;")
}

/// An output document with a single root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// Create a document around `root`.
    #[must_use]
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// The document element.
    #[must_use]
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Take the document element.
    #[must_use]
    pub fn into_root(self) -> XmlElement {
        self.root
    }

    /// Write the document as indented XML with a UTF-8 declaration.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn write_to<W: Write>(&self, output: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(output, b' ', INDENT_WIDTH);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.root.write(&mut writer, None)?;
        writer.into_inner().write_all(b"\n")?;
        Ok(())
    }

    /// Render the document as an XML string.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}
