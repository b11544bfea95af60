//! Reading XML into a model graph.
//!
//! Parsing runs in two phases. The first walks the element tree, creating
//! one entity per element and queueing a [`PendingReference`] for every
//! reference stub. The second resolves the queued stubs against the ID
//! index of the complete graph, so forward references work regardless of
//! document order.

mod engine;
mod extract;
mod resolver;

pub use engine::{ParseSession, ParsedModel};
pub use extract::coerce;
pub use resolver::{resolve_references, PendingReference, ResolutionReport};

use crate::config::{validate_document_size, ParseOptions};
use crate::error::Result;
use crate::schema::Schema;

/// Parse an XML document with default options.
///
/// # Errors
/// Returns an error if the document is not well-formed, its root element
/// does not name a kind, or any entity fails to parse.
///
/// # Examples
/// ```
/// use omexml::parse::parse_document;
/// use omexml::schema::Schema;
///
/// let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2010-04">
///   <Plate xmlns="http://www.openmicroscopy.org/Schemas/SPW/2010-04" ID="Plate:1" Rows="8"/>
/// </OME>"#;
///
/// let parsed = parse_document(xml, Schema::v2010_04()).unwrap();
/// assert_eq!(parsed.graph.len(), 2);
/// assert!(parsed.resolution.is_complete());
/// ```
pub fn parse_document<'s>(xml: &str, schema: &'s Schema) -> Result<ParsedModel<'s>> {
    parse_document_with_options(xml, schema, ParseOptions::default())
}

/// Parse an XML document.
///
/// Reference resolution failures do not fail the parse; they are reported
/// in [`ParsedModel::resolution`].
///
/// # Errors
/// Returns an error if the document is too large or not well-formed, its
/// root element does not name a kind, or any entity fails to parse.
#[tracing::instrument(skip(xml, schema), fields(size = xml.len()))]
pub fn parse_document_with_options<'s>(
    xml: &str,
    schema: &'s Schema,
    options: ParseOptions,
) -> Result<ParsedModel<'s>> {
    validate_document_size(xml.len())?;
    let doc = roxmltree::Document::parse(xml)?;

    let mut session = ParseSession::with_options(schema, options);
    session.instantiate_root(doc.root_element())?;
    Ok(session.finish())
}
