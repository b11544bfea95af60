//! OME-XML object-graph mapper.
//!
//! This crate converts OME-XML metadata documents into a typed,
//! cross-referenced object graph and writes such graphs back to XML. The
//! mapping is driven by a per-version catalog of entity kinds rather than by
//! one type per element.
//!
//! # Example
//!
//! ```
//! use omexml::{parse_document, to_xml_string, Schema};
//!
//! let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2010-04">
//!   <Plate xmlns="http://www.openmicroscopy.org/Schemas/SPW/2010-04" ID="Plate:1">
//!     <Well ID="Well:1" Row="0" Column="0"><ReagentRef ID="Reagent:1"/></Well>
//!   </Plate>
//!   <Screen xmlns="http://www.openmicroscopy.org/Schemas/SPW/2010-04" ID="Screen:1">
//!     <Reagent ID="Reagent:1" Name="siRNA"/>
//!   </Screen>
//! </OME>"#;
//!
//! let parsed = parse_document(xml, Schema::v2010_04()).unwrap();
//! let graph = &parsed.graph;
//!
//! let reagent = graph.lookup("Reagent:1").unwrap();
//! let well = graph.lookup("Well:1").unwrap();
//! assert_eq!(graph.copy_linked(reagent, "Well").unwrap(), vec![well]);
//!
//! let output = to_xml_string(graph).unwrap();
//! assert!(output.contains(r#"<ReagentRef ID="Reagent:1"/>"#));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Namespace constants, limits, ID validation and parse options
//! - [`error`]: Error and warning types and Result alias
//! - [`enums`]: Typed enumerations and the enumeration registry
//! - [`schema`]: Entity kinds, property descriptors and the 2010-04 catalog
//! - [`xml`]: DOM helpers and the output element tree
//! - [`model`]: The arena object graph and its link API
//! - [`parse`]: Two-phase parsing and reference resolution
//! - [`serialize`]: Writing graphs back to XML
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod enums;
pub mod error;
pub mod model;
pub mod parse;
pub mod schema;
pub mod serialize;
pub mod xml;

// Re-export main functions
pub use parse::{parse_document, parse_document_with_options};
pub use serialize::{as_xml_element, fill_xml_element, to_xml_document, to_xml_string};

// Re-export commonly used items
pub use config::ParseOptions;
pub use error::{EnumerationError, ModelError, ParseWarning, Result};
pub use model::{Entity, EntityId, ModelGraph, Value};
pub use parse::{ParseSession, ParsedModel, ResolutionReport};
pub use schema::{EntityKind, Schema};
