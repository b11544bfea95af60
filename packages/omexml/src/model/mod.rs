//! In-memory object graph.
//!
//! A [`ModelGraph`] is an arena of [`Entity`] nodes addressed by
//! [`EntityId`] handles. Owned children, reference links and
//! back-references all store handles, so the graph has no reference cycles
//! at the ownership level even though links may form arbitrary shapes.

mod entity;
mod graph;
mod value;

pub use entity::{Entity, EntityId, PropertyValue};
pub use graph::{GraphSummary, ModelGraph};
pub use value::Value;
