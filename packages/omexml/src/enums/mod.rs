//! Enumeration registry.
//!
//! Schema-defined enumerated strings are resolved to typed members through an
//! [`EnumerationRegistry`] built once per schema version.

mod registry;
mod types;

pub use registry::EnumerationRegistry;
pub use types::{EnumKind, EnumValue, ExperimentType, NamingConvention};
