//! Configuration constants, validation functions and parse options.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ModelError, Result};

/// Namespace of the OME root and experiment elements (2010-04).
pub const OME_NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/OME/2010-04";

/// Namespace of the screen/plate/well elements (2010-04).
pub const SPW_NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/SPW/2010-04";

/// Namespace of the structured annotation elements (2010-04).
pub const SA_NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/SA/2010-04";

/// Name of the identifying attribute, on entities and on reference stubs.
pub const ID_ATTRIBUTE: &str = "ID";

/// Maximum accepted document size in bytes (256 MB).
///
/// Plate screens with many wells and annotations reach tens of megabytes;
/// the limit guards against exhausting memory on accidental input.
pub const MAX_DOCUMENT_SIZE: usize = 256 * 1024 * 1024;

/// Default maximum element nesting depth.
///
/// The deepest 2010-04 path (OME/Plate/Well/WellSample) is four levels.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Indentation width of serialized XML.
pub const INDENT_WIDTH: usize = 2;

/// LSID-style ID: optional `urn:lsid:<authority>:` prefix, then `<Prefix>:<suffix>`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:urn:lsid:(?:[\w\-.]+\.[\w\-.]+)+:)?(\w+):\S+$").expect("valid regex")
});

/// Check whether an ID follows the LSID convention for `prefix`.
///
/// # Examples
/// ```
/// use omexml::config::is_conforming_id;
///
/// assert!(is_conforming_id("Reagent", "Reagent:1"));
/// assert!(is_conforming_id("Reagent", "urn:lsid:example.org:Reagent:1"));
/// assert!(!is_conforming_id("Reagent", "Well:1"));
/// assert!(!is_conforming_id("Reagent", "1"));
/// ```
#[must_use]
pub fn is_conforming_id(prefix: &str, id: &str) -> bool {
    ID_PATTERN
        .captures(id)
        .and_then(|caps| caps.get(1))
        .is_some_and(|m| m.as_str() == prefix)
}

/// xsd:double lexical form: decimal or exponent notation, `INF`, `-INF` or `NaN`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOUBLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?|-?INF|NaN)$")
        .expect("valid regex")
});

/// Check whether `raw` is a literal of the schema's double type.
///
/// Rust's own float syntax is wider (`inf`, `infinity`, `nan`) and is not
/// accepted here.
///
/// # Examples
/// ```
/// use omexml::config::is_double_literal;
///
/// assert!(is_double_literal("1.5e-3"));
/// assert!(is_double_literal("-INF"));
/// assert!(!is_double_literal("inf"));
/// ```
#[must_use]
pub fn is_double_literal(raw: &str) -> bool {
    DOUBLE_PATTERN.is_match(raw)
}

/// Validate the size of an input document.
///
/// # Errors
/// Returns `ModelError::DocumentTooLarge` if `size` exceeds [`MAX_DOCUMENT_SIZE`].
pub fn validate_document_size(size: usize) -> Result<()> {
    if size > MAX_DOCUMENT_SIZE {
        return Err(ModelError::DocumentTooLarge {
            size,
            max: MAX_DOCUMENT_SIZE,
        });
    }
    Ok(())
}

/// Options controlling a parse session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fail instead of warning when an element name does not match its kind.
    pub strict_tag_names: bool,

    /// Leave out owned children that fail to parse instead of failing the parent.
    pub skip_invalid_entities: bool,

    /// Maximum element nesting depth.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_tag_names: false,
            skip_invalid_entities: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Set strict tag name checking.
    #[must_use]
    pub fn with_strict_tag_names(mut self, strict: bool) -> Self {
        self.strict_tag_names = strict;
        self
    }

    /// Set whether invalid children are skipped.
    #[must_use]
    pub fn with_skip_invalid_entities(mut self, skip: bool) -> Self {
        self.skip_invalid_entities = skip;
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_double_literal() {
        for raw in ["0", "-0.5", "+3.", ".25", "1e300", "6.02E+23", "INF", "-INF", "NaN"] {
            assert!(is_double_literal(raw), "{raw:?} should be accepted");
        }
        for raw in ["", "inf", "infinity", "+INF", "nan", "1e", "e5", "1.5f", "0x10", " 1"] {
            assert!(!is_double_literal(raw), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_is_conforming_id_valid() {
        assert!(is_conforming_id("Reagent", "Reagent:0"));
        assert!(is_conforming_id("Plate", "Plate:abc-123"));
        assert!(is_conforming_id(
            "Annotation",
            "urn:lsid:openmicroscopy.org:Annotation:42"
        ));
    }

    #[test]
    fn test_is_conforming_id_invalid() {
        assert!(!is_conforming_id("Reagent", ""));
        assert!(!is_conforming_id("Reagent", "Reagent:"));
        assert!(!is_conforming_id("Reagent", "Reagent: 1"));
        assert!(!is_conforming_id("Reagent", "reagent:1"));
        assert!(!is_conforming_id("Well", "WellSample:1"));
    }

    #[test]
    fn test_validate_document_size() {
        assert!(validate_document_size(1024).is_ok());
        assert!(validate_document_size(MAX_DOCUMENT_SIZE).is_ok());
        assert!(matches!(
            validate_document_size(MAX_DOCUMENT_SIZE + 1),
            Err(ModelError::DocumentTooLarge { .. })
        ));
    }

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::default()
            .with_strict_tag_names(true)
            .with_skip_invalid_entities(true)
            .with_max_depth(8);

        assert!(options.strict_tag_names);
        assert!(options.skip_invalid_entities);
        assert_eq!(options.max_depth, 8);
        assert!(!ParseOptions::default().strict_tag_names);
    }
}
