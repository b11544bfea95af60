//! Typed enumerations defined by the OME-XML schema.
//!
//! Every literal is spelled exactly as it appears in the schema; parsing is
//! case-sensitive and does not trim.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Row/column naming convention of a plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum NamingConvention {
    #[strum(serialize = "letter")]
    Letter,

    #[strum(serialize = "number")]
    Number,
}

/// Kind of experiment performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum ExperimentType {
    #[strum(serialize = "FP")]
    Fp,
    #[strum(serialize = "FRET")]
    Fret,
    TimeLapse,
    FourDPlus,
    Screen,
    Immunocytochemistry,
    Immunofluorescence,
    #[strum(serialize = "FISH")]
    Fish,
    Electrophysiology,
    IonImaging,
    Colocalization,
    #[strum(serialize = "PGIDocumentation")]
    PgiDocumentation,
    FluorescenceLifetime,
    SpectralImaging,
    Photobleaching,
    Other,
}

/// Identifies one enumerated value domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum EnumKind {
    NamingConvention,
    ExperimentType,
}

/// A resolved enumeration member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValue {
    NamingConvention(NamingConvention),
    ExperimentType(ExperimentType),
}

impl EnumValue {
    /// The value domain this member belongs to.
    #[must_use]
    pub fn kind(&self) -> EnumKind {
        match self {
            Self::NamingConvention(_) => EnumKind::NamingConvention,
            Self::ExperimentType(_) => EnumKind::ExperimentType,
        }
    }

    /// The schema literal of this member.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NamingConvention(v) => v.into(),
            Self::ExperimentType(v) => v.into(),
        }
    }

    /// Convert a literal into a typed member of `kind`.
    ///
    /// Returns `None` if the literal is not a member.
    pub(crate) fn parse(kind: EnumKind, literal: &str) -> Option<Self> {
        match kind {
            EnumKind::NamingConvention => literal.parse().ok().map(Self::NamingConvention),
            EnumKind::ExperimentType => literal.parse().ok().map(Self::ExperimentType),
        }
    }
}

impl std::fmt::Display for EnumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<NamingConvention> for EnumValue {
    fn from(value: NamingConvention) -> Self {
        Self::NamingConvention(value)
    }
}

impl From<ExperimentType> for EnumValue {
    fn from(value: ExperimentType) -> Self {
        Self::ExperimentType(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_naming_convention_literals() {
        assert_eq!(NamingConvention::Letter.to_string(), "letter");
        assert_eq!(NamingConvention::from_str("number").unwrap(), NamingConvention::Number);
        assert!(NamingConvention::from_str("Letter").is_err());
    }

    #[test]
    fn test_experiment_type_literals() {
        assert_eq!(ExperimentType::Fret.to_string(), "FRET");
        assert_eq!(ExperimentType::PgiDocumentation.to_string(), "PGIDocumentation");
        assert_eq!(ExperimentType::from_str("TimeLapse").unwrap(), ExperimentType::TimeLapse);
        assert!(ExperimentType::from_str("fret").is_err());
    }

    #[test]
    fn test_enum_value_kind_and_literal() {
        let value = EnumValue::from(ExperimentType::Fish);
        assert_eq!(value.kind(), EnumKind::ExperimentType);
        assert_eq!(value.as_str(), "FISH");
        assert_eq!(value.to_string(), "FISH");
    }

    #[test]
    fn test_enum_value_parse() {
        assert_eq!(
            EnumValue::parse(EnumKind::NamingConvention, "letter"),
            Some(EnumValue::NamingConvention(NamingConvention::Letter))
        );
        assert_eq!(EnumValue::parse(EnumKind::NamingConvention, " letter"), None);
    }
}
