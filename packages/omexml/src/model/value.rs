//! Scalar property values.

use std::fmt;

use crate::enums::{EnumValue, ExperimentType, NamingConvention};
use crate::schema::ValueType;

/// A coerced scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Enum(EnumValue),
}

impl Value {
    /// Check whether this value is of the declared type.
    #[must_use]
    pub fn matches(&self, value_type: ValueType) -> bool {
        match (self, value_type) {
            (Self::String(_), ValueType::String)
            | (Self::Integer(_), ValueType::Integer)
            | (Self::Float(_), ValueType::Float)
            | (Self::Boolean(_), ValueType::Boolean) => true,
            (Self::Enum(value), ValueType::Enum(kind)) => value.kind() == kind,
            _ => false,
        }
    }

    /// The string payload, for string values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<EnumValue> {
        match self {
            Self::Enum(value) => Some(*value),
            _ => None,
        }
    }
}

/// Renders the value as written to XML.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write_double(f, *x),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Enum(value) => f.write_str(value.as_str()),
        }
    }
}

/// Magnitudes outside this range are written in exponent notation.
const PLAIN_DOUBLE_RANGE: std::ops::Range<f64> = 1e-6..1e16;

/// Write a float as an xsd:double literal.
fn write_double(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        f.write_str("NaN")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "INF" } else { "-INF" })
    } else if x == 0.0 || PLAIN_DOUBLE_RANGE.contains(&x.abs()) {
        write!(f, "{x}")
    } else {
        write!(f, "{x:e}")
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Self::Enum(value)
    }
}

impl From<NamingConvention> for Value {
    fn from(value: NamingConvention) -> Self {
        Self::Enum(value.into())
    }
}

impl From<ExperimentType> for Value {
    fn from(value: ExperimentType) -> Self {
        Self::Enum(value.into())
    }
}
