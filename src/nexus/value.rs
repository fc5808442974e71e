//! Field and attribute values held by a NeXus tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A loosely-typed NeXus value.
///
/// Beamlines are not consistent about types: numbers arrive as scalars,
/// one-element arrays or strings, so the accessors coerce where a numeric
/// reading makes sense. Dump tools write `null` for empty values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NxValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Array(Vec<NxValue>),
}

impl NxValue {
    /// Returns the text of a string value or of a one-element string array.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NxValue::Text(s) => Some(s),
            NxValue::Array(items) if items.len() == 1 => items[0].as_str(),
            _ => None,
        }
    }

    /// Coerces a scalar (or a one-element array) to `f64`.
    ///
    /// Strings are parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NxValue::Null => None,
            NxValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            NxValue::Int(i) => Some(*i as f64),
            NxValue::Float(f) => Some(*f),
            NxValue::Text(s) => s.trim().parse().ok(),
            NxValue::Array(items) if items.len() == 1 => items[0].as_f64(),
            NxValue::Array(_) => None,
        }
    }

    /// Returns the first element of an array as `f64`, or the scalar itself.
    pub fn first_f64(&self) -> Option<f64> {
        match self {
            NxValue::Array(items) => items.first().and_then(NxValue::as_f64),
            scalar => scalar.as_f64(),
        }
    }

    /// Flattens the value into a vector of `f64`.
    ///
    /// Nested arrays are flattened in row-major order. Returns `None` if any
    /// element is not numeric.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        let mut out = Vec::new();
        self.flatten_into(&mut out)?;
        Some(out)
    }

    fn flatten_into(&self, out: &mut Vec<f64>) -> Option<()> {
        match self {
            NxValue::Array(items) => {
                for item in items {
                    item.flatten_into(out)?;
                }
            }
            scalar => out.push(scalar.as_f64()?),
        }
        Some(())
    }
}

impl fmt::Display for NxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NxValue::Null => Ok(()),
            NxValue::Bool(b) => write!(f, "{b}"),
            NxValue::Int(i) => write!(f, "{i}"),
            NxValue::Float(v) => write!(f, "{v}"),
            NxValue::Text(s) => f.write_str(s),
            NxValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for NxValue {
    fn from(value: &str) -> Self {
        NxValue::Text(value.to_string())
    }
}

impl From<f64> for NxValue {
    fn from(value: f64) -> Self {
        NxValue::Float(value)
    }
}

impl From<i64> for NxValue {
    fn from(value: i64) -> Self {
        NxValue::Int(value)
    }
}
