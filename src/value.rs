//! Option kinds, typed option values and the untyped values a host hands in.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::OptionsError;
use crate::name::Name;

/// Declared kind of an option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Bool,
    Int,
    Unsigned,
    Double,
    String,
    /// Structured option owned by another subsystem; never storable here.
    SExpr,
}

impl OptionKind {
    /// Return the canonical string atom for this kind.
    pub fn as_atom(self) -> &'static str {
        match self {
            OptionKind::Bool => "bool",
            OptionKind::Int => "int",
            OptionKind::Unsigned => "unsigned",
            OptionKind::Double => "double",
            OptionKind::String => "string",
            OptionKind::SExpr => "sexpr",
        }
    }

    /// Parse a canonical atom into an `OptionKind`.
    pub fn from_atom(atom: &str) -> Option<OptionKind> {
        match atom {
            "bool" => Some(OptionKind::Bool),
            "int" => Some(OptionKind::Int),
            "unsigned" => Some(OptionKind::Unsigned),
            "double" => Some(OptionKind::Double),
            "string" => Some(OptionKind::String),
            "sexpr" => Some(OptionKind::SExpr),
            _ => None,
        }
    }

    /// Whether an options store can hold values of this kind.
    pub fn is_storable(self) -> bool {
        !matches!(self, OptionKind::SExpr)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_atom())
    }
}

/// A stored option value. Exactly one of the five storable kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Unsigned(u64),
    Double(f64),
    String(Arc<str>),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Bool(_) => OptionKind::Bool,
            OptionValue::Int(_) => OptionKind::Int,
            OptionValue::Unsigned(_) => OptionKind::Unsigned,
            OptionValue::Double(_) => OptionKind::Double,
            OptionValue::String(_) => OptionKind::String,
        }
    }

    /// Parse the textual form of a value of the given kind.
    ///
    /// Returns `None` when the text is not a valid literal for `kind`, and
    /// always for [`OptionKind::SExpr`].
    pub fn parse(kind: OptionKind, text: &str) -> Option<OptionValue> {
        let trimmed = text.trim();
        match kind {
            OptionKind::Bool => match trimmed {
                "true" => Some(OptionValue::Bool(true)),
                "false" => Some(OptionValue::Bool(false)),
                _ => None,
            },
            OptionKind::Int => trimmed.parse().ok().map(OptionValue::Int),
            OptionKind::Unsigned => trimmed.parse().ok().map(OptionValue::Unsigned),
            OptionKind::Double => trimmed.parse().ok().map(OptionValue::Double),
            OptionKind::String => Some(OptionValue::String(Arc::from(text))),
            OptionKind::SExpr => None,
        }
    }

    /// Coerce an untyped host value into `kind` using the permissive host rules.
    ///
    /// Returns `None` only for kinds that cannot be stored.
    pub fn coerce(kind: OptionKind, raw: &RawValue) -> Option<OptionValue> {
        let value = match kind {
            OptionKind::Bool => OptionValue::Bool(raw.to_bool()),
            OptionKind::Int => OptionValue::Int(raw.to_integer()),
            OptionKind::Unsigned => OptionValue::Unsigned(raw.to_unsigned()),
            OptionKind::Double => OptionValue::Double(raw.to_number()),
            OptionKind::String => OptionValue::String(Arc::from(raw.to_text())),
            OptionKind::SExpr => return None,
        };
        Some(value)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(n) => write!(f, "{n}"),
            OptionValue::Unsigned(n) => write!(f, "{n}"),
            OptionValue::Double(x) => write!(f, "{x:?}"),
            OptionValue::String(s) => write!(f, "{:?}", s.as_ref()),
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Bool(b) => serializer.serialize_bool(*b),
            OptionValue::Int(n) => serializer.serialize_i64(*n),
            OptionValue::Unsigned(n) => serializer.serialize_u64(*n),
            OptionValue::Double(x) => serializer.serialize_f64(*x),
            OptionValue::String(s) => serializer.serialize_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        OptionValue::Unsigned(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Double(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(Arc::from(value))
    }
}

/// Untyped value supplied by an embedding host before kind coercion.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Nil,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Name(Name),
}

impl RawValue {
    /// Truthiness: only `nil` and `false` are false.
    pub fn to_bool(&self) -> bool {
        !matches!(self, RawValue::Nil | RawValue::Bool(false))
    }

    /// Integer view; numbers truncate toward zero, unparsable input is `0`.
    pub fn to_integer(&self) -> i64 {
        match self {
            RawValue::Integer(n) => *n,
            RawValue::Number(x) => *x as i64,
            RawValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|x| x as i64))
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Integer view with negative values clamped to zero and large ones
    /// saturating at `u64::MAX`, whether given as a number or as text.
    pub fn to_unsigned(&self) -> u64 {
        match self {
            RawValue::Number(x) => *x as u64,
            RawValue::Text(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|x| x as u64))
                    .unwrap_or(0)
            }
            other => u64::try_from(other.to_integer()).unwrap_or(0),
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            RawValue::Integer(n) => *n as f64,
            RawValue::Number(x) => *x,
            RawValue::Text(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Text view; `nil` and booleans have no text form and become empty.
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Text(s) => s.clone(),
            RawValue::Integer(n) => n.to_string(),
            RawValue::Number(x) => x.to_string(),
            RawValue::Name(n) => n.to_string(),
            RawValue::Nil | RawValue::Bool(_) => String::new(),
        }
    }

    /// Read this value as an option name (a name or a dotted string).
    pub fn to_name(&self) -> Result<Name, OptionsError> {
        match self {
            RawValue::Name(n) => Ok(n.clone()),
            RawValue::Text(s) => Name::parse(s),
            other => Err(OptionsError::InvalidName(other.to_string())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Nil => "nil",
            RawValue::Bool(_) => "boolean",
            RawValue::Integer(_) | RawValue::Number(_) => "number",
            RawValue::Text(_) => "string",
            RawValue::Name(_) => "name",
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Nil => f.write_str("nil"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Integer(n) => write!(f, "{n}"),
            RawValue::Number(x) => write!(f, "{x}"),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Name(n) => write!(f, "{n}"),
        }
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Integer(value.into())
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        RawValue::Integer(value.into())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<Name> for RawValue {
    fn from(value: Name) -> Self {
        RawValue::Name(value)
    }
}

impl From<OptionValue> for RawValue {
    fn from(value: OptionValue) -> Self {
        match value {
            OptionValue::Bool(b) => RawValue::Bool(b),
            OptionValue::Int(n) => RawValue::Integer(n),
            OptionValue::Unsigned(n) => match i64::try_from(n) {
                Ok(n) => RawValue::Integer(n),
                Err(_) => RawValue::Number(n as f64),
            },
            OptionValue::Double(x) => RawValue::Number(x),
            OptionValue::String(s) => RawValue::Text(s.to_string()),
        }
    }
}
