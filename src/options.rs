//! Immutable, persistent options store.
//!
//! Two access tiers:
//!
//! * low-level typed accessors (`get_bool`, `update_int`, ...) read and write a
//!   specific representation directly and never consult declarations;
//! * kind-dispatching accessors (`get`, `update`, `from_pairs`) look the name up
//!   in a [`DeclarationTable`] and fail on unknown or unstorable names.
//!
//! Every update returns a new [`Options`]; the receiver is never modified.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::decl::{DeclarationTable, with_declarations};
use crate::error::OptionsError;
use crate::name::Name;
use crate::pmap::PersistentMap;
use crate::value::{OptionKind, OptionValue, RawValue};

/// Immutable mapping from option names to typed values.
///
/// Clones are O(1) and share structure; updates path-copy in O(log n).
#[derive(Clone, Default)]
pub struct Options {
    entries: PersistentMap<Name, OptionValue>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(name, raw value)` pairs against the process registry.
    pub fn from_pairs<I>(pairs: I) -> Result<Options, OptionsError>
    where
        I: IntoIterator<Item = (Name, RawValue)>,
    {
        with_declarations(|decls| Options::from_pairs_in(decls, pairs))
    }

    /// Build a store from `(name, raw value)` pairs, coercing each value to its
    /// declared kind. Later pairs for the same name win.
    pub fn from_pairs_in<I>(decls: &DeclarationTable, pairs: I) -> Result<Options, OptionsError>
    where
        I: IntoIterator<Item = (Name, RawValue)>,
    {
        let mut out = Options::new();
        for (name, raw) in pairs {
            out = out.update_in(decls, name, raw)?;
        }
        Ok(out)
    }

    /// Build a store from a flat `name, value, name, value, ...` argument list.
    pub fn from_flat(args: &[RawValue]) -> Result<Options, OptionsError> {
        with_declarations(|decls| Options::from_flat_in(decls, args))
    }

    pub fn from_flat_in(decls: &DeclarationTable, args: &[RawValue]) -> Result<Options, OptionsError> {
        if args.len() % 2 != 0 {
            return Err(OptionsError::MalformedArgumentList { len: args.len() });
        }
        let pairs = args
            .chunks_exact(2)
            .map(|pair| Ok((pair[0].to_name()?, pair[1].clone())))
            .collect::<Result<Vec<_>, OptionsError>>()?;
        Options::from_pairs_in(decls, pairs)
    }

    // --- inspection -------------------------------------------------------

    pub fn contains(&self, name: &Name) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of distinct names.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &OptionValue)> {
        self.entries.iter()
    }

    /// Untyped read of whatever is stored under `name`.
    pub fn get_value(&self, name: &Name) -> Option<&OptionValue> {
        self.entries.get(name)
    }

    // --- low-level typed reads ----------------------------------------------

    pub fn get_bool(&self, name: &Name, default: bool) -> bool {
        match self.entries.get(name) {
            Some(OptionValue::Bool(b)) => *b,
            _ => default,
        }
    }

    pub fn get_int(&self, name: &Name, default: i64) -> i64 {
        match self.entries.get(name) {
            Some(OptionValue::Int(n)) => *n,
            Some(OptionValue::Unsigned(n)) => i64::try_from(*n).unwrap_or(default),
            _ => default,
        }
    }

    pub fn get_unsigned(&self, name: &Name, default: u64) -> u64 {
        match self.entries.get(name) {
            Some(OptionValue::Unsigned(n)) => *n,
            Some(OptionValue::Int(n)) => u64::try_from(*n).unwrap_or(default),
            _ => default,
        }
    }

    pub fn get_double(&self, name: &Name, default: f64) -> f64 {
        match self.entries.get(name) {
            Some(OptionValue::Double(x)) => *x,
            _ => default,
        }
    }

    pub fn get_string<'a>(&'a self, name: &Name, default: &'a str) -> &'a str {
        match self.entries.get(name) {
            Some(OptionValue::String(s)) => s.as_ref(),
            _ => default,
        }
    }

    // --- low-level updates ---------------------------------------------------

    pub fn update_bool(&self, name: Name, value: bool) -> Options {
        self.update_value(name, OptionValue::Bool(value))
    }

    pub fn update_int(&self, name: Name, value: i64) -> Options {
        self.update_value(name, OptionValue::Int(value))
    }

    pub fn update_unsigned(&self, name: Name, value: u64) -> Options {
        self.update_value(name, OptionValue::Unsigned(value))
    }

    pub fn update_double(&self, name: Name, value: f64) -> Options {
        self.update_value(name, OptionValue::Double(value))
    }

    pub fn update_string(&self, name: Name, value: &str) -> Options {
        self.update_value(name, OptionValue::String(Arc::from(value)))
    }

    /// Set `name` to `value` without consulting any declaration.
    pub fn update_value(&self, name: Name, value: OptionValue) -> Options {
        Options {
            entries: self.entries.insert(name, value),
        }
    }

    // --- kind-dispatching tier ----------------------------------------------

    /// Kind-checked read against the process registry.
    pub fn get(&self, name: &Name, default: Option<&RawValue>) -> Result<OptionValue, OptionsError> {
        with_declarations(|decls| self.get_in(decls, name, default))
    }

    /// Kind-checked read.
    ///
    /// When `name` is absent the caller's `default` (coerced to the declared
    /// kind) is returned, or the declaration's own default if none was given.
    pub fn get_in(
        &self,
        decls: &DeclarationTable,
        name: &Name,
        default: Option<&RawValue>,
    ) -> Result<OptionValue, OptionsError> {
        let kind = decls.storable_kind(name)?;
        let fallback = match default {
            Some(raw) => OptionValue::coerce(kind, raw),
            None => decls.lookup(name).and_then(|decl| decl.typed_default()),
        }
        .ok_or_else(|| OptionsError::UnsupportedKind(name.clone()))?;
        let value = match (kind, fallback) {
            (OptionKind::Bool, OptionValue::Bool(d)) => OptionValue::Bool(self.get_bool(name, d)),
            (OptionKind::Int, OptionValue::Int(d)) => OptionValue::Int(self.get_int(name, d)),
            (OptionKind::Unsigned, OptionValue::Unsigned(d)) => {
                OptionValue::Unsigned(self.get_unsigned(name, d))
            }
            (OptionKind::Double, OptionValue::Double(d)) => {
                OptionValue::Double(self.get_double(name, d))
            }
            (OptionKind::String, OptionValue::String(d)) => match self.entries.get(name) {
                Some(stored @ OptionValue::String(_)) => stored.clone(),
                _ => OptionValue::String(d),
            },
            _ => return Err(OptionsError::UnsupportedKind(name.clone())),
        };
        Ok(value)
    }

    /// Kind-checked update against the process registry.
    pub fn update(&self, name: Name, value: impl Into<RawValue>) -> Result<Options, OptionsError> {
        let value = value.into();
        with_declarations(|decls| self.update_in(decls, name, value))
    }

    /// Kind-checked update: coerce `value` to the declared kind of `name` and
    /// return a new store with it set.
    pub fn update_in(
        &self,
        decls: &DeclarationTable,
        name: Name,
        value: impl Into<RawValue>,
    ) -> Result<Options, OptionsError> {
        let kind = decls.storable_kind(&name)?;
        let raw = value.into();
        let updated = match kind {
            OptionKind::Bool => self.update_bool(name, raw.to_bool()),
            OptionKind::Int => self.update_int(name, raw.to_integer()),
            OptionKind::Unsigned => self.update_unsigned(name, raw.to_unsigned()),
            OptionKind::Double => self.update_double(name, raw.to_number()),
            OptionKind::String => self.update_string(name, &raw.to_text()),
            OptionKind::SExpr => return Err(OptionsError::UnsupportedKind(name)),
        };
        Ok(updated)
    }
}

impl PartialEq for Options {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.iter().eq(other.iter())
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (name, value)) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} := {value}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Options{self}")
    }
}

impl Serialize for Options {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.size()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
