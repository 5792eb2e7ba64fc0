//! Hierarchical option names such as `pp.colors`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use smallvec::SmallVec;

use crate::error::OptionsError;

type Components = SmallVec<[Arc<str>; 4]>;

/// Immutable dotted name used as an option key.
///
/// Cloning shares the component storage. Ordering compares components
/// left to right, so a parent sorts before its children.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(Arc<Components>);

impl Name {
    /// Parse a dotted name, rejecting empty input and empty components.
    pub fn parse(text: &str) -> Result<Name, OptionsError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(OptionsError::InvalidName(text.to_string()));
        }
        let mut parts = Components::new();
        for part in text.split('.') {
            if !valid_component(part) {
                return Err(OptionsError::InvalidName(text.to_string()));
            }
            parts.push(Arc::from(part));
        }
        Ok(Name(Arc::new(parts)))
    }

    /// Build a name from already-split components.
    pub fn from_components<I, S>(components: I) -> Result<Name, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parts = Components::new();
        for part in components {
            let part = part.as_ref();
            if !valid_component(part) || part.contains('.') {
                return Err(OptionsError::InvalidName(part.to_string()));
            }
            parts.push(Arc::from(part));
        }
        if parts.is_empty() {
            return Err(OptionsError::InvalidName(String::new()));
        }
        Ok(Name(Arc::new(parts)))
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.as_ref())
    }

    /// Number of components; never zero.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_atomic(&self) -> bool {
        self.0.len() == 1
    }

    /// Last component (`colors` for `pp.colors`).
    pub fn last(&self) -> &str {
        self.0.last().map(|c| c.as_ref()).unwrap_or_default()
    }

    /// Parent name, or `None` for an atomic name.
    pub fn prefix(&self) -> Option<Name> {
        if self.is_atomic() {
            return None;
        }
        let parts: Components = self.0[..self.0.len() - 1].iter().cloned().collect();
        Some(Name(Arc::new(parts)))
    }

    /// Extend this name with one more component.
    pub fn append(&self, component: &str) -> Result<Name, OptionsError> {
        if !valid_component(component) || component.contains('.') {
            return Err(OptionsError::InvalidName(component.to_string()));
        }
        let mut parts = (*self.0).clone();
        parts.push(Arc::from(component));
        Ok(Name(Arc::new(parts)))
    }

    /// True when `self` equals `other` or is one of its ancestors.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(other.0.iter()).all(|(a, b)| a == b)
    }
}

/// Non-empty and free of whitespace, so the dotted form parses back.
fn valid_component(part: &str) -> bool {
    !part.is_empty() && !part.chars().any(char::is_whitespace)
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, part) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{self}`")
    }
}

impl FromStr for Name {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::parse(s)
    }
}

impl TryFrom<&str> for Name {
    type Error = OptionsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Name::parse(value)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
