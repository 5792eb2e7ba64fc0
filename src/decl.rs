//! Option declarations and the process-wide declaration registry.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::OptionsError;
use crate::name::Name;
use crate::value::{OptionKind, OptionValue};

/// Registered metadata for one option name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptionDeclaration {
    name: Name,
    #[serde(serialize_with = "serialize_kind")]
    kind: OptionKind,
    default_value: String,
    description: String,
}

impl OptionDeclaration {
    /// Build a declaration, checking that `default` is a literal of `kind`.
    pub fn new(
        name: Name,
        kind: OptionKind,
        default: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, OptionsError> {
        let default = default.into();
        if kind.is_storable() && OptionValue::parse(kind, &default).is_none() {
            return Err(OptionsError::InvalidDefault {
                name,
                kind,
                default,
            });
        }
        Ok(Self {
            name,
            kind,
            default_value: default,
            description: description.into(),
        })
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Default in its declared textual form.
    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The default parsed as the declared kind; `None` for unstorable kinds.
    pub fn typed_default(&self) -> Option<OptionValue> {
        OptionValue::parse(self.kind, &self.default_value)
    }
}

fn serialize_kind<S: serde::Serializer>(kind: &OptionKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.as_atom())
}

/// Append-only table of declarations keyed by name.
#[derive(Clone, Debug, Default)]
pub struct DeclarationTable {
    entries: BTreeMap<Name, OptionDeclaration>,
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a declaration. A name can be declared only once; a second
    /// registration fails and keeps the first.
    pub fn register(&mut self, decl: OptionDeclaration) -> Result<(), OptionsError> {
        if self.entries.contains_key(decl.name()) {
            log::warn!("rejected duplicate declaration for option '{}'", decl.name());
            return Err(OptionsError::DuplicateDeclaration(decl.name().clone()));
        }
        log::debug!(
            "declared option '{}' ({}, default `{}`)",
            decl.name(),
            decl.kind(),
            decl.default_value()
        );
        self.entries.insert(decl.name().clone(), decl);
        Ok(())
    }

    /// Insert a batch of declarations, all or nothing.
    ///
    /// A name already declared with the same kind is kept as is; any other
    /// clash, in the table or within the batch, rejects the whole batch.
    /// Returns how many declarations were added.
    pub fn register_all<I>(&mut self, decls: I) -> Result<usize, OptionsError>
    where
        I: IntoIterator<Item = OptionDeclaration>,
    {
        let mut fresh: Vec<OptionDeclaration> = Vec::new();
        for decl in decls {
            match self.entries.get(decl.name()) {
                Some(existing) if existing.kind() == decl.kind() => {
                    log::debug!("option '{}' already declared, keeping it", decl.name());
                }
                Some(_) => {
                    log::warn!("rejected declaration batch: '{}' clashes", decl.name());
                    return Err(OptionsError::DuplicateDeclaration(decl.name().clone()));
                }
                None if fresh.iter().any(|d| d.name() == decl.name()) => {
                    return Err(OptionsError::DuplicateDeclaration(decl.name().clone()));
                }
                None => fresh.push(decl),
            }
        }
        let added = fresh.len();
        for decl in fresh {
            self.register(decl)?;
        }
        Ok(added)
    }

    pub fn lookup(&self, name: &Name) -> Option<&OptionDeclaration> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionDeclaration> {
        self.entries.values()
    }

    /// Declarations whose name starts with `prefix` (component-wise).
    pub fn with_prefix<'a>(&'a self, prefix: &'a Name) -> impl Iterator<Item = &'a OptionDeclaration> {
        self.entries
            .range(prefix.clone()..)
            .take_while(move |(name, _)| prefix.is_prefix_of(name))
            .map(|(_, decl)| decl)
    }

    /// Resolve `name` to a storable kind, as every kind-dispatching operation does.
    pub(crate) fn storable_kind(&self, name: &Name) -> Result<OptionKind, OptionsError> {
        let decl = self
            .lookup(name)
            .ok_or_else(|| OptionsError::UnknownOption(name.clone()))?;
        if !decl.kind().is_storable() {
            return Err(OptionsError::UnsupportedKind(name.clone()));
        }
        Ok(decl.kind())
    }
}

static REGISTRY: Lazy<RwLock<DeclarationTable>> = Lazy::new(|| RwLock::new(DeclarationTable::new()));

/// Declare an option in the process-wide registry.
pub fn register_option(
    name: Name,
    kind: OptionKind,
    default: impl Into<String>,
    description: impl Into<String>,
) -> Result<(), OptionsError> {
    let decl = OptionDeclaration::new(name, kind, default, description)?;
    let mut guard = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    guard.register(decl)
}

/// Declare a batch of options in the process-wide registry under one write
/// lock. See [`DeclarationTable::register_all`].
pub fn register_options<I>(decls: I) -> Result<usize, OptionsError>
where
    I: IntoIterator<Item = OptionDeclaration>,
{
    let mut guard = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    guard.register_all(decls)
}

/// Look up a declaration in the process-wide registry.
pub fn lookup_option(name: &Name) -> Option<OptionDeclaration> {
    with_declarations(|table| table.lookup(name).cloned())
}

/// Run `f` against the process-wide registry under its read lock.
pub fn with_declarations<R>(f: impl FnOnce(&DeclarationTable) -> R) -> R {
    let guard = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    f(&guard)
}

/// Snapshot of every declaration, ordered by name.
pub fn declarations() -> Vec<OptionDeclaration> {
    with_declarations(|table| table.iter().cloned().collect())
}
