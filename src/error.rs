//! Error type shared by the registry, the options store and the host surface.

use thiserror::Error;

use crate::name::Name;
use crate::value::OptionKind;

/// Failures raised by kind-dispatching operations and declaration handling.
///
/// Low-level typed accessors never produce these; they fall back to the
/// caller-supplied default instead.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum OptionsError {
    /// The name has no registered declaration.
    #[error("unknown option '{0}'")]
    UnknownOption(Name),

    /// The name is declared with a kind the store cannot hold.
    #[error("unsupported option kind for '{0}'")]
    UnsupportedKind(Name),

    /// A flat `name, value, ...` list had an odd number of entries.
    #[error("options expects an even number of arguments, got {len}")]
    MalformedArgumentList { len: usize },

    /// The name was already registered.
    #[error("option '{0}' is already declared")]
    DuplicateDeclaration(Name),

    /// A declaration default does not parse as its declared kind.
    #[error("default `{default}` for option '{name}' is not a valid {kind}")]
    InvalidDefault {
        name: Name,
        kind: OptionKind,
        default: String,
    },

    /// Text that cannot be read as a hierarchical name.
    #[error("invalid option name `{0}`")]
    InvalidName(String),

    /// The host called a method the options table does not define.
    #[error("unknown options method `{0}`")]
    UnknownMethod(String),

    /// A host call omitted a required positional argument.
    #[error("`{method}` expects argument #{index}")]
    MissingArgument { method: String, index: usize },

    /// A host argument had the wrong type.
    #[error("{expected} expected, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
