//! Standard option declarations shared by the printer and tracing front ends.

use crate::decl::{OptionDeclaration, register_options};
use crate::error::OptionsError;
use crate::name::Name;
use crate::value::OptionKind;

/// `(name, kind, default, description)` for every built-in option.
pub const BUILTIN_OPTIONS: &[(&str, OptionKind, &str, &str)] = &[
    ("pp.colors", OptionKind::Bool, "true", "use colors in rendered output"),
    ("pp.unicode", OptionKind::Bool, "true", "use unicode characters"),
    ("pp.width", OptionKind::Unsigned, "120", "line width"),
    ("pp.indent", OptionKind::Unsigned, "2", "indentation"),
    ("pp.max_depth", OptionKind::Unsigned, "1000", "maximum expression depth, after that it will use ellipsis"),
    ("pp.max_steps", OptionKind::Unsigned, "5000", "maximum number of visited expressions, after that it will use ellipsis"),
    ("verbose", OptionKind::Bool, "true", "disable/enable verbose messages"),
    ("trace", OptionKind::Bool, "false", "enable tracing"),
    ("max.depth", OptionKind::Int, "-1", "maximum search depth (-1 means unbounded)"),
    ("timeout", OptionKind::Double, "0.0", "timeout in seconds (0 means none)"),
    ("output.prefix", OptionKind::String, "", "prefix prepended to every output line"),
];

/// The built-in catalog as validated declarations.
pub fn builtin_declarations() -> Result<Vec<OptionDeclaration>, OptionsError> {
    BUILTIN_OPTIONS
        .iter()
        .map(|(name, kind, default, description)| {
            OptionDeclaration::new(Name::parse(name)?, *kind, *default, *description)
        })
        .collect()
}

/// Register the built-in options in the process registry.
///
/// Idempotent: names already declared with the built-in kind are kept. A name
/// declared earlier with a different kind rejects the whole catalog and leaves
/// the registry untouched.
pub fn register_builtin_options() -> Result<(), OptionsError> {
    let added = register_options(builtin_declarations()?)?;
    if added > 0 {
        log::debug!("registered {added} built-in options");
    }
    Ok(())
}
