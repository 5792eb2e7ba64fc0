//! Typed, immutable configuration options: a declaration registry, a persistent
//! options store validated against it, and global resolution of the current
//! options through an optional session context.

pub mod builtin;
pub mod decl;
pub mod error;
pub mod global;
pub mod host;
pub mod name;
pub mod options;
pub mod pmap;
pub mod value;

pub type Result<T, E = OptionsError> = std::result::Result<T, E>;

pub use builtin::{builtin_declarations, register_builtin_options};
pub use decl::{
    DeclarationTable, OptionDeclaration, declarations, lookup_option, register_option,
    register_options, with_declarations,
};
pub use error::OptionsError;
pub use global::{
    GlobalScope, OptionsContext, OptionsSlot, SessionState, get_global_options,
    reset_process_slot, set_global_option, set_global_options,
};
pub use host::{Host, HostValue};
pub use name::Name;
pub use options::Options;
pub use value::{OptionKind, OptionValue, RawValue};
