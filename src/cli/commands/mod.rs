mod decls;
mod options;
mod repl;
mod util;

pub(crate) use decls::cmd_decls;
pub(crate) use options::{cmd_build, cmd_get, cmd_show};
pub(crate) use repl::cmd_repl;

pub(crate) use util::{parse_assignment, parse_declaration};
