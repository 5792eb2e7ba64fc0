use anyhow::Result;

use super::util::{parse_name, print_json};
use optstore::{OptionDeclaration, declarations, with_declarations};

pub(crate) fn cmd_decls(prefix: Option<&str>, json: bool) -> Result<()> {
    let decls = select_declarations(prefix)?;
    if json {
        return print_json(&decls);
    }
    if decls.is_empty() {
        println!("no options declared");
        return Ok(());
    }
    print_table(&decls);
    Ok(())
}

/// Registered declarations, optionally limited to names under `prefix`.
pub(crate) fn select_declarations(prefix: Option<&str>) -> Result<Vec<OptionDeclaration>> {
    let Some(prefix) = prefix else {
        return Ok(declarations());
    };
    let prefix = parse_name(prefix)?;
    Ok(with_declarations(|table| table.with_prefix(&prefix).cloned().collect()))
}

pub(crate) fn print_table(decls: &[OptionDeclaration]) {
    let width = decls
        .iter()
        .map(|decl| decl.name().to_string().len())
        .max()
        .unwrap_or(0);
    for decl in decls {
        let default = if decl.default_value().is_empty() {
            "\"\""
        } else {
            decl.default_value()
        };
        println!(
            "{:<width$}  {:<8}  {:<6}  {}",
            decl.name().to_string(),
            decl.kind().as_atom(),
            default,
            decl.description()
        );
    }
}
