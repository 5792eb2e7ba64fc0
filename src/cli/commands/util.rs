use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;

use optstore::{Name, OptionKind, RawValue};

pub(crate) fn parse_cli_value(token: &str) -> RawValue {
    if token == "~" || token.eq_ignore_ascii_case("nil") || token.eq_ignore_ascii_case("null") {
        return RawValue::Nil;
    }
    match token {
        "true" => return RawValue::Bool(true),
        "false" => return RawValue::Bool(false),
        _ => {}
    }
    if let Ok(i) = token.parse::<i64>() {
        return RawValue::Integer(i);
    }
    if let Ok(f) = token.parse::<f64>() {
        return RawValue::Number(f);
    }
    let unquoted = token
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(token);
    RawValue::Text(unquoted.to_string())
}

pub(crate) fn parse_name(text: &str) -> Result<Name> {
    Name::parse(text).with_context(|| format!("`{text}` is not an option name"))
}

/// `name=value` as used by `--set` and `build`.
pub(crate) fn parse_assignment(entry: &str) -> Result<(Name, RawValue)> {
    let Some((name, value)) = entry.split_once('=') else {
        bail!("invalid assignment `{entry}`; expected NAME=VALUE");
    };
    Ok((parse_name(name)?, parse_cli_value(value.trim())))
}

/// `name:kind=default` as used by `--declare`.
pub(crate) fn parse_declaration(entry: &str) -> Result<(Name, OptionKind, String)> {
    let (head, default) = entry.split_once('=').unwrap_or((entry, ""));
    let Some((name, kind)) = head.split_once(':') else {
        bail!("invalid declaration `{entry}`; expected NAME:KIND=DEFAULT");
    };
    let kind = OptionKind::from_atom(kind.trim())
        .ok_or_else(|| anyhow!("unknown option kind `{}` in `{entry}`", kind.trim()))?;
    Ok((parse_name(name)?, kind, default.to_string()))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
