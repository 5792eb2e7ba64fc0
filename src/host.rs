//! Script-style call surface for an embedding host.
//!
//! Mirrors the functions and the method table a scripting runtime exposes for
//! options objects: positional, loosely typed arguments in; plain values or
//! options objects out.

use std::fmt;
use std::sync::Arc;

use crate::error::OptionsError;
use crate::global::{GlobalScope, OptionsContext};
use crate::name::Name;
use crate::options::Options;
use crate::value::{OptionValue, RawValue};

/// Method names understood by [`Host::call`].
pub const OPTIONS_METHODS: &[&str] = &[
    "tostring",
    "size",
    "len",
    "contains",
    "empty",
    "get",
    "update",
    "get_bool",
    "get_int",
    "get_unsigned",
    "get_double",
    "get_string",
    "update_bool",
    "update_int",
    "update_unsigned",
    "update_double",
    "update_string",
];

/// A value crossing the host boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum HostValue {
    Raw(RawValue),
    Options(Options),
}

impl HostValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Raw(raw) => raw.type_name(),
            HostValue::Options(_) => "options",
        }
    }

    pub fn as_raw(&self) -> Result<&RawValue, OptionsError> {
        match self {
            HostValue::Raw(raw) => Ok(raw),
            HostValue::Options(_) => Err(OptionsError::TypeMismatch {
                expected: "value",
                found: "options",
            }),
        }
    }

    pub fn as_options(&self) -> Result<&Options, OptionsError> {
        match self {
            HostValue::Options(o) => Ok(o),
            other => Err(OptionsError::TypeMismatch {
                expected: "options",
                found: other.type_name(),
            }),
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Raw(raw) => write!(f, "{raw}"),
            HostValue::Options(o) => write!(f, "{o}"),
        }
    }
}

impl From<RawValue> for HostValue {
    fn from(value: RawValue) -> Self {
        HostValue::Raw(value)
    }
}

impl From<OptionValue> for HostValue {
    fn from(value: OptionValue) -> Self {
        HostValue::Raw(RawValue::from(value))
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Raw(RawValue::from(value))
    }
}

impl From<i32> for HostValue {
    fn from(value: i32) -> Self {
        HostValue::Raw(RawValue::from(value))
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        HostValue::Raw(RawValue::from(value))
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Raw(RawValue::from(value))
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::Raw(RawValue::from(value))
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::Raw(RawValue::from(value))
    }
}

impl From<Options> for HostValue {
    fn from(value: Options) -> Self {
        HostValue::Options(value)
    }
}

/// Host-side entry points, optionally bound to a session context.
#[derive(Clone, Default)]
pub struct Host {
    context: Option<Arc<dyn OptionsContext>>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: Arc<dyn OptionsContext>) -> Self {
        Self {
            context: Some(context),
        }
    }

    pub fn bind(&mut self, context: Arc<dyn OptionsContext>) {
        self.context = Some(context);
    }

    pub fn unbind(&mut self) {
        self.context = None;
    }

    pub fn scope(&self) -> GlobalScope<'_> {
        GlobalScope::resolve(self.context.as_deref())
    }

    /// `options(name, value, ...)`
    pub fn options(&self, args: &[HostValue]) -> Result<Options, OptionsError> {
        let raw = args
            .iter()
            .map(|arg| arg.as_raw().cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Options::from_flat(&raw)
    }

    pub fn is_options(value: &HostValue) -> bool {
        matches!(value, HostValue::Options(_))
    }

    pub fn get_options(&self) -> Options {
        self.scope().get_options()
    }

    /// `set_options(o)`
    pub fn set_options(&self, args: &[HostValue]) -> Result<(), OptionsError> {
        let options = arg(args, "set_options", 0)?.as_options()?;
        self.scope().set_options(options.clone());
        Ok(())
    }

    /// `set_option(name, value)`
    pub fn set_option(&self, args: &[HostValue]) -> Result<(), OptionsError> {
        let name = arg(args, "set_option", 0)?.as_raw()?.to_name()?;
        let value = optional_raw(args, 1)?;
        self.scope().set_option(name, value)
    }

    /// Invoke `receiver:method(args...)`.
    pub fn call(
        &self,
        receiver: &Options,
        method: &str,
        args: &[HostValue],
    ) -> Result<HostValue, OptionsError> {
        log::trace!("options:{method} with {} argument(s)", args.len());
        let result = match method {
            "tostring" => HostValue::from(receiver.to_string()),
            "size" | "len" => HostValue::from(count(receiver.size())),
            "empty" => HostValue::from(receiver.empty()),
            "contains" => {
                let name = name_arg(args, method)?;
                HostValue::from(receiver.contains(&name))
            }
            "get" => {
                let name = name_arg(args, method)?;
                let default = args.get(1).map(HostValue::as_raw).transpose()?;
                HostValue::from(receiver.get(&name, default)?)
            }
            "update" => {
                let name = name_arg(args, method)?;
                HostValue::from(receiver.update(name, optional_raw(args, 1)?)?)
            }
            "get_bool" => {
                let name = name_arg(args, method)?;
                let default = optional_raw(args, 1)?.to_bool();
                HostValue::from(receiver.get_bool(&name, default))
            }
            "get_int" => {
                let name = name_arg(args, method)?;
                let default = optional_raw(args, 1)?.to_integer();
                HostValue::from(receiver.get_int(&name, default))
            }
            "get_unsigned" => {
                let name = name_arg(args, method)?;
                let default = optional_raw(args, 1)?.to_unsigned();
                HostValue::from(OptionValue::Unsigned(receiver.get_unsigned(&name, default)))
            }
            "get_double" => {
                let name = name_arg(args, method)?;
                let default = optional_raw(args, 1)?.to_number();
                HostValue::from(receiver.get_double(&name, default))
            }
            "get_string" => {
                let name = name_arg(args, method)?;
                let default = optional_raw(args, 1)?.to_text();
                HostValue::from(receiver.get_string(&name, &default).to_string())
            }
            "update_bool" => {
                let name = name_arg(args, method)?;
                HostValue::from(receiver.update_bool(name, optional_raw(args, 1)?.to_bool()))
            }
            "update_int" => {
                let name = name_arg(args, method)?;
                HostValue::from(receiver.update_int(name, optional_raw(args, 1)?.to_integer()))
            }
            "update_unsigned" => {
                let name = name_arg(args, method)?;
                HostValue::from(receiver.update_unsigned(name, optional_raw(args, 1)?.to_unsigned()))
            }
            "update_double" => {
                let name = name_arg(args, method)?;
                HostValue::from(receiver.update_double(name, optional_raw(args, 1)?.to_number()))
            }
            "update_string" => {
                let name = name_arg(args, method)?;
                HostValue::from(receiver.update_string(name, &optional_raw(args, 1)?.to_text()))
            }
            other => return Err(OptionsError::UnknownMethod(other.to_string())),
        };
        Ok(result)
    }
}

fn arg<'a>(args: &'a [HostValue], method: &str, index: usize) -> Result<&'a HostValue, OptionsError> {
    args.get(index).ok_or_else(|| OptionsError::MissingArgument {
        method: method.to_string(),
        index: index + 1,
    })
}

fn name_arg(args: &[HostValue], method: &str) -> Result<Name, OptionsError> {
    arg(args, method, 0)?.as_raw()?.to_name()
}

/// Absent trailing arguments read as `nil`.
fn optional_raw(args: &[HostValue], index: usize) -> Result<RawValue, OptionsError> {
    match args.get(index) {
        Some(value) => value.as_raw().cloned(),
        None => Ok(RawValue::Nil),
    }
}

fn count(n: usize) -> RawValue {
    i64::try_from(n).map_or(RawValue::Number(n as f64), RawValue::Integer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::register_option;
    use crate::global::SessionState;
    use crate::value::OptionKind;

    fn declare_host_options() {
        for (n, kind, default) in [
            ("host.tests.depth", OptionKind::Int, "5"),
            ("host.tests.flag", OptionKind::Bool, "false"),
            ("host.tests.label", OptionKind::String, "none"),
            ("host.tests.big", OptionKind::Unsigned, "18446744073709551615"),
        ] {
            let _ = register_option(Name::parse(n).unwrap(), kind, default, "host test option");
        }
    }

    #[test]
    fn options_constructor_takes_flat_pairs() {
        declare_host_options();
        let host = Host::new();
        let o = host
            .options(&["host.tests.depth".into(), 3.into(), "host.tests.flag".into(), true.into()])
            .unwrap();
        assert_eq!(o.size(), 2);
        let err = host.options(&["host.tests.depth".into()]).unwrap_err();
        assert_eq!(err, OptionsError::MalformedArgumentList { len: 1 });
        assert!(Host::is_options(&HostValue::from(o)));
        assert!(!Host::is_options(&HostValue::from(1)));
    }

    #[test]
    fn method_table_dispatch() {
        declare_host_options();
        let host = Host::new();
        let o = Options::new();
        let updated = host
            .call(&o, "update", &["host.tests.label".into(), 12.into()])
            .unwrap();
        let updated = updated.as_options().unwrap().clone();
        assert_eq!(
            host.call(&updated, "get", &["host.tests.label".into()]).unwrap(),
            HostValue::from("12")
        );
        assert_eq!(
            host.call(&o, "get", &["host.tests.depth".into()]).unwrap(),
            HostValue::from(5i64)
        );
        assert_eq!(host.call(&updated, "size", &[]).unwrap(), HostValue::from(1i64));
        assert_eq!(
            host.call(&o, "get_bool", &["host.tests.flag".into()]).unwrap(),
            HostValue::from(false)
        );
        assert_eq!(
            host.call(&o, "get_string", &["missing.name".into(), "dflt".into()]).unwrap(),
            HostValue::from("dflt")
        );
        assert_eq!(
            host.call(&o, "frobnicate", &[]).unwrap_err(),
            OptionsError::UnknownMethod("frobnicate".into())
        );
        assert!(matches!(
            host.call(&o, "contains", &[]).unwrap_err(),
            OptionsError::MissingArgument { index: 1, .. }
        ));
        assert!(matches!(
            host.call(&o, "get", &["totally.unknown.name".into()]).unwrap_err(),
            OptionsError::UnknownOption(_)
        ));
    }

    #[test]
    fn unsigned_results_agree_across_getters() {
        declare_host_options();
        let host = Host::new();
        let o = Options::new();
        let big = host.call(&o, "get", &["host.tests.big".into()]).unwrap();
        assert_eq!(big, HostValue::from(u64::MAX as f64));
        assert_eq!(
            host.call(&o, "get_unsigned", &["host.tests.big".into(), u64::MAX.to_string().into()])
                .unwrap(),
            big
        );
    }

    #[test]
    fn every_listed_method_dispatches() {
        declare_host_options();
        let host = Host::new();
        let o = Options::new();
        for method in OPTIONS_METHODS {
            let result = host.call(&o, method, &["host.tests.depth".into(), 1.into()]);
            assert!(
                !matches!(result, Err(OptionsError::UnknownMethod(_))),
                "{method} is listed but not dispatched"
            );
        }
    }

    #[test]
    fn low_level_updaters_skip_declarations() {
        let host = Host::new();
        let o = host
            .call(&Options::new(), "update_unsigned", &["free.form".into(), (-3).into()])
            .unwrap();
        let o = o.as_options().unwrap();
        assert_eq!(o.get_value(&Name::parse("free.form").unwrap()), Some(&OptionValue::Unsigned(0)));
        assert_eq!(
            host.call(o, "tostring", &[]).unwrap(),
            HostValue::from("{free.form := 0}")
        );
    }

    #[test]
    fn bound_host_routes_through_session() {
        declare_host_options();
        let session = Arc::new(SessionState::default());
        let host = Host::with_context(session.clone());
        host.set_option(&["host.tests.flag".into(), true.into()]).unwrap();
        assert!(session.options().get_bool(&Name::parse("host.tests.flag").unwrap(), false));
        assert_eq!(host.get_options(), session.options());

        let err = host.set_options(&[HostValue::from(1)]).unwrap_err();
        assert_eq!(
            err,
            OptionsError::TypeMismatch {
                expected: "options",
                found: "number"
            }
        );
        host.set_options(&[HostValue::from(Options::new())]).unwrap();
        assert!(session.options().empty());
    }
}
