//! Resolution of the "current" options.
//!
//! A host either binds a session context, which owns its options, or falls
//! back to the single process-scoped slot.

use std::sync::{PoisonError, RwLock};

use crate::error::OptionsError;
use crate::name::Name;
use crate::options::Options;
use crate::value::RawValue;

/// A session/state object that owns the authoritative options instance.
///
/// Implementations only guard a reference swap; stored values are immutable.
pub trait OptionsContext: Send + Sync {
    fn options(&self) -> Options;

    fn set_options(&self, options: Options);

    /// Replace the stored options with `f(current)` in one critical section.
    fn modify_options(
        &self,
        f: &mut dyn FnMut(&Options) -> Result<Options, OptionsError>,
    ) -> Result<(), OptionsError>;
}

/// Minimal session context holding one options instance.
#[derive(Debug, Default)]
pub struct SessionState {
    options: RwLock<Options>,
}

impl SessionState {
    pub fn new(options: Options) -> Self {
        Self {
            options: RwLock::new(options),
        }
    }
}

impl OptionsContext for SessionState {
    fn options(&self) -> Options {
        self.options.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_options(&self, options: Options) {
        *self.options.write().unwrap_or_else(PoisonError::into_inner) = options;
    }

    fn modify_options(
        &self,
        f: &mut dyn FnMut(&Options) -> Result<Options, OptionsError>,
    ) -> Result<(), OptionsError> {
        let mut guard = self.options.write().unwrap_or_else(PoisonError::into_inner);
        let next = f(&*guard)?;
        *guard = next;
        Ok(())
    }
}

/// Process-scoped options slot, empty until first written.
#[derive(Debug, Default)]
pub struct OptionsSlot {
    current: RwLock<Option<Options>>,
}

impl OptionsSlot {
    pub const fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Current options, or an empty store if the slot was never written.
    pub fn get(&self) -> Options {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        guard.clone().unwrap_or_default()
    }

    pub fn set(&self, options: Options) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(options);
    }

    pub fn is_set(&self) -> bool {
        self.current.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Return the slot to its never-written state.
    pub fn clear(&self) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    fn modify(
        &self,
        f: &mut dyn FnMut(&Options) -> Result<Options, OptionsError>,
    ) -> Result<(), OptionsError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let current = guard.clone().unwrap_or_default();
        *guard = Some(f(&current)?);
        Ok(())
    }
}

static PROCESS_SLOT: OptionsSlot = OptionsSlot::new();

/// Clear the process-scoped slot. Intended for test harnesses.
pub fn reset_process_slot() {
    PROCESS_SLOT.clear();
}

/// Chooses which options instance is "current".
///
/// `Bound` defers to a session context; `Unbound` uses a process-scoped slot.
#[derive(Clone, Copy)]
pub enum GlobalScope<'a> {
    Bound(&'a dyn OptionsContext),
    Unbound(&'a OptionsSlot),
}

impl<'a> GlobalScope<'a> {
    /// Bound to `ctx` when present, otherwise the process slot.
    pub fn resolve(ctx: Option<&'a dyn OptionsContext>) -> Self {
        match ctx {
            Some(ctx) => GlobalScope::Bound(ctx),
            None => GlobalScope::Unbound(&PROCESS_SLOT),
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, GlobalScope::Bound(_))
    }

    pub fn get_options(&self) -> Options {
        match self {
            GlobalScope::Bound(ctx) => ctx.options(),
            GlobalScope::Unbound(slot) => slot.get(),
        }
    }

    pub fn set_options(&self, options: Options) {
        log::debug!(
            "replacing {} options with {} entries",
            self.label(),
            options.size()
        );
        match self {
            GlobalScope::Bound(ctx) => ctx.set_options(options),
            GlobalScope::Unbound(slot) => slot.set(options),
        }
    }

    /// Kind-checked update of one option, applied atomically to the current
    /// instance.
    pub fn set_option(&self, name: Name, value: impl Into<RawValue>) -> Result<(), OptionsError> {
        let value = value.into();
        log::debug!("setting {} option '{name}' to {value}", self.label());
        let mut apply = |current: &Options| current.update(name.clone(), value.clone());
        match self {
            GlobalScope::Bound(ctx) => ctx.modify_options(&mut apply),
            GlobalScope::Unbound(slot) => slot.modify(&mut apply),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            GlobalScope::Bound(_) => "session",
            GlobalScope::Unbound(_) => "process",
        }
    }
}

/// Current global options for an optional session context.
pub fn get_global_options(ctx: Option<&dyn OptionsContext>) -> Options {
    GlobalScope::resolve(ctx).get_options()
}

/// Replace the global options for an optional session context.
pub fn set_global_options(ctx: Option<&dyn OptionsContext>, options: Options) {
    GlobalScope::resolve(ctx).set_options(options)
}

/// `set_global_options(get_global_options().update(name, value))`, atomically.
pub fn set_global_option(
    ctx: Option<&dyn OptionsContext>,
    name: Name,
    value: impl Into<RawValue>,
) -> Result<(), OptionsError> {
    GlobalScope::resolve(ctx).set_option(name, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::register_option;
    use crate::value::{OptionKind, OptionValue};
    use std::sync::{Arc, Mutex};

    // Tests touching the process slot must not interleave.
    static SLOT_LOCK: Mutex<()> = Mutex::new(());

    fn name(s: &str) -> Name {
        Name::parse(s).unwrap()
    }

    fn declare(s: &str, kind: OptionKind, default: &str) -> Name {
        let n = name(s);
        let _ = register_option(n.clone(), kind, default, "global test option");
        n
    }

    #[test]
    fn unbound_reads_empty_until_written() {
        let _guard = SLOT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        reset_process_slot();
        assert!(get_global_options(None).empty());
        assert!(!PROCESS_SLOT.is_set());
        let n = declare("global.tests.width", OptionKind::Unsigned, "80");
        let o = Options::new().update_unsigned(n.clone(), 40);
        set_global_options(None, o.clone());
        assert_eq!(get_global_options(None), o);
        reset_process_slot();
        assert!(get_global_options(None).empty());
    }

    #[test]
    fn bound_context_is_authoritative() {
        let _guard = SLOT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        reset_process_slot();
        let n = declare("global.tests.flag", OptionKind::Bool, "false");
        let session = SessionState::default();
        let o = Options::new().update_bool(n.clone(), true);
        set_global_options(Some(&session), o.clone());
        assert_eq!(get_global_options(Some(&session)), o);
        assert_eq!(session.options(), o);
        assert!(get_global_options(None).empty(), "process slot must stay untouched");
    }

    #[test]
    fn set_option_goes_through_declarations() -> Result<(), OptionsError> {
        let _guard = SLOT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        reset_process_slot();
        let n = declare("global.tests.depth", OptionKind::Int, "0");
        set_global_option(None, n.clone(), "12")?;
        assert_eq!(get_global_options(None).get(&n, None)?, OptionValue::Int(12));

        let unknown = name("global.tests.nope");
        let before = get_global_options(None);
        assert_eq!(
            set_global_option(None, unknown.clone(), 1).unwrap_err(),
            OptionsError::UnknownOption(unknown)
        );
        assert_eq!(get_global_options(None), before);
        Ok(())
    }

    #[test]
    fn independent_slots_do_not_share_state() {
        let a = OptionsSlot::new();
        let b = OptionsSlot::new();
        let o = Options::new().update_int(name("x"), 1);
        GlobalScope::Unbound(&a).set_options(o.clone());
        assert_eq!(GlobalScope::Unbound(&a).get_options(), o);
        assert!(GlobalScope::Unbound(&b).get_options().empty());
    }

    #[test]
    fn concurrent_set_option_loses_no_updates() {
        let names: Vec<Name> = (0..8)
            .map(|i| declare(&format!("global.tests.concurrent.k{i}"), OptionKind::Int, "0"))
            .collect();
        let session = Arc::new(SessionState::default());
        let handles: Vec<_> = names
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, n)| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || {
                    GlobalScope::Bound(session.as_ref()).set_option(n, i as i64)
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        let result = session.options();
        assert_eq!(result.size(), names.len());
        for (i, n) in names.iter().enumerate() {
            assert_eq!(result.get_int(n, -1), i as i64);
        }
    }
}
