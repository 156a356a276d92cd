//! Registrable external warning hook.
//!
//! Host code may register one callback to be notified of warning messages,
//! for example to forward them into application-level logging. The hook
//! receives the formatted message text and is invoked at most once per
//! warning, and only when the diagnostic pipeline is not already inside a
//! critical section (otherwise a hook that itself warns would recurse).
//!
//! The default is a no-op.

use std::sync::{Arc, Mutex, PoisonError};

/// Callback invoked with the formatted warning message.
pub type WarningHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Holds the single registrable warning hook.
#[derive(Default)]
pub struct HookRegistry {
    hook: Mutex<Option<WarningHook>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the hook, replacing any previous one.
    pub fn set(&self, hook: WarningHook) {
        *self.lock() = Some(hook);
    }

    /// Removes the hook.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    /// Invokes the hook if one is registered. Returns whether it ran.
    pub fn invoke(&self, message: &str) -> bool {
        // Clone out of the lock so a hook that re-registers does not deadlock.
        let hook = self.lock().clone();
        match hook {
            Some(hook) => {
                hook(message);
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<WarningHook>> {
        self.hook.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registered = self.lock().is_some();
        f.debug_struct("HookRegistry")
            .field("registered", &registered)
            .finish()
    }
}
