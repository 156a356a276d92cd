//! Non-reentrancy guard around the render and emit path.
//!
//! This is not a general-purpose lock: it never blocks. It tracks how deep
//! the current process is inside the diagnostic pipeline so that downstream
//! logic (the warning hook in particular) can refuse to run when invoked
//! reentrantly and trigger a recursive diagnostic.
//!
//! The depth is a process-wide atomic shared by every cooperative task on
//! every worker thread; interleaved tasks and genuinely concurrent threads
//! are both covered.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Critical-section depth for the diagnostic pipeline.
#[derive(Debug, Default)]
pub struct CriticalSection {
    depth: AtomicUsize,
}

impl CriticalSection {
    /// Creates an unheld section.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            depth: AtomicUsize::new(0),
        }
    }

    /// Enters the section, returning a guard that leaves it on drop.
    ///
    /// Release is tied to the guard's scope, so it happens on every exit
    /// path; the termination primitive is only invoked after the guard for
    /// the triggering event has dropped.
    #[must_use]
    pub fn enter(&self) -> CriticalGuard<'_> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        CriticalGuard { section: self }
    }

    /// Whether any caller currently holds the section.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }
}

/// Scoped handle for one level of the critical section.
#[derive(Debug)]
pub struct CriticalGuard<'a> {
    section: &'a CriticalSection,
}

impl Drop for CriticalGuard<'_> {
    fn drop(&mut self) {
        self.section.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
