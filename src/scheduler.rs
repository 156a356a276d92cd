//! The narrow query interface consumed from the host scheduler.
//!
//! The diagnostics engine never inspects scheduler internals. It asks two
//! questions through [`SchedulerQuery`]:
//!
//! 1. Which address range does the dispatch loop own right now? (Used by the
//!    boundary classifier; `None` means no cooperative dispatch is active.)
//! 2. What is the saved logical frame history of the most recently suspended
//!    cooperative task?
//!
//! The host scheduler implements this trait and registers it on the sink.
//! Publishing the dispatch region as an explicit value keeps the engine free
//! of linker-section tricks: the scheduler states where its loop lives
//! instead of the engine inferring it from instruction addresses.

use crate::boundary::SchedulerRegion;
use crate::capture::FrameAddr;
use std::sync::Arc;

/// Read-only view of scheduler state needed to build a spliced trace.
///
/// Implementations must be cheap and non-suspending: both methods are called
/// synchronously on the emitting thread, possibly from inside a resumed
/// cooperative task.
pub trait SchedulerQuery: Send + Sync {
    /// The dispatch loop's address region, if the scheduler is active on
    /// this process. Fixed at startup; must never change once published.
    fn dispatch_region(&self) -> Option<SchedulerRegion>;

    /// The saved logical return-address history of the currently suspended
    /// cooperative task, innermost first, truncated to `max_frames`.
    ///
    /// Returns an empty vector when no cooperative context exists.
    fn logical_frames(&self, max_frames: usize) -> Vec<FrameAddr>;
}

/// Supplies the suspended task's logical frames for splicing.
///
/// Conceptually: "what the call stack would look like if the cooperative
/// task had been a normal stack frame."
#[derive(Clone)]
pub struct CooperativeStackProvider {
    query: Arc<dyn SchedulerQuery>,
}

impl CooperativeStackProvider {
    /// Wraps a scheduler query.
    #[must_use]
    pub fn new(query: Arc<dyn SchedulerQuery>) -> Self {
        Self { query }
    }

    /// The logical frames of the current cooperative task, or empty when no
    /// cooperative context exists.
    #[must_use]
    pub fn current_logical_frames(&self, max_frames: usize) -> Vec<FrameAddr> {
        let mut frames = self.query.logical_frames(max_frames);
        frames.truncate(max_frames);
        frames
    }

    /// The dispatch region published by the scheduler.
    #[must_use]
    pub fn dispatch_region(&self) -> Option<SchedulerRegion> {
        self.query.dispatch_region()
    }
}

impl std::fmt::Debug for CooperativeStackProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooperativeStackProvider")
            .finish_non_exhaustive()
    }
}
