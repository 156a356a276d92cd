//! Windowed rate limiting for diagnostic reports.
//!
//! Many warnings in a tight loop would otherwise flood the error stream, so
//! at most `cap` reports render per window. Excess events are counted and
//! summarized: when the cap is first exceeded a one-line notice says printing
//! stopped, and the first rendered report of the next window is preceded by a
//! "resuming, K skipped" notice.
//!
//! All arithmetic is over whole seconds; rate limiting is a policy outcome,
//! never an error.

/// Notice that printing stopped for the rest of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitNotice {
    /// Second at which the next window opens and printing resumes.
    pub resume_at_secs: u64,
}

/// Notice that printing resumed after a window in which events were skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeNotice {
    /// How many events were suppressed in the previous window.
    pub skipped: u64,
}

/// Decision for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateGate {
    /// The event may render. `resume_notice` is present on the first render
    /// after a window that skipped events.
    Render {
        /// Pending "resuming, K skipped" notice, if any.
        resume_notice: Option<ResumeNotice>,
    },
    /// The event is suppressed and counted. `limit_notice` is present only
    /// the first time the cap is exceeded within the window.
    Suppress {
        /// Pending "limit reached" notice, if any.
        limit_notice: Option<LimitNotice>,
    },
}

impl RateGate {
    /// Whether the event may render.
    #[must_use]
    pub const fn allows(self) -> bool {
        matches!(self, Self::Render { .. })
    }
}

/// Per-window counters governing how many diagnostics render.
///
/// Owned by the sink and accessed under its lock; the limiter itself is
/// plain state with no interior synchronization.
#[derive(Debug)]
pub struct RateLimiter {
    window_secs: u64,
    cap: u32,
    window_start: u64,
    emitted: u32,
    skipped: u64,
}

impl RateLimiter {
    /// Creates a limiter. The first `check` call opens the first window.
    #[must_use]
    pub fn new(window_secs: u64, cap: u32) -> Self {
        Self {
            window_secs: window_secs.max(1),
            cap,
            window_start: 0,
            emitted: 0,
            skipped: 0,
        }
    }

    /// Number of events suppressed in the current window.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Gates one event at time `now_secs`.
    ///
    /// A window resets exactly when `now_secs - window_start >= window_secs`;
    /// an event one second before that boundary still belongs to the old
    /// window.
    pub fn check(&mut self, now_secs: u64) -> RateGate {
        let mut resume_notice = None;
        if now_secs >= self.window_start.saturating_add(self.window_secs) {
            self.window_start = now_secs;
            self.emitted = 0;
            if self.skipped > 0 {
                resume_notice = Some(ResumeNotice {
                    skipped: self.skipped,
                });
            }
            self.skipped = 0;
        }

        if self.emitted < self.cap {
            self.emitted += 1;
            RateGate::Render { resume_notice }
        } else {
            self.skipped += 1;
            let limit_notice = (self.skipped == 1).then_some(LimitNotice {
                resume_at_secs: self.window_start + self.window_secs,
            });
            RateGate::Suppress { limit_notice }
        }
    }
}
