//! The diagnostic sink: composes, rate-gates, renders, and writes reports.
//!
//! One sink instance owns every piece of shared diagnostic state: the rate
//! window, the critical-section depth, the hook registry, and the output
//! stream. Emission is synchronous; nothing in the pipeline suspends.
//!
//! Each report is composed into one buffer and written with a single
//! `write_all` under the stream lock, so reports from concurrently
//! interleaving contexts never interleave at the byte level. No ordering is
//! promised between reports beyond that.
//!
//! The sink never terminates the process itself: it reports a [`Fate`] and
//! the caller (normally [`crate::emit_diagnostic`] or
//! [`crate::fatal_assert`]) executes it. That keeps every termination
//! decision observable in tests.

use crate::boundary::{classify, splice, SplicedTrace};
use crate::capture::{self, CapturedFrames};
use crate::config::{DiagnosticsConfig, Verbosity};
use crate::critical::CriticalSection;
use crate::debugger::{self, DebuggerCapability};
use crate::hook::{HookRegistry, WarningHook};
use crate::rate::{RateGate, RateLimiter};
use crate::render::{StackRenderer, SymbolResolver};
use crate::scheduler::{CooperativeStackProvider, SchedulerQuery};
use crate::tracing_compat::{debug, trace};
use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// How serious a diagnostic event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Advisory; execution continues (unless warnings are forced fatal).
    Warning,
    /// A failed assertion; always ends the process.
    FatalAssertion,
}

impl Severity {
    /// Header tag for the report.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::FatalAssertion => "Fatal assertion",
        }
    }
}

/// One diagnostic event; created per call and discarded after rendering.
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    /// Wall-clock time in whole seconds since the unix epoch.
    pub timestamp_secs: u64,
    /// The formatted message.
    pub message: String,
    /// Event severity.
    pub severity: Severity,
}

/// What must happen to the process after the emit returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    /// Execution continues normally.
    Continue,
    /// The process must terminate via the fault-signal primitive.
    Terminate,
}

/// Whether a report was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    /// A full report was written to the error stream.
    Written,
    /// Suppressed by the rate limiter and counted as skipped.
    RateLimited,
    /// Diagnostics are disabled (master switch off or verbosity 0).
    Disabled,
}

/// Result of one emit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOutcome {
    /// Whether a report was produced.
    pub status: ReportStatus,
    /// Whether the process must terminate.
    pub fate: Fate,
}

/// Composes and writes diagnostic reports.
pub struct DiagnosticSink {
    config: DiagnosticsConfig,
    limiter: Mutex<RateLimiter>,
    critical: CriticalSection,
    hooks: HookRegistry,
    stream: Mutex<Box<dyn Write + Send>>,
    scheduler: RwLock<Option<Arc<dyn SchedulerQuery>>>,
    renderer: StackRenderer,
    debugger: Arc<dyn DebuggerCapability>,
}

impl DiagnosticSink {
    /// Creates a sink writing to the process error stream.
    #[must_use]
    pub fn new(config: DiagnosticsConfig) -> Self {
        Self::with_stream(config, Box::new(std::io::stderr()))
    }

    /// Creates a sink writing to an arbitrary stream (tests use a buffer).
    #[must_use]
    pub fn with_stream(mut config: DiagnosticsConfig, stream: Box<dyn Write + Send>) -> Self {
        config.normalize();
        let limiter = RateLimiter::new(config.window.as_secs(), config.window_cap);
        let renderer = StackRenderer::new(config.verbosity);
        Self {
            config,
            limiter: Mutex::new(limiter),
            critical: CriticalSection::new(),
            hooks: HookRegistry::new(),
            stream: Mutex::new(stream),
            scheduler: RwLock::new(None),
            renderer,
            debugger: debugger::default_capability(),
        }
    }

    /// Replaces the symbol resolver (level-2 rendering).
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn SymbolResolver>) -> Self {
        self.renderer = StackRenderer::with_resolver(self.config.verbosity, resolver);
        self
    }

    /// Replaces the debugger capability (level-3 rendering).
    #[must_use]
    pub fn with_debugger(mut self, capability: Arc<dyn DebuggerCapability>) -> Self {
        self.debugger = capability;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// The pipeline's critical section.
    ///
    /// Host code may enter it around regions where a warning hook must not
    /// run (for example inside a custom allocator).
    #[must_use]
    pub fn critical_section(&self) -> &CriticalSection {
        &self.critical
    }

    /// Registers the scheduler query used for boundary classification and
    /// cooperative frame splicing.
    pub fn set_scheduler(&self, query: Arc<dyn SchedulerQuery>) {
        *self
            .scheduler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(query);
    }

    /// Registers the warning hook.
    pub fn set_warning_hook(&self, hook: WarningHook) {
        self.hooks.set(hook);
    }

    /// Removes the warning hook.
    pub fn clear_warning_hook(&self) {
        self.hooks.clear();
    }

    /// Emits an event stamped with the current wall-clock time.
    pub fn emit(&self, severity: Severity, message: &str) -> EmitOutcome {
        self.emit_at(severity, message, unix_now_secs())
    }

    /// Emits an event at an explicit timestamp.
    ///
    /// The timestamp drives both the report header and the rate window, so
    /// tests can walk time forward deterministically.
    pub fn emit_at(&self, severity: Severity, message: &str, now_secs: u64) -> EmitOutcome {
        let fate = self.fate_for(severity);
        if !self.config.enabled || self.config.verbosity == Verbosity::Off {
            return EmitOutcome {
                status: ReportStatus::Disabled,
                fate,
            };
        }

        let gate = self
            .limiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .check(now_secs);
        let resume_notice = match gate {
            RateGate::Suppress { limit_notice } => {
                if let Some(notice) = limit_notice {
                    let line = format!(
                        "[{now_secs}] Warnings limit reached. No more will be printed till {}\n",
                        notice.resume_at_secs
                    );
                    self.write_atomic(&line);
                }
                debug!(severity = ?severity, "diagnostic suppressed by rate limiter");
                return EmitOutcome {
                    status: ReportStatus::RateLimited,
                    fate,
                };
            }
            RateGate::Render { resume_notice } => resume_notice,
        };

        let event = DiagnosticEvent {
            timestamp_secs: now_secs,
            message: message.to_string(),
            severity,
        };

        {
            let _guard = self.critical.enter();
            let mut buf = String::new();
            if let Some(notice) = resume_notice {
                let _ = writeln!(
                    buf,
                    "[{now_secs}] Resuming writing warnings: {} skipped",
                    notice.skipped
                );
            }
            let _ = writeln!(
                buf,
                "[{}] {}: {}",
                event.timestamp_secs,
                event.severity.tag(),
                event.message
            );
            buf.push_str("------- Stack Backtrace -------\n");
            if self.config.verbosity == Verbosity::Debugger {
                debugger::append_backtrace(&*self.debugger, &mut buf);
            } else {
                let frames = capture::capture(self.config.max_frames);
                let spliced = self.build_trace(frames);
                self.renderer.render(&spliced, &mut buf);
            }
            buf.push_str("-------------------------------\n\n");
            self.write_atomic(&buf);
        }

        // The hook runs outside our own critical section; it is skipped
        // entirely when an enclosing section is still held.
        if severity == Severity::Warning && !self.critical.is_held() {
            let ran = self.hooks.invoke(&event.message);
            trace!(hook_ran = ran, "warning hook dispatch");
        }

        EmitOutcome {
            status: ReportStatus::Written,
            fate,
        }
    }

    fn fate_for(&self, severity: Severity) -> Fate {
        match severity {
            Severity::FatalAssertion => Fate::Terminate,
            Severity::Warning if self.config.fatal_warnings => Fate::Terminate,
            Severity::Warning => Fate::Continue,
        }
    }

    /// Splits the physical capture at the scheduler boundary and splices in
    /// the suspended task's logical frames.
    fn build_trace(&self, frames: CapturedFrames) -> SplicedTrace {
        let query = self
            .scheduler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(query) = query else {
            return SplicedTrace::physical(frames.into_vec());
        };
        let provider = CooperativeStackProvider::new(query);
        let Some(region) = provider.dispatch_region() else {
            return SplicedTrace::physical(frames.into_vec());
        };
        let boundary = classify(frames.as_slice(), region);
        if boundary == frames.len() {
            return SplicedTrace::physical(frames.into_vec());
        }
        let cooperative = provider.current_logical_frames(self.config.max_frames);
        splice(frames, boundary, cooperative)
    }

    /// Writes a fully composed chunk with one `write_all` under the stream
    /// lock. Output is best effort; write failures are swallowed.
    fn write_atomic(&self, chunk: &str) {
        let mut stream = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = stream.write_all(chunk.as_bytes());
        let _ = stream.flush();
    }
}

impl std::fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
