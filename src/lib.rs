//! Faultline: diagnostic and failure-reporting engine for cooperative-scheduler runtimes.
//!
//! # Overview
//!
//! Faultline captures and renders execution context when running code emits a
//! warning or a fatal assertion, inside a host runtime that multiplexes many
//! cooperative tasks onto worker threads. The hard part it solves: a physical
//! capture taken inside a resumed task only reaches back to the scheduler's
//! dispatch loop, so faultline splices the suspended task's saved logical
//! frame history into the physical capture to form one coherent trace.
//!
//! # Core Guarantees
//!
//! - **Bounded noise**: at most `window_cap` reports render per rate window;
//!   the excess is counted and summarized when printing resumes
//! - **No recursive diagnostics**: a critical-section guard suppresses the
//!   warning hook while the pipeline itself is active
//! - **Byte-atomic reports**: each report is one `write_all`; reports from
//!   interleaving contexts never mix on the error stream
//! - **Signal-marked termination**: assertion failures raise a dedicated
//!   fault signal and exit immediately, skipping cleanup so teardown
//!   failures cannot mask the original fault
//! - **Escalating render strategies**: raw addresses, symbol resolution with
//!   per-frame fallback, or an attached external debugger
//!
//! # Module Structure
//!
//! - [`config`]: process-wide configuration and verbosity levels
//! - [`env_config`]: `FAULTLINE_*` environment overrides
//! - [`rate`]: windowed rate limiting with skip summaries
//! - [`critical`]: non-reentrancy guard around the render path
//! - [`capture`]: physical stack capture
//! - [`boundary`]: scheduler boundary classification and frame splicing
//! - [`scheduler`]: the query interface consumed from the host scheduler
//! - [`render`]: level-1/2 rendering with a symbol-resolver seam
//! - [`debugger`]: level-3 external debugger attach
//! - [`hook`]: registrable warning callback
//! - [`signal`]: fault signal and immediate exit primitive
//! - [`sink`]: report composition, atomic writes, termination decisions
//! - [`emit`]: the process-wide sink and public entry points
//! - [`error`]: error types
//!
//! # Example
//!
//! ```ignore
//! faultline::install(faultline::DiagnosticsConfig::default());
//! faultline::warning!("lease {} expired", lease_id);
//! faultline::fault_assert!(queue.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod boundary;
pub mod capture;
pub mod config;
pub mod critical;
pub mod debugger;
pub mod emit;
pub mod env_config;
pub mod error;
pub mod hook;
pub mod rate;
pub mod render;
pub mod scheduler;
pub mod signal;
pub mod sink;
pub mod test_utils;
pub mod tracing_compat;

// Re-exports for convenient access to core types
pub use boundary::{classify, splice, SchedulerRegion, Segment, SegmentKind, SplicedTrace};
pub use capture::{capture, CapturedFrames, FrameAddr, MAX_CAPTURE_FRAMES};
pub use config::{DiagnosticsConfig, Verbosity};
pub use critical::{CriticalGuard, CriticalSection};
pub use debugger::DebuggerCapability;
pub use emit::{emit_diagnostic, fatal_assert, install, set_warning_hook, sink};
pub use error::{ConfigError, DebuggerError};
pub use hook::WarningHook;
pub use rate::{RateGate, RateLimiter};
pub use render::{ResolvedSymbol, StackRenderer, SymbolResolver};
pub use scheduler::{CooperativeStackProvider, SchedulerQuery};
pub use signal::raise_fault_signal;
pub use sink::{DiagnosticEvent, DiagnosticSink, EmitOutcome, Fate, ReportStatus, Severity};
