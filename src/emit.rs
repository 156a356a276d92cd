//! Process-wide entry points.
//!
//! A single [`DiagnosticSink`] serves the whole process. Install it once at
//! startup with [`install`]; emitting before that lazily installs a sink
//! built from defaults plus `FAULTLINE_*` environment overrides.
//!
//! The [`warning!`] and [`fault_assert!`] macros are the intended call
//! sites; the free functions underneath them are public for hosts that
//! already have a formatted message in hand.

use crate::config::DiagnosticsConfig;
use crate::env_config;
use crate::signal;
use crate::sink::{DiagnosticSink, Fate, Severity};
use crate::tracing_compat::warn;
use std::fmt;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<DiagnosticSink> = OnceLock::new();

/// Installs the process-wide sink.
///
/// Returns the installed sink, or the previously installed one if a sink
/// already exists (installation is first-wins).
pub fn install(config: DiagnosticsConfig) -> &'static DiagnosticSink {
    GLOBAL.get_or_init(|| DiagnosticSink::new(config))
}

/// The process-wide sink, lazily installed from defaults and environment
/// overrides on first use.
pub fn sink() -> &'static DiagnosticSink {
    GLOBAL.get_or_init(|| {
        let mut config = DiagnosticsConfig::default();
        if let Err(err) = env_config::apply_env_overrides(&mut config) {
            warn!(error = %err, "ignoring invalid diagnostics environment override");
        }
        DiagnosticSink::new(config)
    })
}

/// Formats and emits a warning-severity event.
///
/// Terminates the process if the fatal-warnings toggle is set.
pub fn emit_diagnostic(args: fmt::Arguments<'_>) {
    let message = fmt::format(args);
    let outcome = sink().emit(Severity::Warning, &message);
    if outcome.fate == Fate::Terminate {
        signal::fault_exit("_exiting after warning: fatal warnings are enabled");
    }
}

/// Emits a fatal assertion report and terminates. Never returns.
pub fn fatal_assert(description: &str, file: &str, line: u32) -> ! {
    let message =
        format!("Assertion \"{description}\" failed in file {file} on line {line}");
    let _ = sink().emit(Severity::FatalAssertion, &message);
    signal::fault_exit("_exiting on fatal assertion")
}

/// Registers the process-wide warning hook.
pub fn set_warning_hook(hook: impl Fn(&str) + Send + Sync + 'static) {
    sink().set_warning_hook(Arc::new(hook));
}

/// Emits a warning-severity diagnostic with `format!`-style arguments.
///
/// # Example
///
/// ```ignore
/// faultline::warning!("lease {} expired after {}ms", lease_id, age_ms);
/// ```
#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => {
        $crate::emit_diagnostic(core::format_args!($($arg)*))
    };
}

/// Checks a condition and, when it fails, emits a fatal assertion report and
/// terminates the process with the fault signal.
///
/// An optional second argument overrides the rendered condition text.
#[macro_export]
macro_rules! fault_assert {
    ($cond:expr) => {
        if !$cond {
            $crate::fatal_assert(core::stringify!($cond), core::file!(), core::line!());
        }
    };
    ($cond:expr, $description:expr) => {
        if !$cond {
            $crate::fatal_assert($description, core::file!(), core::line!());
        }
    };
}
