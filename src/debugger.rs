//! External debugger attach (level-3 rendering).
//!
//! The heavyweight strategy: spawn a debugger attached to this process and
//! let it print its own view of every thread's stack. This replaces
//! programmatic rendering entirely for the call and blocks the emitting
//! thread until the debugger exits; there is deliberately no timeout, only
//! startup failures return quickly.
//!
//! Attachment is tied to a process/subprocess model, so it sits behind
//! [`DebuggerCapability`]; platforms without that model get a stub that
//! degrades to an explanatory line.

use crate::error::DebuggerError;
use crate::tracing_compat::debug;
use std::sync::Arc;

/// Capability to produce a debugger-generated backtrace of this process.
pub trait DebuggerCapability: Send + Sync {
    /// Runs the debugger and returns its combined output.
    ///
    /// Blocks until the debugger exits.
    fn capture_backtrace(&self) -> Result<String, DebuggerError>;
}

/// Attaches gdb in batch mode to the running process.
///
/// Identifies the target by the resolved executable path and pid, runs
/// `thread` plus `bt`, and returns everything the child printed.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct GdbDebugger;

#[cfg(unix)]
impl DebuggerCapability for GdbDebugger {
    fn capture_backtrace(&self) -> Result<String, DebuggerError> {
        use std::process::{Command, Stdio};

        let exe = std::env::current_exe()
            .map_err(|source| DebuggerError::ExePathUnresolved { source })?;
        let pid = std::process::id().to_string();
        debug!(pid = %pid, exe = %exe.display(), "attaching gdb");

        let output = Command::new("gdb")
            .args(["--batch", "-n", "-ex", "thread", "-ex", "bt"])
            .arg(&exe)
            .arg(&pid)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| DebuggerError::SpawnFailed { source })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

/// Stub for platforms without a subprocess model to attach through.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedDebugger;

impl DebuggerCapability for UnsupportedDebugger {
    fn capture_backtrace(&self) -> Result<String, DebuggerError> {
        Err(DebuggerError::Unsupported)
    }
}

/// The default capability for this platform.
#[must_use]
pub fn default_capability() -> Arc<dyn DebuggerCapability> {
    #[cfg(unix)]
    {
        Arc::new(GdbDebugger)
    }
    #[cfg(not(unix))]
    {
        Arc::new(UnsupportedDebugger)
    }
}

/// Appends the debugger backtrace to `out`, degrading to an explanatory
/// line on failure. Never silent.
pub fn append_backtrace(capability: &dyn DebuggerCapability, out: &mut String) {
    match capability.capture_backtrace() {
        Ok(text) => out.push_str(&text),
        Err(err) => {
            out.push_str("Can't print backtrace with gdb: ");
            out.push_str(&err.to_string());
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDebugger(&'static str);

    impl DebuggerCapability for FixedDebugger {
        fn capture_backtrace(&self) -> Result<String, DebuggerError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingDebugger;

    impl DebuggerCapability for FailingDebugger {
        fn capture_backtrace(&self) -> Result<String, DebuggerError> {
            Err(DebuggerError::SpawnFailed {
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing binary"),
            })
        }
    }

    #[test]
    fn test_append_backtrace_passes_output_through() {
        crate::test_utils::init_test_logging();
        let mut out = String::new();
        append_backtrace(&FixedDebugger("#0 main\n"), &mut out);
        crate::assert_with_log!(out == "#0 main\n", "output copied", "#0 main\n", out.as_str());
        crate::test_complete!("test_append_backtrace_passes_output_through");
    }

    #[test]
    fn test_spawn_failure_degrades_to_explanatory_line() {
        crate::test_utils::init_test_logging();
        let mut out = String::new();
        append_backtrace(&FailingDebugger, &mut out);
        crate::assert_with_log!(
            out.starts_with("Can't print backtrace with gdb:"),
            "explanatory line",
            true,
            out.starts_with("Can't print backtrace with gdb:")
        );
        crate::assert_with_log!(out.ends_with('\n'), "line terminated", true, out.ends_with('\n'));
        crate::test_complete!("test_spawn_failure_degrades_to_explanatory_line");
    }

    #[test]
    fn test_unsupported_stub_reports_platform() {
        crate::test_utils::init_test_logging();
        let mut out = String::new();
        append_backtrace(&UnsupportedDebugger, &mut out);
        crate::assert_with_log!(
            out.contains("no external debugger"),
            "stub message",
            true,
            out.contains("no external debugger")
        );
        crate::test_complete!("test_unsupported_stub_reports_platform");
    }
}
