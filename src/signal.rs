//! The dedicated fault signal and immediate process exit.
//!
//! Assertion failures must be distinguishable from other crashes by a
//! supervising process. The engine raises a dedicated signal before exiting:
//! with the default disposition the signal itself terminates the process with
//! a signal-identifiable status; if the host has installed a handler (or
//! ignores it), the follow-up `_exit(1)` still ends the run with a non-zero
//! code.
//!
//! `fault_exit` bypasses ordinary cleanup on purpose. Destructors and exit
//! handlers run arbitrary code, and a secondary failure during teardown
//! would mask the original diagnostic.

use std::io::Write;

/// The signal raised to mark an assertion failure.
#[cfg(unix)]
pub const FAULT_SIGNAL: i32 = libc::SIGUSR2;

/// Raises the fault signal without exiting.
///
/// For fault paths outside this crate that want the same externally
/// observable termination signature.
pub fn raise_fault_signal() {
    #[cfg(unix)]
    // SAFETY: raise() with a valid signal number is async-signal-safe and
    // has no preconditions beyond that.
    unsafe {
        let _ = libc::raise(FAULT_SIGNAL);
    }
}

/// Raises the fault signal, prints `final_line` to the error stream, and
/// performs an immediate low-level exit with status 1.
///
/// Never returns. Ordinary cleanup (destructors, exit handlers, buffered
/// output other than the line written here) is skipped.
pub fn fault_exit(final_line: &str) -> ! {
    raise_fault_signal();
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{final_line}");
    let _ = stderr.flush();
    #[cfg(unix)]
    // SAFETY: _exit terminates the process without unwinding; that is the
    // entire point of this primitive.
    unsafe {
        libc::_exit(1)
    }
    #[cfg(not(unix))]
    std::process::exit(1)
}
