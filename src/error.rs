//! Error types for the diagnostics engine.
//!
//! The engine recovers from almost everything internally: rate limiting is a
//! policy outcome, and a frame that fails symbol resolution falls back to its
//! raw address. The errors below cover the two places where a typed failure
//! is still useful: the external debugger capability and configuration
//! parsing.

use std::io;
use thiserror::Error;

/// Errors from the external debugger capability.
///
/// Every variant is recovered by writing an explanatory line into the report
/// in place of the backtrace; none of these abort the emit.
#[derive(Debug, Error)]
pub enum DebuggerError {
    /// The running executable's own path could not be resolved.
    #[error("can't get name of executable file: {source}")]
    ExePathUnresolved {
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The debugger process failed to start.
    #[error("gdb failed to start: {source}")]
    SpawnFailed {
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// This platform has no process model to attach a debugger with.
    #[error("no external debugger available on this platform")]
    Unsupported,
}

/// Errors from applying environment-variable overrides.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An override variable is set but its value does not parse.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnvValue {
        /// The environment variable name.
        var: &'static str,
        /// The offending value.
        value: String,
    },
}
