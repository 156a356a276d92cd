//! Tracing compatibility layer for structured logging.
//!
//! This module provides a unified interface for tracing that works whether or
//! not the `tracing-integration` feature is enabled:
//!
//! - **With feature enabled**: Re-exports from the `tracing` crate for full
//!   functionality.
//! - **Without feature**: No-op macros that compile to nothing for zero
//!   runtime overhead. The diagnostics engine sits on hot error paths, so its
//!   own telemetry must cost nothing unless asked for.
//!
//! # Usage
//!
//! ```rust,ignore
//! use faultline::tracing_compat::{debug, trace, warn};
//!
//! // These compile to no-ops when tracing-integration is disabled
//! debug!(severity = ?severity, "diagnostic suppressed");
//! ```

#[cfg(feature = "tracing-integration")]
pub use tracing::{debug, error, info, trace, warn};

// When tracing is disabled, provide no-op macros
#[cfg(not(feature = "tracing-integration"))]
mod noop {
    //! No-op implementations when tracing is disabled.
    //!
    //! These macros expand to nothing, ensuring zero compile-time and
    //! runtime cost.

    /// No-op trace-level logging macro.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op debug-level logging macro.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op info-level logging macro.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op warn-level logging macro.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// No-op error-level logging macro.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    // Re-export the macros at module level
    pub use crate::{debug, error, info, trace, warn};
}

#[cfg(not(feature = "tracing-integration"))]
pub use noop::*;
