//! Test utilities for faultline.
//!
//! This module provides shared helpers for unit and integration tests:
//! - Consistent tracing-based logging initialization
//! - Phase/completion macros for readable test output
//! - Assertion macros that log expected/actual values
//! - A capture stream, a stub scheduler query, and a table-driven symbol
//!   resolver so the emit pipeline can be exercised deterministically
//!
//! # Example
//! ```
//! use faultline::test_utils::init_test_logging;
//!
//! fn my_test() {
//!     init_test_logging();
//!     // test body
//! }
//! ```

use crate::boundary::SchedulerRegion;
use crate::capture::FrameAddr;
use crate::render::{ResolvedSymbol, SymbolResolver};
use crate::scheduler::SchedulerQuery;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, Once, PoisonError};

static INIT_LOGGING: Once = Once::new();
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Acquire the global environment lock for tests that mutate env vars.
pub fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A clonable in-memory stream for capturing sink output in tests.
#[derive(Debug, Clone, Default)]
pub struct SharedBuf {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A scheduler query returning fixed answers.
#[derive(Debug)]
pub struct StubScheduler {
    region: Option<SchedulerRegion>,
    frames: Vec<FrameAddr>,
}

impl StubScheduler {
    /// Creates a stub publishing `region` and raw logical frame addresses.
    #[must_use]
    pub fn new(region: Option<SchedulerRegion>, frames: Vec<usize>) -> Self {
        Self {
            region,
            frames: frames.into_iter().map(FrameAddr::new).collect(),
        }
    }
}

impl SchedulerQuery for StubScheduler {
    fn dispatch_region(&self) -> Option<SchedulerRegion> {
        self.region
    }

    fn logical_frames(&self, max_frames: usize) -> Vec<FrameAddr> {
        self.frames.iter().copied().take(max_frames).collect()
    }
}

/// A symbol resolver backed by a fixed address table.
///
/// Addresses absent from the table fail resolution, which exercises the
/// raw-address fallback path deterministically.
#[derive(Debug, Default)]
pub struct TableResolver {
    symbols: HashMap<usize, ResolvedSymbol>,
}

impl TableResolver {
    /// Adds a table entry.
    #[must_use]
    pub fn with(mut self, addr: usize, symbol: ResolvedSymbol) -> Self {
        self.symbols.insert(addr, symbol);
        self
    }
}

impl SymbolResolver for TableResolver {
    fn resolve(&self, addr: FrameAddr) -> Option<ResolvedSymbol> {
        self.symbols.get(&addr.as_usize()).cloned()
    }
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}
