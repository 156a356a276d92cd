//! Concurrent emission and report atomicity.
//!
//! Many threads hammer one sink; every report must land on the stream as one
//! contiguous block with no byte interleaving between contexts.

use faultline::test_utils::{init_test_logging, SharedBuf};
use faultline::{DiagnosticSink, DiagnosticsConfig, Severity, Verbosity};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 25;

#[test]
fn concurrent_reports_never_interleave() {
    init_test_logging();
    faultline::test_phase!("concurrent_reports_never_interleave");

    let buf = SharedBuf::new();
    let config = DiagnosticsConfig::default()
        .with_verbosity(Verbosity::Addresses)
        .with_window_cap(u32::MAX);
    let sink = Arc::new(DiagnosticSink::with_stream(config, Box::new(buf.clone())));

    let mut handles = Vec::with_capacity(THREADS);
    for t in 0..THREADS {
        let sink = Arc::clone(&sink);
        handles.push(thread::spawn(move || {
            for i in 0..PER_THREAD {
                let _ = sink.emit_at(Severity::Warning, &format!("t{t} event {i}"), 100);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let out = buf.contents();
    // Each report ends with its footer plus a blank separator line, so the
    // stream splits cleanly into per-report blocks.
    let blocks: Vec<&str> = out
        .split("\n\n")
        .filter(|b| !b.trim().is_empty())
        .collect();
    faultline::assert_with_log!(
        blocks.len() == THREADS * PER_THREAD,
        "one block per report",
        THREADS * PER_THREAD,
        blocks.len()
    );

    for block in &blocks {
        let headers = block.matches("] Warning: t").count();
        faultline::assert_with_log!(headers == 1, "single header per block", 1usize, headers);
        let opens = block.matches("------- Stack Backtrace -------").count();
        faultline::assert_with_log!(opens == 1, "single backtrace open", 1usize, opens);
        let closed = block.trim_end().ends_with("-------------------------------");
        faultline::assert_with_log!(closed, "block closed by footer", true, closed);
    }

    faultline::test_complete!(
        "concurrent_reports_never_interleave",
        reports = blocks.len()
    );
}

#[test]
fn concurrent_rate_accounting_is_exact() {
    init_test_logging();
    faultline::test_phase!("concurrent_rate_accounting_is_exact");

    let buf = SharedBuf::new();
    let config = DiagnosticsConfig::default()
        .with_verbosity(Verbosity::Addresses)
        .with_window_cap(40);
    let sink = Arc::new(DiagnosticSink::with_stream(config, Box::new(buf.clone())));

    let mut handles = Vec::with_capacity(THREADS);
    for _ in 0..THREADS {
        let sink = Arc::clone(&sink);
        handles.push(thread::spawn(move || {
            for _ in 0..PER_THREAD {
                let _ = sink.emit_at(Severity::Warning, "contended", 100);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let out = buf.contents();
    let headers = out.matches("] Warning: contended").count();
    faultline::assert_with_log!(headers == 40, "cap holds under contention", 40usize, headers);
    let notices = out.matches("Warnings limit reached").count();
    faultline::assert_with_log!(notices == 1, "limit notice printed once", 1usize, notices);

    faultline::test_complete!("concurrent_rate_accounting_is_exact");
}
