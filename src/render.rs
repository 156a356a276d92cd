//! Stack trace rendering.
//!
//! Two of the three verbosity strategies live here:
//!
//! - Level 1 ([`Verbosity::Addresses`]): one bare address per line.
//! - Level 2 ([`Verbosity::Symbols`]): demangled names with `file:line`
//!   where available, segment markers around spliced cooperative frames,
//!   raw-address fallback for any frame that fails to resolve.
//!
//! Level 3 replaces programmatic rendering entirely and lives in
//! [`crate::debugger`].
//!
//! Symbol resolution sits behind the [`SymbolResolver`] trait so tests can
//! substitute a deterministic table; the production implementation resolves
//! through the `backtrace` crate.

use crate::boundary::SplicedTrace;
use crate::capture::FrameAddr;
use crate::config::Verbosity;
use std::ffi::c_void;
use std::fmt::Write as _;
use std::sync::Arc;

/// A frame address resolved to human-readable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    /// Demangled function name.
    pub name: String,
    /// Source file, when debug info is available.
    pub file: Option<String>,
    /// Line number, when debug info is available.
    pub line: Option<u32>,
}

impl ResolvedSymbol {
    /// A symbol with a name and no source location.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            line: None,
        }
    }
}

/// Turns a return address into a symbol, or `None` when resolution fails.
///
/// Failure is per-frame and local: the renderer falls back to the raw
/// address and keeps going.
pub trait SymbolResolver: Send + Sync {
    /// Resolves one address.
    fn resolve(&self, addr: FrameAddr) -> Option<ResolvedSymbol>;
}

/// Production resolver backed by the `backtrace` crate.
///
/// Takes the first symbol reported for the address that carries a name
/// (inlined frames may report several).
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceResolver;

impl SymbolResolver for BacktraceResolver {
    fn resolve(&self, addr: FrameAddr) -> Option<ResolvedSymbol> {
        let mut resolved = None;
        backtrace::resolve(addr.as_usize() as *mut c_void, |symbol| {
            if resolved.is_some() {
                return;
            }
            if let Some(name) = symbol.name() {
                resolved = Some(ResolvedSymbol {
                    name: name.to_string(),
                    file: symbol
                        .filename()
                        .and_then(|p| p.to_str())
                        .map(str::to_owned),
                    line: symbol.lineno(),
                });
            }
        });
        resolved
    }
}

/// Renders a spliced trace into text at a configured verbosity.
#[derive(Clone)]
pub struct StackRenderer {
    verbosity: Verbosity,
    resolver: Arc<dyn SymbolResolver>,
}

impl StackRenderer {
    /// Creates a renderer with the production symbol resolver.
    #[must_use]
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_resolver(verbosity, Arc::new(BacktraceResolver))
    }

    /// Creates a renderer with a custom resolver.
    #[must_use]
    pub fn with_resolver(verbosity: Verbosity, resolver: Arc<dyn SymbolResolver>) -> Self {
        Self {
            verbosity,
            resolver,
        }
    }

    /// Appends the rendered trace to `out`, one line per frame.
    ///
    /// Frame numbering at level 2 continues across segments so the spliced
    /// report reads as a single stack.
    pub fn render(&self, trace: &SplicedTrace, out: &mut String) {
        match self.verbosity {
            Verbosity::Off | Verbosity::Debugger => {}
            Verbosity::Addresses => self.render_addresses(trace, out),
            Verbosity::Symbols => self.render_symbols(trace, out),
        }
    }

    fn render_addresses(&self, trace: &SplicedTrace, out: &mut String) {
        for segment in trace.segments() {
            for addr in &segment.frames {
                let _ = writeln!(out, "{addr:#x}");
            }
        }
    }

    fn render_symbols(&self, trace: &SplicedTrace, out: &mut String) {
        let mut index = 0usize;
        for segment in trace.segments() {
            if let Some(marker) = segment.kind.marker() {
                let _ = writeln!(out, "{marker}");
            }
            for addr in &segment.frames {
                match self.resolver.resolve(*addr) {
                    Some(symbol) => {
                        let _ = write!(out, "#{index:<2} {}", symbol.name);
                        if let (Some(file), Some(line)) = (&symbol.file, symbol.line) {
                            let _ = write!(out, " at {file}:{line}");
                        }
                        out.push('\n');
                    }
                    None => {
                        let _ = writeln!(out, "#{index:<2} {addr:#x}");
                    }
                }
                index += 1;
            }
        }
    }
}

impl std::fmt::Debug for StackRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackRenderer")
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}
