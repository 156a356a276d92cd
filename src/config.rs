//! Process-wide diagnostics configuration.
//!
//! These types hold the concrete values that drive the reporting engine. In
//! most cases you should call [`crate::install`] once at startup with a
//! config built here, optionally layered with
//! [`crate::env_config::apply_env_overrides`].
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `enabled` | true |
//! | `verbosity` | `Verbosity::Symbols` (level 2) |
//! | `window` | 300 seconds |
//! | `window_cap` | 1000 reports per window |
//! | `fatal_warnings` | false |
//! | `max_frames` | 64 |

use std::time::Duration;

/// How much work the renderer does per report.
///
/// Levels escalate from nothing to attaching an external debugger:
///
/// - `Off`: no output at all.
/// - `Addresses`: one bare return address per line, no symbol resolution.
/// - `Symbols`: demangled names with `file:line` where available; frames
///   that fail to resolve fall back to their raw address.
/// - `Debugger`: spawn an external debugger attached to this process and
///   let it print the backtrace; replaces programmatic rendering entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Level 0: all diagnostic output disabled.
    Off,
    /// Level 1: raw return addresses only.
    Addresses,
    /// Level 2: symbol resolution with raw-address fallback.
    Symbols,
    /// Level 3: external debugger attach.
    Debugger,
}

impl Verbosity {
    /// Parses a numeric level (0–3).
    #[must_use]
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Off),
            1 => Some(Self::Addresses),
            2 => Some(Self::Symbols),
            3 => Some(Self::Debugger),
            _ => None,
        }
    }

    /// The numeric level this variant corresponds to.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Addresses => 1,
            Self::Symbols => 2,
            Self::Debugger => 3,
        }
    }

    /// Whether any backtrace section is rendered at this level.
    #[must_use]
    pub const fn renders_backtrace(self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// Configuration for the diagnostics engine.
///
/// Plain data; construct it, adjust fields or use the `with_*` helpers, and
/// hand it to [`crate::install`].
#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    /// Master switch. When false, every emit is a no-op (fatal events still
    /// terminate, they just produce no report).
    pub enabled: bool,
    /// Rendering strategy for stack traces.
    pub verbosity: Verbosity,
    /// Length of one rate-limiting window.
    pub window: Duration,
    /// Maximum number of reports rendered per window; the excess is counted
    /// and summarized when the next window opens.
    pub window_cap: u32,
    /// Treat warnings as fatal: after rendering, terminate the process the
    /// same way a failed assertion would.
    pub fatal_warnings: bool,
    /// Cap on captured physical frames (and on spliced logical frames).
    pub max_frames: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            verbosity: Verbosity::Symbols,
            window: Duration::from_secs(300),
            window_cap: 1000,
            fatal_warnings: false,
            max_frames: crate::capture::MAX_CAPTURE_FRAMES,
        }
    }
}

impl DiagnosticsConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rendering verbosity.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Sets the rate-limiting window length.
    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Sets the per-window report cap.
    #[must_use]
    pub fn with_window_cap(mut self, cap: u32) -> Self {
        self.window_cap = cap;
        self
    }

    /// Sets the fatal-warnings toggle.
    #[must_use]
    pub fn with_fatal_warnings(mut self, fatal: bool) -> Self {
        self.fatal_warnings = fatal;
        self
    }

    /// Normalizes values to safe bounds.
    ///
    /// `max_frames` is clamped to the capture buffer cap; a zero-length
    /// window is bumped to one second so rollover arithmetic stays sound.
    pub fn normalize(&mut self) {
        if self.max_frames > crate::capture::MAX_CAPTURE_FRAMES {
            self.max_frames = crate::capture::MAX_CAPTURE_FRAMES;
        }
        if self.window.is_zero() {
            self.window = Duration::from_secs(1);
        }
    }
}
