//! Physical stack capture.
//!
//! Walks the worker thread's call stack and records raw return addresses,
//! innermost first. Because the host scheduler resumes cooperative tasks from
//! its dispatch loop, a physical capture taken inside a resumed task only
//! reaches back to that loop; splicing in the task's saved logical history is
//! handled by [`crate::boundary`].
//!
//! Capture truncates silently at the cap and has no error path.

use std::fmt;

/// Hard cap on captured frames per report.
pub const MAX_CAPTURE_FRAMES: usize = 64;

/// Frames belonging to the capture machinery itself (the unwinder callback
/// and [`capture`]), skipped so the innermost reported frame is the caller.
const SELF_FRAMES: usize = 2;

/// A raw return address taken from a stack frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameAddr(usize);

impl FrameAddr {
    /// Wraps a raw address.
    #[must_use]
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    /// The raw address value.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Debug for FrameAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameAddr({:#x})", self.0)
    }
}

impl fmt::LowerHex for FrameAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// An ordered, innermost-first sequence of captured return addresses.
#[derive(Debug, Clone, Default)]
pub struct CapturedFrames {
    frames: Vec<FrameAddr>,
}

impl CapturedFrames {
    /// Builds a sequence from raw addresses (innermost first).
    #[must_use]
    pub fn from_addrs(addrs: Vec<usize>) -> Self {
        Self {
            frames: addrs.into_iter().map(FrameAddr::new).collect(),
        }
    }

    /// The frames, innermost first.
    #[must_use]
    pub fn as_slice(&self) -> &[FrameAddr] {
        &self.frames
    }

    /// Consumes the sequence.
    #[must_use]
    pub fn into_vec(self) -> Vec<FrameAddr> {
        self.frames
    }

    /// Number of captured frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frames were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Captures up to `max_frames` physical return addresses from the current
/// thread, innermost first.
///
/// Truncates silently at the smaller of `max_frames` and
/// [`MAX_CAPTURE_FRAMES`].
#[must_use]
pub fn capture(max_frames: usize) -> CapturedFrames {
    let cap = max_frames.min(MAX_CAPTURE_FRAMES);
    if cap == 0 {
        return CapturedFrames::default();
    }

    let mut raw: Vec<FrameAddr> = Vec::with_capacity(cap + SELF_FRAMES);
    backtrace::trace(|frame| {
        raw.push(FrameAddr::new(frame.ip() as usize));
        raw.len() < cap + SELF_FRAMES
    });

    let frames = raw.into_iter().skip(SELF_FRAMES).collect();
    CapturedFrames { frames }
}
