//! Scheduler boundary classification and frame splicing.
//!
//! A physical capture taken inside a resumed cooperative task bottoms out in
//! the scheduler's dispatch loop: the frames below the resume point belong to
//! the scheduler, not to the task's logical call history. The classifier
//! finds where captured frames enter the dispatch loop's address region; the
//! splicer then inserts the task's saved logical frames at that point so the
//! report reads as one coherent trace.
//!
//! Segment order is always: pre-boundary physical frames, spliced
//! cooperative frames, post-boundary physical frames.

use crate::capture::{CapturedFrames, FrameAddr};

/// The address range owned by the scheduler's dispatch loop.
///
/// Published once by the host scheduler at startup and never mutated after;
/// bounds are inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerRegion {
    start: usize,
    end: usize,
}

impl SchedulerRegion {
    /// Creates a region from inclusive bounds. Reversed bounds are swapped.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn start(self) -> usize {
        self.start
    }

    /// Inclusive upper bound.
    #[must_use]
    pub const fn end(self) -> usize {
        self.end
    }

    /// Whether `addr` falls inside this region.
    #[must_use]
    pub const fn contains(self, addr: FrameAddr) -> bool {
        self.start <= addr.as_usize() && addr.as_usize() <= self.end
    }
}

/// Returns the index of the first frame (innermost-to-outermost scan) whose
/// address lies inside `region`, or `frames.len()` if none does.
///
/// `frames.len()` means execution is not currently inside a resumed
/// cooperative task and no splicing should occur.
#[must_use]
pub fn classify(frames: &[FrameAddr], region: SchedulerRegion) -> usize {
    frames
        .iter()
        .position(|addr| region.contains(*addr))
        .unwrap_or(frames.len())
}

/// Which part of the spliced trace a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// The whole physical capture; no scheduler boundary was found.
    Physical,
    /// Physical frames above the scheduler boundary (innermost).
    PhysicalPre,
    /// The suspended task's saved logical frames, spliced in.
    Cooperative,
    /// Physical frames at and below the scheduler boundary (outermost).
    PhysicalPost,
}

impl SegmentKind {
    /// Marker line used by the symbol renderer to separate segments.
    #[must_use]
    pub const fn marker(self) -> Option<&'static str> {
        match self {
            Self::Physical => None,
            Self::PhysicalPre => Some("--- physical frames (innermost) ---"),
            Self::Cooperative => Some("--- suspended task frames ---"),
            Self::PhysicalPost => Some("--- scheduler frames (outermost) ---"),
        }
    }
}

/// One contiguous run of frames of the same kind.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Which part of the trace this is.
    pub kind: SegmentKind,
    /// Frames, innermost first within the segment.
    pub frames: Vec<FrameAddr>,
}

/// An ordered sequence of frame segments forming one coherent trace.
#[derive(Debug, Clone)]
pub struct SplicedTrace {
    segments: Vec<Segment>,
}

impl SplicedTrace {
    /// A trace with no scheduler boundary: one physical segment.
    #[must_use]
    pub fn physical(frames: Vec<FrameAddr>) -> Self {
        Self {
            segments: vec![Segment {
                kind: SegmentKind::Physical,
                frames,
            }],
        }
    }

    /// The segments in report order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total frames across all segments.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.segments.iter().map(|s| s.frames.len()).sum()
    }
}

/// Splices `cooperative` frames into `frames` at `boundary`.
///
/// With `boundary == frames.len()` the result is a single physical segment
/// and `cooperative` is ignored. Otherwise the result is pre-boundary,
/// cooperative (omitted when empty), post-boundary. The pre and post
/// segments are disjoint and pre strictly precedes post.
#[must_use]
pub fn splice(
    frames: CapturedFrames,
    boundary: usize,
    cooperative: Vec<FrameAddr>,
) -> SplicedTrace {
    let frames = frames.into_vec();
    if boundary >= frames.len() {
        return SplicedTrace::physical(frames);
    }

    let mut pre = frames;
    let post = pre.split_off(boundary);

    let mut segments = Vec::with_capacity(3);
    segments.push(Segment {
        kind: SegmentKind::PhysicalPre,
        frames: pre,
    });
    if !cooperative.is_empty() {
        segments.push(Segment {
            kind: SegmentKind::Cooperative,
            frames: cooperative,
        });
    }
    segments.push(Segment {
        kind: SegmentKind::PhysicalPost,
        frames: post,
    });
    SplicedTrace { segments }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(values: &[usize]) -> Vec<FrameAddr> {
        values.iter().copied().map(FrameAddr::new).collect()
    }

    #[test]
    fn test_classify_no_match_returns_len() {
        crate::test_utils::init_test_logging();
        let frames = addrs(&[0x10, 0x20, 0x30]);
        let region = SchedulerRegion::new(0x1000, 0x2000);
        let idx = classify(&frames, region);
        crate::assert_with_log!(idx == frames.len(), "no match", frames.len(), idx);
        crate::test_complete!("test_classify_no_match_returns_len");
    }

    #[test]
    fn test_classify_returns_innermost_match() {
        crate::test_utils::init_test_logging();
        let frames = addrs(&[0x10, 0x1500, 0x1800, 0x30]);
        let region = SchedulerRegion::new(0x1000, 0x2000);
        let idx = classify(&frames, region);
        crate::assert_with_log!(idx == 1, "innermost match", 1usize, idx);
        crate::test_complete!("test_classify_returns_innermost_match");
    }

    #[test]
    fn test_region_bounds_are_inclusive() {
        crate::test_utils::init_test_logging();
        let region = SchedulerRegion::new(0x1000, 0x2000);
        crate::assert_with_log!(
            region.contains(FrameAddr::new(0x1000)),
            "start inclusive",
            true,
            region.contains(FrameAddr::new(0x1000))
        );
        crate::assert_with_log!(
            region.contains(FrameAddr::new(0x2000)),
            "end inclusive",
            true,
            region.contains(FrameAddr::new(0x2000))
        );
        crate::assert_with_log!(
            !region.contains(FrameAddr::new(0xfff)),
            "below start excluded",
            false,
            region.contains(FrameAddr::new(0xfff))
        );
        crate::assert_with_log!(
            !region.contains(FrameAddr::new(0x2001)),
            "above end excluded",
            false,
            region.contains(FrameAddr::new(0x2001))
        );
        crate::test_complete!("test_region_bounds_are_inclusive");
    }

    #[test]
    fn test_region_reversed_bounds_are_swapped() {
        crate::test_utils::init_test_logging();
        let region = SchedulerRegion::new(0x2000, 0x1000);
        crate::assert_with_log!(region.start() == 0x1000, "start", 0x1000usize, region.start());
        crate::assert_with_log!(region.end() == 0x2000, "end", 0x2000usize, region.end());
        crate::test_complete!("test_region_reversed_bounds_are_swapped");
    }

    #[test]
    fn test_splice_without_boundary_is_single_physical_segment() {
        crate::test_utils::init_test_logging();
        let frames = CapturedFrames::from_addrs(vec![0x10, 0x20]);
        let trace = splice(frames, 2, addrs(&[0x999]));
        crate::assert_with_log!(
            trace.segments().len() == 1,
            "one segment",
            1usize,
            trace.segments().len()
        );
        crate::assert_with_log!(
            trace.segments()[0].kind == SegmentKind::Physical,
            "physical kind",
            SegmentKind::Physical,
            trace.segments()[0].kind
        );
        crate::assert_with_log!(trace.frame_count() == 2, "frames kept", 2usize, trace.frame_count());
        crate::test_complete!("test_splice_without_boundary_is_single_physical_segment");
    }

    #[test]
    fn test_splice_preserves_segment_order() {
        crate::test_utils::init_test_logging();
        let frames = CapturedFrames::from_addrs(vec![0x10, 0x20, 0x1500, 0x30]);
        let coop = addrs(&[0xa0, 0xb0]);
        let trace = splice(frames, 2, coop);

        let kinds: Vec<SegmentKind> = trace.segments().iter().map(|s| s.kind).collect();
        let expected = vec![
            SegmentKind::PhysicalPre,
            SegmentKind::Cooperative,
            SegmentKind::PhysicalPost,
        ];
        crate::assert_with_log!(kinds == expected, "segment order", expected, kinds);

        let pre = &trace.segments()[0].frames;
        let post = &trace.segments()[2].frames;
        crate::assert_with_log!(pre.len() == 2, "pre length", 2usize, pre.len());
        crate::assert_with_log!(post.len() == 2, "post length", 2usize, post.len());
        crate::assert_with_log!(
            pre[0] == FrameAddr::new(0x10) && post[0] == FrameAddr::new(0x1500),
            "pre precedes post, disjoint",
            true,
            pre[0] == FrameAddr::new(0x10) && post[0] == FrameAddr::new(0x1500)
        );
        crate::test_complete!("test_splice_preserves_segment_order");
    }

    #[test]
    fn test_splice_with_empty_cooperative_omits_segment() {
        crate::test_utils::init_test_logging();
        let frames = CapturedFrames::from_addrs(vec![0x10, 0x1500]);
        let trace = splice(frames, 1, Vec::new());
        let kinds: Vec<SegmentKind> = trace.segments().iter().map(|s| s.kind).collect();
        let expected = vec![SegmentKind::PhysicalPre, SegmentKind::PhysicalPost];
        crate::assert_with_log!(kinds == expected, "no cooperative segment", expected, kinds);
        crate::test_complete!("test_splice_with_empty_cooperative_omits_segment");
    }

    #[test]
    fn test_splice_at_index_zero_has_empty_pre() {
        crate::test_utils::init_test_logging();
        let frames = CapturedFrames::from_addrs(vec![0x1500, 0x30]);
        let trace = splice(frames, 0, addrs(&[0xa0]));
        crate::assert_with_log!(
            trace.segments()[0].frames.is_empty(),
            "empty pre",
            0usize,
            trace.segments()[0].frames.len()
        );
        crate::assert_with_log!(trace.frame_count() == 3, "all frames present", 3usize, trace.frame_count());
        crate::test_complete!("test_splice_at_index_zero_has_empty_pre");
    }
}
