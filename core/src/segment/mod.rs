//! Match boundary detection.
//!
//! The segmenter is a two-state machine:
//! - Idle: outside any match, events are dropped
//! - InMatch: accumulating events and raw lines into a [`Segment`]
//!
//! A transition yields at most one finished segment. A second start while
//! in a match closes the open segment as incomplete and reopens from the
//! new start marker.

use crate::events::CombatEvent;

/// How a segment was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEnd {
    /// Closed by an end marker.
    EndMarker,
    /// Closed by another start marker before any end marker.
    DoubleStart,
    /// Closed by an explicit flush at end of input.
    Flush,
}

/// The events and raw lines between a start marker and its end.
#[derive(Debug, Clone)]
pub struct Segment {
    pub events: Vec<CombatEvent>,
    /// Every raw line seen while the segment was open, in arrival order,
    /// including lines that failed to tokenize or classify.
    pub lines: Vec<String>,
    pub lines_not_parsed: usize,
    pub end: SegmentEnd,
}

impl Segment {
    fn open(start: CombatEvent) -> Self {
        let mut segment = Self {
            events: Vec::new(),
            lines: Vec::new(),
            lines_not_parsed: 0,
            end: SegmentEnd::Flush,
        };
        segment.append(start);
        segment
    }

    fn append(&mut self, event: CombatEvent) {
        self.lines.push(event.line().raw.clone());
        self.events.push(event);
    }

    /// Starts with a start marker and was closed by an end marker.
    pub fn is_complete(&self) -> bool {
        self.end == SegmentEnd::EndMarker
            && self.events.first().is_some_and(CombatEvent::is_match_start)
            && self.events.last().is_some_and(CombatEvent::is_match_end)
    }

    pub fn start_time(&self) -> Option<i64> {
        self.events.first().map(CombatEvent::timestamp)
    }

    pub fn end_time(&self) -> Option<i64> {
        self.events.last().map(CombatEvent::timestamp)
    }
}

#[derive(Debug, Default)]
enum SegmenterState {
    #[default]
    Idle,
    InMatch(Segment),
}

#[derive(Debug, Default)]
pub struct Segmenter {
    state: SegmenterState,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_match(&self) -> bool {
        matches!(self.state, SegmenterState::InMatch(_))
    }

    /// Feed one classified event. Returns a segment when this event closed one.
    pub fn push(&mut self, event: CombatEvent) -> Option<Segment> {
        let (next, emitted) = match std::mem::take(&mut self.state) {
            SegmenterState::Idle => {
                if event.is_match_start() {
                    tracing::debug!(timestamp = event.timestamp(), "Match segment opened");
                    (SegmenterState::InMatch(Segment::open(event)), None)
                } else {
                    (SegmenterState::Idle, None)
                }
            }
            SegmenterState::InMatch(mut segment) => {
                if event.is_match_start() {
                    tracing::debug!(
                        timestamp = event.timestamp(),
                        lines = segment.lines.len(),
                        "Match start inside open segment, closing it as incomplete"
                    );
                    segment.end = SegmentEnd::DoubleStart;
                    (SegmenterState::InMatch(Segment::open(event)), Some(segment))
                } else if event.is_match_end() {
                    segment.append(event);
                    segment.end = SegmentEnd::EndMarker;
                    tracing::debug!(lines = segment.lines.len(), "Match segment closed");
                    (SegmenterState::Idle, Some(segment))
                } else {
                    segment.append(event);
                    (SegmenterState::InMatch(segment), None)
                }
            }
        };
        self.state = next;
        emitted
    }

    /// Record a line that produced no event. Kept only inside a match.
    pub fn push_unparsed(&mut self, raw: &str) {
        if let SegmenterState::InMatch(segment) = &mut self.state {
            segment.lines.push(raw.to_string());
            segment.lines_not_parsed += 1;
        }
    }

    /// Close an open segment as incomplete. Idempotent.
    pub fn flush(&mut self) -> Option<Segment> {
        match std::mem::take(&mut self.state) {
            SegmenterState::Idle => None,
            SegmenterState::InMatch(mut segment) => {
                tracing::debug!(lines = segment.lines.len(), "Flushing open match segment");
                segment.end = SegmentEnd::Flush;
                Some(segment)
            }
        }
    }
}
