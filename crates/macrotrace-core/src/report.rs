//! Records, warnings and statistics produced by one pass over a trace

use crate::classify::LineKind;
use crate::span::Span;
use facet::Facet;

/// One macro invocation and the exact text it expanded to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Facet)]
pub struct Expansion {
    /// Control sequence name, including the escape character
    pub name: Vec<u8>,
    /// Where the invocation (with its arguments) appears in the source file
    pub span: Span,
    /// Fully resolved expansion text
    pub text: Vec<u8>,
}

impl Expansion {
    pub fn new(
        name: impl Into<Vec<u8>>,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
        text: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            span: Span::new(start_line, start_col, end_line, end_col),
            text: text.into(),
        }
    }
}

/// Something in the trace the pass had to skip or patch over
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct TraceWarning {
    /// Trace line number (1-indexed), or 0 for end-of-input conditions
    pub line: usize,
    pub kind: WarningKind,
}

/// Types of trace warnings
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum WarningKind {
    /// A line had a known marker but a field could not be parsed
    MalformedLine(LineKind, String),
    /// End marker for an object id with no open frame
    UnmatchedEnd(u64),
    /// Argument or expansion token while no frame was open
    OrphanToken(LineKind),
    /// Argument token after the frame's body had started
    ArgumentAfterBody(u64),
    /// Frame still open when the trace ended
    DanglingFrame(u64),
    /// Expandable token whose expansion never completed; replaced with nothing
    UnresolvedPlaceholder(u64),
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::MalformedLine(kind, field) => {
                write!(f, "malformed {} line: bad {}", kind, field)
            }
            WarningKind::UnmatchedEnd(id) => {
                write!(f, "end of expansion for object {} with no open frame", id)
            }
            WarningKind::OrphanToken(kind) => write!(f, "{} token outside any expansion", kind),
            WarningKind::ArgumentAfterBody(id) => write!(
                f,
                "argument token for object {} after its expansion started",
                id
            ),
            WarningKind::DanglingFrame(id) => {
                write!(f, "expansion of object {} never ended", id)
            }
            WarningKind::UnresolvedPlaceholder(id) => {
                write!(f, "expansion of object {} never resolved", id)
            }
        }
    }
}

impl std::fmt::Display for TraceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "end of trace: {}", self.kind)
        } else {
            write!(f, "line {}: {}", self.line, self.kind)
        }
    }
}

/// Counters for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct TraceStats {
    /// Lines read
    pub lines: usize,
    /// Lines classified as one of the four events
    pub events: usize,
    /// Frames opened by start lines
    pub frames_opened: usize,
    /// Frames that were nested in another expansion
    pub nested: usize,
    /// Expansion records emitted
    pub emitted: usize,
    /// Top-level frames dropped because of where they were anchored
    pub dropped_unanchored: usize,
}

/// Warnings and statistics for one pass over a trace
#[derive(Debug, Clone, Default, Facet)]
pub struct TraceReport {
    pub warnings: Vec<TraceWarning>,
    pub stats: TraceStats,
}

impl TraceReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
