//! Story segment error types.

/// Kinds of segment repository and state machine errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SegmentErrorKind {
    /// No segment with the given identifier
    #[display("Segment not found: {}", _0)]
    NotFound(String),
    /// Optimistic concurrency check failed: the row changed since it was read
    #[display("Concurrent update detected for segment {}", _0)]
    UpdateConflict(String),
    /// Narrative text is immutable once set
    #[display("Narrative text already set for segment {}", _0)]
    TextAlreadySet(String),
    /// Attempted an artifact state transition the machine does not allow
    #[display("Invalid transition for segment {}: {}", segment, detail)]
    InvalidTransition {
        /// Segment identifier
        segment: String,
        /// Description of the rejected transition
        detail: String,
    },
}

/// Segment error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Segment Error: {} at line {} in {}", kind, line, file)]
pub struct SegmentError {
    /// The kind of error that occurred
    pub kind: SegmentErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SegmentError {
    /// Create a new segment error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SegmentErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the caller should re-read the row and retry the write.
    pub fn is_update_conflict(&self) -> bool {
        matches!(self.kind, SegmentErrorKind::UpdateConflict(_))
    }
}
