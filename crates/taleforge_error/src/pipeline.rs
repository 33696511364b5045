//! Pipeline orchestrator error types.

/// Kinds of request-level pipeline errors.
///
/// These reject a request before any per-kind work begins. Per-kind failures
/// never surface here; they are reported inside the segment result so partial
/// success stays visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Another request already has one of the same (segment, kind) pairs in
    /// flight; the caller should retry after it completes
    #[display("Conflicting request for segment {}: {}", segment, kinds)]
    ConflictingRequest {
        /// Segment identifier
        segment: String,
        /// Comma-separated kinds already in flight
        kinds: String,
    },
    /// A non-text artifact was requested for a segment with no narrative text
    /// and no text generation in the same request
    #[display("Missing prerequisite for segment {}: {}", segment, detail)]
    MissingPrerequisite {
        /// Segment identifier
        segment: String,
        /// What is missing
        detail: String,
    },
    /// The request named no artifact kinds
    #[display("Request contains no artifact kinds")]
    EmptyRequest,
    /// No adapter is registered for a requested kind
    #[display("No provider adapter registered for kind: {}", _0)]
    AdapterMissing(String),
}

/// Pipeline error with location tracking.
///
/// # Examples
///
/// ```
/// use taleforge_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::EmptyRequest);
/// assert!(format!("{}", err).contains("no artifact kinds"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
