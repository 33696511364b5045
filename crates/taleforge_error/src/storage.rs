//! Artifact store error types.

/// Kinds of artifact store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// Failed to create a storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write artifact data
    #[display("Storage write failed: {}", _0)]
    WriteFailed(String),
    /// Failed to read artifact data
    #[display("Storage read failed: {}", _0)]
    ReadFailed(String),
    /// No artifact at the referenced location
    #[display("Artifact not found: {}", _0)]
    NotFound(String),
    /// Stored content does not match its recorded hash
    #[display("Content hash mismatch: {}", _0)]
    HashMismatch(String),
    /// Invalid storage configuration
    #[display("Invalid storage configuration: {}", _0)]
    InvalidConfig(String),
}

/// Artifact store error with location tracking.
///
/// Storage writes are retryable a bounded number of times; exhaustion is
/// treated by the pipeline exactly like a provider failure for that artifact.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
