//! Provider adapter error types.
//!
//! Every failure surfaced by a generation provider is classified into one of
//! the variants here before it crosses the adapter boundary. The orchestrator
//! owns retry policy, so the only question an adapter answers is *what kind*
//! of failure occurred, plus an optional backoff hint for rate limits.

/// Kinds of provider failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// The provider did not respond before the attempt deadline
    #[display("Provider timed out: {}", _0)]
    Timeout(String),
    /// The provider signaled backoff; `retry_after_ms` carries its hint if any
    #[display("Provider rate limited: {}", message)]
    RateLimited {
        /// Provider-supplied description
        message: String,
        /// Suggested backoff in milliseconds, parsed from a `retry-after`
        /// header when the provider sent one
        retry_after_ms: Option<u64>,
    },
    /// The request content violates provider constraints (e.g. safety
    /// filters); retrying the same input cannot succeed
    #[display("Provider rejected input: {}", _0)]
    InvalidInput(String),
    /// Transient provider outage
    #[display("Provider unavailable: {}", _0)]
    Unavailable(String),
    /// Unclassified failure, treated as retryable by default
    #[display("Unknown provider failure: {}", _0)]
    Unknown(String),
}

impl ProviderErrorKind {
    /// Whether the orchestrator may retry an attempt that failed this way.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderErrorKind::InvalidInput(_))
    }

    /// Backoff hint in milliseconds, if the provider supplied one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderErrorKind::RateLimited { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }
}

/// Provider error with location tracking.
///
/// # Examples
///
/// ```
/// use taleforge_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new(ProviderErrorKind::Timeout("image render".to_string()));
/// assert!(err.kind.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new provider error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
