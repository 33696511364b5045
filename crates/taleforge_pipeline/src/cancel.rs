//! Cooperative request cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation signal shared between a caller and an in-flight request.
///
/// Cancellation is cooperative: the orchestrator checks the flag before
/// starting each artifact and after each provider call returns. A kind whose
/// result has not yet landed when the flag is raised is skipped, its
/// reservation released, and any payload already received is discarded.
/// Artifacts that already committed are kept.
///
/// # Examples
///
/// ```
/// use taleforge_pipeline::CancelFlag;
///
/// let flag = CancelFlag::new();
/// assert!(!flag.is_cancelled());
/// flag.cancel();
/// assert!(flag.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create an unraised flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
