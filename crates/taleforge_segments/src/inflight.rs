//! Per-segment in-flight request registry.
//!
//! At most one generation request per (segment, artifact kind) may be in
//! flight. A second request naming any of the same kinds is rejected with
//! `ConflictingRequest` rather than queued, so a user is never charged
//! twice for racing requests.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use taleforge_core::{ArtifactKind, SegmentId};
use taleforge_error::{PipelineError, PipelineErrorKind, TaleForgeResult};
use tracing::debug;

/// Tracks which (segment, kind) pairs are currently owned by a request.
///
/// Acquisition is atomic across the requested kind set: either every kind is
/// free and all are claimed, or none are. The permit releases its kinds on
/// drop, so no error path can leave a segment permanently locked.
///
/// # Examples
///
/// ```
/// use taleforge_core::{ArtifactKind, SegmentId};
/// use taleforge_segments::InFlightRegistry;
///
/// let registry = InFlightRegistry::new();
/// let segment = SegmentId::generate();
/// let kinds = [ArtifactKind::Text, ArtifactKind::Image].into_iter().collect();
///
/// let permit = registry.try_acquire(segment, &kinds).unwrap();
/// assert!(registry.try_acquire(segment, &kinds).is_err());
///
/// drop(permit);
/// assert!(registry.try_acquire(segment, &kinds).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    inner: Arc<Mutex<HashMap<SegmentId, BTreeSet<ArtifactKind>>>>,
}

impl InFlightRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every requested kind for a segment, or none.
    ///
    /// # Errors
    ///
    /// `ConflictingRequest` naming the kinds already held, if any overlap.
    pub fn try_acquire(
        &self,
        segment: SegmentId,
        kinds: &BTreeSet<ArtifactKind>,
    ) -> TaleForgeResult<InFlightPermit> {
        let mut held = self.inner.lock().expect("in-flight lock poisoned");
        let current = held.entry(segment).or_default();

        let overlap: Vec<String> = current
            .intersection(kinds)
            .map(ToString::to_string)
            .collect();
        if !overlap.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::ConflictingRequest {
                segment: segment.to_string(),
                kinds: overlap.join(", "),
            }))?;
        }

        current.extend(kinds.iter().copied());
        debug!(%segment, kinds = ?kinds, "Claimed in-flight kinds");
        Ok(InFlightPermit {
            registry: self.clone(),
            segment,
            kinds: kinds.clone(),
        })
    }

    fn release(&self, segment: SegmentId, kinds: &BTreeSet<ArtifactKind>) {
        let mut held = self.inner.lock().expect("in-flight lock poisoned");
        if let Some(current) = held.get_mut(&segment) {
            for kind in kinds {
                current.remove(kind);
            }
            if current.is_empty() {
                held.remove(&segment);
            }
        }
        debug!(%segment, kinds = ?kinds, "Released in-flight kinds");
    }
}

/// RAII claim on a request's (segment, kind) pairs.
#[derive(Debug)]
pub struct InFlightPermit {
    registry: InFlightRegistry,
    segment: SegmentId,
    kinds: BTreeSet<ArtifactKind>,
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        self.registry.release(self.segment, &self.kinds);
    }
}
