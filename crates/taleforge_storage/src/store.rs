//! Artifact store trait definition.

use crate::ArtifactReference;
use taleforge_core::ArtifactKind;
use taleforge_error::TaleForgeResult;

/// Trait for pluggable artifact storage backends.
///
/// Backends are stateless at the pipeline layer and safely callable
/// concurrently. The pipeline treats write failures as retryable a bounded
/// number of times; an exhausted write counts as a provider failure for the
/// artifact and its credit reservation is released.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist artifact content and return a stable reference.
    ///
    /// Implementations should deduplicate identical content and must not
    /// acknowledge a write that is not durable.
    async fn store(
        &self,
        kind: ArtifactKind,
        data: &[u8],
        content_type: &str,
    ) -> TaleForgeResult<ArtifactReference>;

    /// Retrieve artifact content by reference.
    async fn retrieve(&self, reference: &ArtifactReference) -> TaleForgeResult<Vec<u8>>;

    /// Check whether the referenced content exists.
    async fn exists(&self, reference: &ArtifactReference) -> TaleForgeResult<bool>;
}
