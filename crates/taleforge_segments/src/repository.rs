//! Segment repository trait definition.

use chrono::{DateTime, Utc};
use taleforge_core::{SegmentId, StoryId, StorySegment};
use taleforge_error::TaleForgeResult;

/// Trait for pluggable segment persistence.
///
/// Writes use optimistic concurrency: `update` succeeds only if the stored
/// row's `updated_at` still matches what the caller read, guarding against
/// lost updates from concurrent orchestrator instances. A database-backed
/// implementation supplies the same conflict detection via its row version
/// or updated-at column.
#[async_trait::async_trait]
pub trait SegmentRepository: Send + Sync {
    /// Create the next segment of a story with a dense sequence number.
    ///
    /// Sequence numbers start at 1 and never leave gaps after successful
    /// creation.
    async fn append_segment(&self, story: StoryId) -> TaleForgeResult<StorySegment>;

    /// Fetch a segment by id.
    ///
    /// # Errors
    ///
    /// `SegmentErrorKind::NotFound` if no such segment exists.
    async fn get(&self, id: SegmentId) -> TaleForgeResult<StorySegment>;

    /// Write a segment back, if nobody else wrote it in between.
    ///
    /// `expected_updated_at` is the `updated_at` the caller read before
    /// mutating. Returns the stored row.
    ///
    /// # Errors
    ///
    /// `SegmentErrorKind::UpdateConflict` if the row changed since the read;
    /// the caller should re-read, reapply, and retry a bounded number of
    /// times.
    async fn update(
        &self,
        segment: StorySegment,
        expected_updated_at: DateTime<Utc>,
    ) -> TaleForgeResult<StorySegment>;

    /// Narrative text of the segment preceding `sequence` in a story.
    ///
    /// Returns `None` for the first segment, or when the prior segment has
    /// no text yet. Used to build generation context for continuity.
    async fn prior_narrative(
        &self,
        story: StoryId,
        sequence: u32,
    ) -> TaleForgeResult<Option<String>>;
}
