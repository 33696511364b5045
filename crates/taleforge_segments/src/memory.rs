//! In-memory segment repository.

use crate::SegmentRepository;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use taleforge_core::{SegmentId, StoryId, StorySegment};
use taleforge_error::{SegmentError, SegmentErrorKind, TaleForgeResult};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct RepoState {
    segments: HashMap<SegmentId, StorySegment>,
    next_sequence: HashMap<StoryId, u32>,
}

/// Map-backed repository for tests and single-process deployments.
///
/// # Examples
///
/// ```
/// use taleforge_core::StoryId;
/// use taleforge_segments::{InMemorySegmentRepository, SegmentRepository};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> taleforge_error::TaleForgeResult<()> {
/// let repo = InMemorySegmentRepository::new();
/// let story = StoryId::generate();
/// let first = repo.append_segment(story).await?;
/// let second = repo.append_segment(story).await?;
/// assert_eq!(first.sequence, 1);
/// assert_eq!(second.sequence, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySegmentRepository {
    state: Arc<RwLock<RepoState>>,
}

impl InMemorySegmentRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SegmentRepository for InMemorySegmentRepository {
    #[instrument(skip(self))]
    async fn append_segment(&self, story: StoryId) -> TaleForgeResult<StorySegment> {
        let mut state = self.state.write().await;
        let sequence = state.next_sequence.entry(story).or_insert(1);
        let segment = StorySegment::new(story, *sequence);
        *sequence += 1;
        debug!(segment = %segment.id, sequence = segment.sequence, "Appended segment");
        state.segments.insert(segment.id, segment.clone());
        Ok(segment)
    }

    async fn get(&self, id: SegmentId) -> TaleForgeResult<StorySegment> {
        let state = self.state.read().await;
        state
            .segments
            .get(&id)
            .cloned()
            .ok_or_else(|| SegmentError::new(SegmentErrorKind::NotFound(id.to_string())).into())
    }

    #[instrument(skip(self, segment), fields(segment = %segment.id))]
    async fn update(
        &self,
        segment: StorySegment,
        expected_updated_at: DateTime<Utc>,
    ) -> TaleForgeResult<StorySegment> {
        let mut state = self.state.write().await;
        let stored = state.segments.get_mut(&segment.id).ok_or_else(|| {
            SegmentError::new(SegmentErrorKind::NotFound(segment.id.to_string()))
        })?;

        if stored.updated_at != expected_updated_at {
            debug!(segment = %segment.id, "Rejected stale segment write");
            return Err(SegmentError::new(SegmentErrorKind::UpdateConflict(
                segment.id.to_string(),
            )))?;
        }

        *stored = segment.clone();
        Ok(segment)
    }

    async fn prior_narrative(
        &self,
        story: StoryId,
        sequence: u32,
    ) -> TaleForgeResult<Option<String>> {
        if sequence <= 1 {
            return Ok(None);
        }
        let state = self.state.read().await;
        Ok(state
            .segments
            .values()
            .find(|s| s.story_id == story && s.sequence == sequence - 1)
            .and_then(|s| s.narrative_text().map(ToString::to_string)))
    }
}
