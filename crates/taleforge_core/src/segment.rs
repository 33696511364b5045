//! Story segment row and per-kind artifact states.

use crate::{ArtifactKind, FailureKind, SegmentId, StoryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taleforge_error::{SegmentError, SegmentErrorKind, TaleForgeResult};

/// Lifecycle state of one (segment, artifact kind) pair.
///
/// `Failed` transitions back to `Pending` only through an explicit new
/// generation request; there is no automatic resurrection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactState {
    /// Never requested for this segment
    #[default]
    NotRequested,
    /// A request holds a credit reservation and a provider call is underway
    Pending,
    /// The artifact was generated, persisted, and its charge committed
    Succeeded,
    /// The last attempt exhausted its retries or failed non-retryably
    Failed,
}

impl ArtifactState {
    /// Whether no further automatic transition occurs from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ArtifactState::Succeeded | ArtifactState::Failed)
    }
}

/// Derived status of a segment's generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SegmentStatus {
    /// Every requested kind reached a terminal state, without a mixed outcome
    Complete,
    /// At least one requested kind succeeded and at least one failed
    Partial,
    /// At least one requested kind is still pending
    InProgress,
}

/// The last recorded generation failure for a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    /// Which artifact kind failed
    pub kind: ArtifactKind,
    /// Classified failure
    pub failure: FailureKind,
    /// Human-readable detail
    pub message: String,
}

/// One narrative beat within a story.
///
/// Reference fields are non-empty if and only if the corresponding kind's
/// last recorded outcome was success. Narrative text is immutable once set.
/// Only the orchestrator mutates a segment, one caller at a time.
///
/// # Examples
///
/// ```
/// use taleforge_core::{ArtifactKind, ArtifactState, StorySegment, StoryId};
///
/// let mut segment = StorySegment::new(StoryId::generate(), 1);
/// assert!(segment.narrative_text().is_none());
///
/// segment.set_narrative_text("Luna crept into the moonlit garden.").unwrap();
/// assert!(segment.set_narrative_text("rewrite").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySegment {
    /// Opaque unique identifier
    pub id: SegmentId,
    /// Owning story
    pub story_id: StoryId,
    /// Dense position within the story, starting at 1
    pub sequence: u32,
    narrative_text: Option<String>,
    image_reference: Option<String>,
    audio_reference: Option<String>,
    video_reference: Option<String>,
    states: BTreeMap<ArtifactKind, ArtifactState>,
    /// Most recent generation failure, if any
    pub last_error: Option<LastError>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time, used for optimistic concurrency
    pub updated_at: DateTime<Utc>,
}

impl StorySegment {
    /// Create an empty segment at the given story position.
    pub fn new(story_id: StoryId, sequence: u32) -> Self {
        let now = Utc::now();
        Self {
            id: SegmentId::generate(),
            story_id,
            sequence,
            narrative_text: None,
            image_reference: None,
            audio_reference: None,
            video_reference: None,
            states: BTreeMap::new(),
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Narrative text, once set.
    pub fn narrative_text(&self) -> Option<&str> {
        self.narrative_text.as_deref()
    }

    /// Whether the segment has narrative text available as provider input.
    pub fn has_text(&self) -> bool {
        self.narrative_text.is_some()
    }

    /// Set the narrative text.
    ///
    /// # Errors
    ///
    /// Returns `TextAlreadySet` if text exists; narrative text is immutable.
    pub fn set_narrative_text(&mut self, text: impl Into<String>) -> TaleForgeResult<()> {
        if self.narrative_text.is_some() {
            return Err(SegmentError::new(SegmentErrorKind::TextAlreadySet(
                self.id.to_string(),
            )))?;
        }
        self.narrative_text = Some(text.into());
        self.touch();
        Ok(())
    }

    /// Stable reference for a kind, if its last outcome was success.
    ///
    /// The text kind has no reference field; its content lives in
    /// `narrative_text`.
    pub fn reference(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::Text => None,
            ArtifactKind::Image => self.image_reference.as_deref(),
            ArtifactKind::Audio => self.audio_reference.as_deref(),
            ArtifactKind::Video => self.video_reference.as_deref(),
        }
    }

    /// Write the reference for a kind after a successful generation.
    pub fn set_reference(&mut self, kind: ArtifactKind, reference: impl Into<String>) {
        let reference = Some(reference.into());
        match kind {
            ArtifactKind::Text => {}
            ArtifactKind::Image => self.image_reference = reference,
            ArtifactKind::Audio => self.audio_reference = reference,
            ArtifactKind::Video => self.video_reference = reference,
        }
        self.touch();
    }

    /// Clear the reference for a kind; used when a failed kind must leave
    /// its field empty.
    pub fn clear_reference(&mut self, kind: ArtifactKind) {
        match kind {
            ArtifactKind::Text => {}
            ArtifactKind::Image => self.image_reference = None,
            ArtifactKind::Audio => self.audio_reference = None,
            ArtifactKind::Video => self.video_reference = None,
        }
        self.touch();
    }

    /// Current state of a kind; kinds never requested report `NotRequested`.
    pub fn state(&self, kind: ArtifactKind) -> ArtifactState {
        self.states.get(&kind).copied().unwrap_or_default()
    }

    /// Record the state of a kind.
    pub fn set_state(&mut self, kind: ArtifactKind, state: ArtifactState) {
        self.states.insert(kind, state);
        self.touch();
    }

    /// Kinds that have ever been requested for this segment.
    pub fn requested_kinds(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
        self.states
            .iter()
            .filter(|(_, s)| !matches!(s, ArtifactState::NotRequested))
            .map(|(k, _)| *k)
    }

    /// Derive the segment status from the states of requested kinds.
    ///
    /// Recomputation is idempotent: the status is a pure function of the
    /// per-kind states.
    pub fn status(&self) -> SegmentStatus {
        let mut pending = false;
        let mut succeeded = 0usize;
        let mut failed = 0usize;
        for kind in self.requested_kinds().collect::<Vec<_>>() {
            match self.state(kind) {
                ArtifactState::Pending => pending = true,
                ArtifactState::Succeeded => succeeded += 1,
                ArtifactState::Failed => failed += 1,
                ArtifactState::NotRequested => {}
            }
        }
        if pending {
            SegmentStatus::InProgress
        } else if succeeded > 0 && failed > 0 {
            SegmentStatus::Partial
        } else {
            SegmentStatus::Complete
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
