//! Context handed to provider adapters.

use crate::{SegmentId, StoryId};
use serde::{Deserialize, Serialize};

/// Story-level metadata providers use to shape generated content.
///
/// # Examples
///
/// ```
/// use taleforge_core::StoryProfile;
///
/// let profile = StoryProfile {
///     age_group: "4-6".to_string(),
///     genre: "bedtime".to_string(),
///     language: "en".to_string(),
///     characters: vec!["Luna the fox".to_string()],
/// };
/// assert_eq!(profile.language, "en");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StoryProfile {
    /// Target reader age group (e.g. "4-6")
    pub age_group: String,
    /// Story genre (e.g. "adventure", "bedtime")
    pub genre: String,
    /// BCP-47 language tag for narration and text
    pub language: String,
    /// Short descriptors of recurring characters, for visual continuity
    pub characters: Vec<String>,
}

/// The minimum context a provider adapter needs to generate one artifact.
///
/// Built by the orchestrator from the segment row and story metadata. For
/// non-text kinds `narrative_text` is always populated; the text kind receives
/// the prior segment's narrative for continuity instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentContext {
    /// Target segment
    pub segment_id: SegmentId,
    /// Owning story
    pub story_id: StoryId,
    /// Position of the segment within the story, starting at 1
    pub sequence: u32,
    /// Narrative text of this segment, once known
    pub narrative_text: Option<String>,
    /// Narrative text of the preceding segment, for continuity
    pub prior_text: Option<String>,
    /// Story-level metadata
    pub story: StoryProfile,
    /// Whether the narration track should be mixed into a generated video
    pub include_narration: bool,
}

impl SegmentContext {
    /// Word count of the narrative text, used for audio pricing.
    pub fn narration_words(&self) -> u32 {
        self.narrative_text
            .as_deref()
            .map(|t| t.split_whitespace().count() as u32)
            .unwrap_or(0)
    }
}
