//! Artifact kinds attached to a story segment.

use serde::{Deserialize, Serialize};

/// One generated output attached to a story segment.
///
/// Each kind is produced by its own provider adapter and billed
/// independently. Text is privileged: image, audio, and video generation all
/// take the narrative text as input context.
///
/// # Examples
///
/// ```
/// use taleforge_core::ArtifactKind;
/// use strum::IntoEnumIterator;
///
/// let all: Vec<ArtifactKind> = ArtifactKind::iter().collect();
/// assert_eq!(all.len(), 4);
/// assert_eq!(ArtifactKind::Audio.to_string(), "audio");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactKind {
    /// Narrative text for the segment
    Text,
    /// Illustration image
    Image,
    /// Narrated audio track
    Audio,
    /// Animated video
    Video,
}

impl ArtifactKind {
    /// Whether this kind requires the segment's narrative text as input.
    pub fn requires_text(&self) -> bool {
        !matches!(self, ArtifactKind::Text)
    }
}
