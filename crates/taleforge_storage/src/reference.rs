//! Stable references to stored artifacts.

use serde::{Deserialize, Serialize};
use taleforge_core::ArtifactKind;
use uuid::Uuid;

/// Reference to one stored artifact.
///
/// `url` is the publicly resolvable reference written into the segment's
/// image/audio/video field; the remaining fields let a backend locate and
/// verify the underlying content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReference {
    /// Unique id of this store operation
    pub id: Uuid,
    /// SHA-256 of the stored content
    pub content_hash: String,
    /// Backend that holds the content (e.g. "filesystem")
    pub storage_backend: String,
    /// Backend-internal location
    pub storage_path: String,
    /// Publicly resolvable reference for segment fields
    pub url: String,
    /// Content size in bytes
    pub size_bytes: u64,
    /// Artifact kind the content belongs to
    pub kind: ArtifactKind,
    /// MIME type of the content
    pub content_type: String,
}
