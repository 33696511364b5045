//! Caller-issued generation requests.

use crate::{ArtifactKind, RequestId, SegmentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One caller-issued request to produce artifacts for one segment.
///
/// At most one request per (segment, artifact kind) may be in flight at any
/// time; the orchestrator rejects a second rather than queueing it silently,
/// to avoid double-charging.
///
/// # Examples
///
/// ```
/// use taleforge_core::{ArtifactKind, GenerationRequest, SegmentId, UserId};
///
/// let request = GenerationRequest::new(
///     SegmentId::generate(),
///     UserId::generate(),
///     [ArtifactKind::Text, ArtifactKind::Image],
/// );
/// assert!(request.kinds.contains(&ArtifactKind::Text));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Target segment
    pub segment_id: SegmentId,
    /// Requesting user, charged for each artifact
    pub user_id: UserId,
    /// Requested artifact kinds; must be non-empty
    pub kinds: BTreeSet<ArtifactKind>,
    /// Idempotency token; derived when the caller does not supply one
    pub idempotency_token: RequestId,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
}

impl GenerationRequest {
    /// Create a request with a derived idempotency token.
    pub fn new(
        segment_id: SegmentId,
        user_id: UserId,
        kinds: impl IntoIterator<Item = ArtifactKind>,
    ) -> Self {
        Self {
            segment_id,
            user_id,
            kinds: kinds.into_iter().collect(),
            idempotency_token: RequestId::generate(),
            submitted_at: Utc::now(),
        }
    }

    /// Use a caller-supplied idempotency token.
    pub fn with_token(mut self, token: RequestId) -> Self {
        self.idempotency_token = token;
        self
    }

    /// Whether text generation is part of this request.
    pub fn wants_text(&self) -> bool {
        self.kinds.contains(&ArtifactKind::Text)
    }

    /// Requested kinds other than text, in stable order.
    pub fn non_text_kinds(&self) -> Vec<ArtifactKind> {
        self.kinds
            .iter()
            .copied()
            .filter(|k| k.requires_text())
            .collect()
    }
}
