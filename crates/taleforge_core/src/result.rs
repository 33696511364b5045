//! Consolidated per-request results.

use crate::{ArtifactKind, SegmentId, SegmentStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taleforge_error::ProviderErrorKind;

/// Classified failure reported to the caller for one artifact kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// Balance too low at reserve time; requires user action
    InsufficientCredits,
    /// Provider did not answer before the deadline
    Timeout,
    /// Provider signaled backoff and the retry budget ran out
    RateLimited,
    /// Provider rejected the content; the caller must adjust the prompt
    InvalidInput,
    /// Transient provider outage outlasted the retry budget
    ProviderUnavailable,
    /// Unclassified provider failure
    Unknown,
    /// Durable storage rejected the artifact after bounded retries
    StorageWriteFailed,
}

impl From<&ProviderErrorKind> for FailureKind {
    fn from(kind: &ProviderErrorKind) -> Self {
        match kind {
            ProviderErrorKind::Timeout(_) => FailureKind::Timeout,
            ProviderErrorKind::RateLimited { .. } => FailureKind::RateLimited,
            ProviderErrorKind::InvalidInput(_) => FailureKind::InvalidInput,
            ProviderErrorKind::Unavailable(_) => FailureKind::ProviderUnavailable,
            ProviderErrorKind::Unknown(_) => FailureKind::Unknown,
        }
    }
}

/// Why an artifact kind was skipped without any credit reservation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// The segment has no narrative text and none was requested in this call
    MissingPrerequisite,
    /// Text was requested in this call but failed, blocking dependent kinds
    PrerequisiteFailed,
    /// The caller cancelled the request before this kind's result landed
    Cancelled,
}

/// Terminal outcome of one requested artifact kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ArtifactOutcome {
    /// Generated, persisted, and charged
    Succeeded {
        /// Stable reference to the stored artifact; for text, the text itself
        /// lives on the segment and this carries its storage copy
        reference: String,
    },
    /// Terminal failure; the reservation was released
    Failed {
        /// Classified failure
        failure: FailureKind,
        /// Human-readable detail
        message: String,
    },
    /// Never attempted; zero credits reserved
    Skipped {
        /// Why the kind was skipped
        reason: SkipReason,
    },
}

impl ArtifactOutcome {
    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, ArtifactOutcome::Succeeded { .. })
    }
}

/// Consolidated result of one generation request.
///
/// Partial success is reported per kind, never hidden behind a single
/// boolean; credits are only committed for kinds that succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    /// Target segment
    pub segment_id: SegmentId,
    /// Outcome per requested kind
    pub outcomes: BTreeMap<ArtifactKind, ArtifactOutcome>,
    /// Derived segment status after the request settled
    pub status: SegmentStatus,
    /// Total credits committed by this request
    pub credits_charged: u32,
}

impl SegmentResult {
    /// Outcome for one kind, if it was part of the request.
    pub fn outcome(&self, kind: ArtifactKind) -> Option<&ArtifactOutcome> {
        self.outcomes.get(&kind)
    }

    /// Number of kinds that succeeded.
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }
}
