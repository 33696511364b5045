//! Per-kind state transitions on a segment row.
//!
//! `NotRequested → Pending → {Succeeded | Failed}`; `Failed` re-enters
//! `Pending` only through an explicit new generation request. Every
//! transition keeps the row's invariant: a reference field is non-empty
//! exactly when the kind's last recorded outcome was success.

use taleforge_core::{
    ArtifactKind, ArtifactState, FailureKind, LastError, PayloadBody, ProviderPayload,
    StorySegment,
};
use taleforge_error::{SegmentError, SegmentErrorKind, TaleForgeResult};
use tracing::debug;

/// Move a kind into `Pending` for a fresh generation attempt.
///
/// Legal from `NotRequested`, `Failed` (explicit re-request), and
/// `Succeeded` (regeneration). A kind already `Pending` is owned by another
/// attempt and must have been rejected upstream by the in-flight registry.
pub fn begin_attempt(segment: &mut StorySegment, kind: ArtifactKind) -> TaleForgeResult<()> {
    if segment.state(kind) == ArtifactState::Pending {
        return Err(SegmentError::new(SegmentErrorKind::InvalidTransition {
            segment: segment.id.to_string(),
            detail: format!("{kind} is already pending"),
        }))?;
    }
    debug!(segment = %segment.id, %kind, "Attempt begins");
    segment.set_state(kind, ArtifactState::Pending);
    Ok(())
}

/// Record a successful generation: persist the content on the row and mark
/// the kind `Succeeded`.
///
/// For text the payload body becomes the segment's narrative text (unless
/// text already exists, in which case the row keeps its immutable copy);
/// for other kinds `reference` is written into the matching field.
pub fn record_success(
    segment: &mut StorySegment,
    kind: ArtifactKind,
    payload: &ProviderPayload,
    reference: &str,
) -> TaleForgeResult<()> {
    if kind == ArtifactKind::Text {
        if let PayloadBody::Text(text) = payload.body() {
            if !segment.has_text() {
                segment.set_narrative_text(text.clone())?;
            }
        }
    } else {
        segment.set_reference(kind, reference);
    }
    segment.set_state(kind, ArtifactState::Succeeded);
    segment.last_error = None;
    debug!(segment = %segment.id, %kind, "Attempt succeeded");
    Ok(())
}

/// Record a terminal failure: mark the kind `Failed`, store the typed
/// error, and leave the reference field empty.
pub fn record_failure(
    segment: &mut StorySegment,
    kind: ArtifactKind,
    failure: FailureKind,
    message: impl Into<String>,
) {
    segment.clear_reference(kind);
    segment.set_state(kind, ArtifactState::Failed);
    segment.last_error = Some(LastError {
        kind,
        failure,
        message: message.into(),
    });
    debug!(segment = %segment.id, %kind, %failure, "Attempt failed");
}
