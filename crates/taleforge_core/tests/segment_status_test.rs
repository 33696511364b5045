//! Tests for derived segment status and pricing policy.

use taleforge_core::{
    audio_credits, base_credits, ArtifactKind, ArtifactState, SegmentStatus, StoryId,
    StorySegment, TEXT_CREDITS,
};

#[test]
fn test_fresh_segment_is_complete_vacuously() {
    let segment = StorySegment::new(StoryId::generate(), 1);
    assert_eq!(segment.requested_kinds().count(), 0);
    assert_eq!(segment.status(), SegmentStatus::Complete);
}

#[test]
fn test_pending_kind_means_in_progress() {
    let mut segment = StorySegment::new(StoryId::generate(), 1);
    segment.set_state(ArtifactKind::Text, ArtifactState::Succeeded);
    segment.set_state(ArtifactKind::Image, ArtifactState::Pending);
    assert_eq!(segment.status(), SegmentStatus::InProgress);
}

#[test]
fn test_mixed_terminal_states_mean_partial() {
    let mut segment = StorySegment::new(StoryId::generate(), 1);
    segment.set_state(ArtifactKind::Text, ArtifactState::Succeeded);
    segment.set_state(ArtifactKind::Audio, ArtifactState::Succeeded);
    segment.set_state(ArtifactKind::Image, ArtifactState::Failed);
    assert_eq!(segment.status(), SegmentStatus::Partial);
}

#[test]
fn test_all_terminal_success_means_complete() {
    let mut segment = StorySegment::new(StoryId::generate(), 1);
    segment.set_state(ArtifactKind::Text, ArtifactState::Succeeded);
    segment.set_state(ArtifactKind::Image, ArtifactState::Succeeded);
    assert_eq!(segment.status(), SegmentStatus::Complete);
}

#[test]
fn test_all_failed_is_complete_not_partial() {
    let mut segment = StorySegment::new(StoryId::generate(), 1);
    segment.set_state(ArtifactKind::Image, ArtifactState::Failed);
    segment.set_state(ArtifactKind::Audio, ArtifactState::Failed);
    assert_eq!(segment.status(), SegmentStatus::Complete);
}

#[test]
fn test_status_recomputation_is_idempotent() {
    let mut segment = StorySegment::new(StoryId::generate(), 3);
    segment.set_state(ArtifactKind::Text, ArtifactState::Succeeded);
    segment.set_state(ArtifactKind::Video, ArtifactState::Failed);
    let first = segment.status();
    let second = segment.status();
    assert_eq!(first, second);
    assert_eq!(first, SegmentStatus::Partial);
}

#[test]
fn test_narrative_text_is_immutable() {
    let mut segment = StorySegment::new(StoryId::generate(), 1);
    segment.set_narrative_text("Once upon a time").unwrap();
    assert!(segment.set_narrative_text("Twice upon a time").is_err());
    assert_eq!(segment.narrative_text(), Some("Once upon a time"));
}

#[test]
fn test_reference_fields_track_kinds() {
    let mut segment = StorySegment::new(StoryId::generate(), 1);
    segment.set_reference(ArtifactKind::Image, "https://cdn.test/img.png");
    assert_eq!(
        segment.reference(ArtifactKind::Image),
        Some("https://cdn.test/img.png")
    );
    assert_eq!(segment.reference(ArtifactKind::Audio), None);

    segment.clear_reference(ArtifactKind::Image);
    assert_eq!(segment.reference(ArtifactKind::Image), None);
}

#[test]
fn test_audio_pricing_blocks() {
    // Base credit covers the first 100 words.
    assert_eq!(audio_credits(50), 1);
    assert_eq!(audio_credits(100), 1);
    assert_eq!(audio_credits(150), 2);
    assert_eq!(audio_credits(201), 3);
}

#[test]
fn test_fixed_prices() {
    assert_eq!(base_credits(ArtifactKind::Text), Some(TEXT_CREDITS));
    assert_eq!(base_credits(ArtifactKind::Image), Some(1));
    assert_eq!(base_credits(ArtifactKind::Audio), None);
    assert_eq!(base_credits(ArtifactKind::Video), None);
}
