//! Tests for adapter classification, deadlines, and quoting.

use std::time::Duration;
use taleforge_core::{ArtifactKind, SegmentContext, SegmentId, StoryId, StoryProfile};
use taleforge_error::ProviderErrorKind;
use taleforge_providers::{AdapterRegistry, ProviderAdapter, ScriptedAdapter};
use tokio::time::Instant;

fn context_with_text(words: usize) -> SegmentContext {
    let text = vec!["word"; words].join(" ");
    SegmentContext {
        segment_id: SegmentId::generate(),
        story_id: StoryId::generate(),
        sequence: 1,
        narrative_text: Some(text),
        prior_text: None,
        story: StoryProfile::default(),
        include_narration: false,
    }
}

#[tokio::test]
async fn test_scripted_outcomes_consume_in_order() {
    let adapter = ScriptedAdapter::new(ArtifactKind::Image)
        .then_fail(ProviderErrorKind::Unavailable("cold start".to_string()))
        .then_succeed_binary(vec![1, 2, 3], "image/png");
    let ctx = context_with_text(10);
    let deadline = Instant::now() + Duration::from_secs(5);

    let first = adapter.generate(&ctx, deadline).await;
    assert!(matches!(
        first.unwrap_err().kind,
        ProviderErrorKind::Unavailable(_)
    ));

    let second = adapter.generate(&ctx, deadline).await.unwrap();
    assert_eq!(second.content_type(), "image/png");
    assert_eq!(adapter.calls(), 2);
}

#[tokio::test]
async fn test_exhausted_script_repeats_last_outcome() {
    let adapter = ScriptedAdapter::failing(
        ArtifactKind::Audio,
        ProviderErrorKind::RateLimited {
            message: "slow down".to_string(),
            retry_after_ms: Some(250),
        },
    );
    let ctx = context_with_text(10);
    let deadline = Instant::now() + Duration::from_secs(5);

    for _ in 0..3 {
        let err = adapter.generate(&ctx, deadline).await.unwrap_err();
        assert_eq!(err.kind.retry_after_ms(), Some(250));
        assert!(err.kind.is_retryable());
    }
    assert_eq!(adapter.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_converts_slow_call_to_timeout() {
    let adapter = ScriptedAdapter::succeeding(ArtifactKind::Text, "late answer")
        .with_latency(Duration::from_secs(120));
    let ctx = context_with_text(0);
    let deadline = Instant::now() + Duration::from_secs(30);

    let err = adapter.generate(&ctx, deadline).await.unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::Timeout(_)));
}

#[tokio::test]
async fn test_invalid_input_is_not_retryable() {
    let err_kind = ProviderErrorKind::InvalidInput("unsafe content".to_string());
    assert!(!err_kind.is_retryable());
    assert!(ProviderErrorKind::Unknown("?".to_string()).is_retryable());
    assert!(ProviderErrorKind::Timeout("t".to_string()).is_retryable());
}

#[test]
fn test_default_quotes_follow_pricing_policy() {
    let text = ScriptedAdapter::succeeding(ArtifactKind::Text, "t");
    let image = ScriptedAdapter::succeeding(ArtifactKind::Image, "i");
    let audio = ScriptedAdapter::succeeding(ArtifactKind::Audio, "a");

    let short = context_with_text(50);
    let long = context_with_text(250);

    assert_eq!(text.quote(&short), 2);
    assert_eq!(image.quote(&short), 1);
    assert_eq!(audio.quote(&short), 1);
    assert_eq!(audio.quote(&long), 3);
}

#[test]
fn test_video_quote_is_adapter_reported() {
    let video = ScriptedAdapter::succeeding(ArtifactKind::Video, "v").with_quote(5);
    let ctx = context_with_text(10);
    assert_eq!(video.quote(&ctx), 5);
}

#[test]
fn test_registry_lookup() {
    let registry = AdapterRegistry::new()
        .with(ScriptedAdapter::succeeding(ArtifactKind::Text, "t"))
        .with(ScriptedAdapter::succeeding(ArtifactKind::Image, "i"));
    assert!(registry.get(ArtifactKind::Text).is_some());
    assert!(registry.get(ArtifactKind::Image).is_some());
    assert!(registry.get(ArtifactKind::Video).is_none());
}
