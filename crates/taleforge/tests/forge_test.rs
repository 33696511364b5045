//! End-to-end tests through the assembled facade.

use taleforge::{
    AdapterRegistry, ArtifactKind, GenerationRequest, ScriptedAdapter, SegmentStatus, StoryId,
    StoryProfile, TaleForge, UserId,
};

fn forge_with(adapters: AdapterRegistry, dir: &tempfile::TempDir) -> TaleForge {
    TaleForge::builder()
        .storage_root(dir.path())
        .public_base_url("https://cdn.test")
        .adapters(adapters)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_story_grows_segment_by_segment() {
    let dir = tempfile::tempdir().unwrap();
    let adapters = AdapterRegistry::new()
        .with(
            ScriptedAdapter::new(ArtifactKind::Text)
                .then_succeed_text("Luna crept into the moonlit garden.")
                .then_succeed_text("A silver key glinted under the rose bush."),
        )
        .with(ScriptedAdapter::new(ArtifactKind::Image).then_succeed_binary(vec![1], "image/png"));
    let forge = forge_with(adapters, &dir);

    let user = UserId::generate();
    forge.grant_credits(user, 20).await.unwrap();
    let story = StoryId::generate();
    let profile = StoryProfile {
        age_group: "4-6".to_string(),
        genre: "bedtime".to_string(),
        language: "en".to_string(),
        characters: vec!["Luna the fox".to_string()],
    };

    let first = forge.append_segment(story).await.unwrap();
    let result = forge
        .generate(
            &GenerationRequest::new(first.id, user, [ArtifactKind::Text, ArtifactKind::Image]),
            &profile,
        )
        .await
        .unwrap();
    assert_eq!(result.status, SegmentStatus::Complete);
    assert_eq!(result.credits_charged, 3);

    let second = forge.append_segment(story).await.unwrap();
    assert_eq!(second.sequence, 2);
    let result = forge
        .generate(
            &GenerationRequest::new(second.id, user, [ArtifactKind::Text]),
            &profile,
        )
        .await
        .unwrap();
    assert_eq!(result.credits_charged, 2);

    let second = forge.segment(second.id).await.unwrap();
    assert_eq!(
        second.narrative_text(),
        Some("A silver key glinted under the rose bush.")
    );
    assert_eq!(forge.balance(user).await.unwrap(), 15);
}

#[tokio::test]
async fn test_sweeper_runs_against_live_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let forge = forge_with(AdapterRegistry::new(), &dir);
    let handle = forge.spawn_sweeper();
    // A fresh ledger sweeps nothing; the task must simply be alive.
    assert!(!handle.is_finished());
    handle.abort();
}
