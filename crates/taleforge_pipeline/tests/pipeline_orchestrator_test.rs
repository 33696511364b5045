//! End-to-end orchestrator tests over the in-memory stack.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taleforge_core::{
    ArtifactKind, ArtifactOutcome, ArtifactState, FailureKind, GenerationRequest, SegmentId,
    SegmentStatus, SkipReason, StoryId, StoryProfile, StorySegment, UserId,
};
use taleforge_error::{
    ProviderErrorKind, StoreError, StoreErrorKind, TaleForgeErrorKind, TaleForgeResult,
};
use taleforge_ledger::{CreditLedger, InMemoryCreditLedger};
use taleforge_pipeline::{CancelFlag, PipelineConfig, PipelineOrchestrator};
use taleforge_providers::{AdapterRegistry, ScriptedAdapter};
use taleforge_segments::{InMemorySegmentRepository, SegmentRepository};
use taleforge_storage::{ArtifactReference, ArtifactStore, FileSystemArtifactStore};
use tempfile::TempDir;

struct Harness {
    orchestrator: PipelineOrchestrator,
    ledger: Arc<InMemoryCreditLedger>,
    segments: Arc<InMemorySegmentRepository>,
    _dir: TempDir,
}

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        backoff_base_ms: 1,
        backoff_max_ms: 2,
        ..PipelineConfig::default()
    }
}

fn harness_with_config(adapters: AdapterRegistry, config: PipelineConfig) -> Harness {
    let dir = TempDir::new().unwrap();
    let ledger = Arc::new(InMemoryCreditLedger::new());
    let segments = Arc::new(InMemorySegmentRepository::new());
    let store = Arc::new(FileSystemArtifactStore::new(dir.path(), "https://cdn.test").unwrap());
    let orchestrator = PipelineOrchestrator::new(
        ledger.clone(),
        store,
        segments.clone(),
        adapters,
        config,
    )
    .unwrap();
    Harness {
        orchestrator,
        ledger,
        segments,
        _dir: dir,
    }
}

fn harness(adapters: AdapterRegistry) -> Harness {
    harness_with_config(adapters, fast_config())
}

async fn fresh_segment(harness: &Harness, balance: u32) -> (SegmentId, UserId) {
    let segment = harness
        .segments
        .append_segment(StoryId::generate())
        .await
        .unwrap();
    let user = UserId::generate();
    harness.ledger.grant(user, balance).await.unwrap();
    (segment.id, user)
}

async fn seed_text(segments: &InMemorySegmentRepository, id: SegmentId, text: &str) {
    let mut segment = segments.get(id).await.unwrap();
    let read_at = segment.updated_at;
    segment.set_narrative_text(text).unwrap();
    segments.update(segment, read_at).await.unwrap();
}

fn fifty_words() -> String {
    vec!["lantern"; 50].join(" ")
}

/// Store that refuses every write, for exercising write-retry exhaustion.
struct FailingStore {
    writes: AtomicU32,
}

#[async_trait::async_trait]
impl ArtifactStore for FailingStore {
    async fn store(
        &self,
        _kind: ArtifactKind,
        _data: &[u8],
        _content_type: &str,
    ) -> TaleForgeResult<ArtifactReference> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::new(StoreErrorKind::WriteFailed(
            "disk full".to_string(),
        )))?
    }

    async fn retrieve(&self, reference: &ArtifactReference) -> TaleForgeResult<Vec<u8>> {
        Err(StoreError::new(StoreErrorKind::NotFound(
            reference.url.clone(),
        )))?
    }

    async fn exists(&self, _reference: &ArtifactReference) -> TaleForgeResult<bool> {
        Ok(false)
    }
}

/// Repository that records the image state carried by every write.
struct RecordingRepository {
    inner: InMemorySegmentRepository,
    image_states: Mutex<Vec<ArtifactState>>,
}

#[async_trait::async_trait]
impl SegmentRepository for RecordingRepository {
    async fn append_segment(&self, story: StoryId) -> TaleForgeResult<StorySegment> {
        self.inner.append_segment(story).await
    }

    async fn get(&self, id: SegmentId) -> TaleForgeResult<StorySegment> {
        self.inner.get(id).await
    }

    async fn update(
        &self,
        segment: StorySegment,
        expected_updated_at: DateTime<Utc>,
    ) -> TaleForgeResult<StorySegment> {
        self.image_states
            .lock()
            .unwrap()
            .push(segment.state(ArtifactKind::Image));
        self.inner.update(segment, expected_updated_at).await
    }

    async fn prior_narrative(
        &self,
        story: StoryId,
        sequence: u32,
    ) -> TaleForgeResult<Option<String>> {
        self.inner.prior_narrative(story, sequence).await
    }
}

#[tokio::test]
async fn test_full_request_charges_each_kind_and_completes() {
    let adapters = AdapterRegistry::new()
        .with(ScriptedAdapter::succeeding(ArtifactKind::Text, fifty_words()))
        .with(ScriptedAdapter::new(ArtifactKind::Image).then_succeed_binary(vec![1, 2, 3], "image/png"))
        .with(ScriptedAdapter::new(ArtifactKind::Audio).then_succeed_binary(vec![4, 5], "audio/mp3"));
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;

    let request = GenerationRequest::new(
        segment_id,
        user,
        [ArtifactKind::Text, ArtifactKind::Image, ArtifactKind::Audio],
    );
    let result = harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    // Text 2, image 1, audio at 50 words 1.
    assert_eq!(result.credits_charged, 4);
    assert_eq!(result.status, SegmentStatus::Complete);
    assert_eq!(result.succeeded_count(), 3);
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 6);

    let segment = harness.segments.get(segment_id).await.unwrap();
    assert_eq!(segment.narrative_text(), Some(fifty_words().as_str()));
    assert!(segment.reference(ArtifactKind::Image).is_some());
    assert!(segment.reference(ArtifactKind::Audio).is_some());
}

#[tokio::test]
async fn test_failed_kind_leaves_siblings_charged_and_partial() {
    let image = Arc::new(ScriptedAdapter::failing(
        ArtifactKind::Image,
        ProviderErrorKind::RateLimited {
            message: "slow down".to_string(),
            retry_after_ms: Some(1),
        },
    ));
    let adapters = AdapterRegistry::new()
        .with(ScriptedAdapter::succeeding(ArtifactKind::Text, fifty_words()))
        .with_arc(image.clone())
        .with(ScriptedAdapter::new(ArtifactKind::Audio).then_succeed_binary(vec![7], "audio/mp3"));
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;

    let request = GenerationRequest::new(
        segment_id,
        user,
        [ArtifactKind::Text, ArtifactKind::Image, ArtifactKind::Audio],
    );
    let result = harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    // The image reservation was released; only text and audio charged.
    assert_eq!(result.credits_charged, 3);
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 7);
    assert_eq!(result.status, SegmentStatus::Partial);
    assert_eq!(image.calls(), 2);
    assert!(matches!(
        result.outcome(ArtifactKind::Image),
        Some(ArtifactOutcome::Failed {
            failure: FailureKind::RateLimited,
            ..
        })
    ));

    let segment = harness.segments.get(segment_id).await.unwrap();
    assert_eq!(segment.state(ArtifactKind::Image), ArtifactState::Failed);
    assert_eq!(segment.reference(ArtifactKind::Image), None);
    let last_error = segment.last_error.as_ref().unwrap();
    assert_eq!(last_error.failure, FailureKind::RateLimited);
}

#[tokio::test]
async fn test_non_text_without_narrative_is_skipped_without_reservation() {
    let image = Arc::new(ScriptedAdapter::new(ArtifactKind::Image).then_succeed_binary(vec![1], "image/png"));
    let adapters = AdapterRegistry::new().with_arc(image.clone());
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;

    let request = GenerationRequest::new(segment_id, user, [ArtifactKind::Image]);
    let result = harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert!(matches!(
        result.outcome(ArtifactKind::Image),
        Some(ArtifactOutcome::Skipped {
            reason: SkipReason::MissingPrerequisite
        })
    ));
    assert_eq!(result.credits_charged, 0);
    assert_eq!(image.calls(), 0);
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 10);
    assert!(harness.ledger.charges(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_text_failure_blocks_dependent_kinds() {
    let adapters = AdapterRegistry::new()
        .with(ScriptedAdapter::failing(
            ArtifactKind::Text,
            ProviderErrorKind::InvalidInput("prompt rejected".to_string()),
        ))
        .with(ScriptedAdapter::new(ArtifactKind::Image).then_succeed_binary(vec![1], "image/png"));
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;

    let request =
        GenerationRequest::new(segment_id, user, [ArtifactKind::Text, ArtifactKind::Image]);
    let result = harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert!(matches!(
        result.outcome(ArtifactKind::Text),
        Some(ArtifactOutcome::Failed {
            failure: FailureKind::InvalidInput,
            ..
        })
    ));
    assert!(matches!(
        result.outcome(ArtifactKind::Image),
        Some(ArtifactOutcome::Skipped {
            reason: SkipReason::PrerequisiteFailed
        })
    ));
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 10);
}

#[tokio::test]
async fn test_retry_stops_at_attempt_cap_and_releases_reservation() {
    let audio = Arc::new(ScriptedAdapter::failing(
        ArtifactKind::Audio,
        ProviderErrorKind::Unavailable("voice service down".to_string()),
    ));
    let adapters = AdapterRegistry::new().with_arc(audio.clone());
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;
    seed_text(&harness.segments, segment_id, &fifty_words()).await;

    let request = GenerationRequest::new(segment_id, user, [ArtifactKind::Audio]);
    let result = harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(audio.calls(), 2);
    assert!(matches!(
        result.outcome(ArtifactKind::Audio),
        Some(ArtifactOutcome::Failed {
            failure: FailureKind::ProviderUnavailable,
            ..
        })
    ));
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 10);
}

#[tokio::test]
async fn test_storage_write_exhaustion_fails_kind_and_releases_credits() {
    let text = Arc::new(ScriptedAdapter::succeeding(ArtifactKind::Text, "A short scene."));
    let adapters = AdapterRegistry::new().with_arc(text.clone());
    let ledger = Arc::new(InMemoryCreditLedger::new());
    let segments = Arc::new(InMemorySegmentRepository::new());
    let store = Arc::new(FailingStore {
        writes: AtomicU32::new(0),
    });
    let orchestrator = PipelineOrchestrator::new(
        ledger.clone(),
        store.clone(),
        segments.clone(),
        adapters,
        fast_config(),
    )
    .unwrap();

    let segment = segments.append_segment(StoryId::generate()).await.unwrap();
    let user = UserId::generate();
    ledger.grant(user, 10).await.unwrap();

    let request = GenerationRequest::new(segment.id, user, [ArtifactKind::Text]);
    let result = orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert!(matches!(
        result.outcome(ArtifactKind::Text),
        Some(ArtifactOutcome::Failed {
            failure: FailureKind::StorageWriteFailed,
            ..
        })
    ));
    // One successful provider call, then every configured write attempt.
    assert_eq!(text.calls(), 1);
    assert_eq!(store.writes.load(Ordering::SeqCst), 2);
    assert_eq!(ledger.balance(user).await.unwrap(), 10);

    let segment = segments.get(segment.id).await.unwrap();
    assert_eq!(segment.state(ArtifactKind::Text), ArtifactState::Failed);
    assert!(!segment.has_text());
    let last_error = segment.last_error.as_ref().unwrap();
    assert_eq!(last_error.failure, FailureKind::StorageWriteFailed);
}

#[tokio::test]
async fn test_invalid_input_is_not_retried() {
    let image = Arc::new(ScriptedAdapter::failing(
        ArtifactKind::Image,
        ProviderErrorKind::InvalidInput("safety filter".to_string()),
    ));
    let adapters = AdapterRegistry::new().with_arc(image.clone());
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;
    seed_text(&harness.segments, segment_id, "A short scene.").await;

    let request = GenerationRequest::new(segment_id, user, [ArtifactKind::Image]);
    harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(image.calls(), 1);
}

#[tokio::test]
async fn test_transient_failure_recovers_within_cap() {
    let text = Arc::new(
        ScriptedAdapter::new(ArtifactKind::Text)
            .then_fail(ProviderErrorKind::Unavailable("warming up".to_string()))
            .then_succeed_text("The fox found a silver key."),
    );
    let adapters = AdapterRegistry::new().with_arc(text.clone());
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;

    let request = GenerationRequest::new(segment_id, user, [ArtifactKind::Text]);
    let result = harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(text.calls(), 2);
    assert_eq!(result.credits_charged, 2);
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 8);
    let segment = harness.segments.get(segment_id).await.unwrap();
    assert_eq!(segment.narrative_text(), Some("The fox found a silver key."));
}

#[tokio::test]
async fn test_insufficient_credits_fails_without_provider_call() {
    let text = Arc::new(ScriptedAdapter::succeeding(ArtifactKind::Text, "unreachable"));
    let adapters = AdapterRegistry::new().with_arc(text.clone());
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 1).await;

    let request = GenerationRequest::new(segment_id, user, [ArtifactKind::Text]);
    let result = harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert!(matches!(
        result.outcome(ArtifactKind::Text),
        Some(ArtifactOutcome::Failed {
            failure: FailureKind::InsufficientCredits,
            ..
        })
    ));
    assert_eq!(text.calls(), 0);
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 1);
    let segment = harness.segments.get(segment_id).await.unwrap();
    assert_eq!(segment.state(ArtifactKind::Text), ArtifactState::Failed);
}

#[tokio::test]
async fn test_reservation_failure_never_marks_kind_pending() {
    let image = Arc::new(ScriptedAdapter::new(ArtifactKind::Image).then_succeed_binary(vec![1], "image/png"));
    let adapters = AdapterRegistry::new().with_arc(image.clone());
    let ledger = Arc::new(InMemoryCreditLedger::new());
    let segments = Arc::new(RecordingRepository {
        inner: InMemorySegmentRepository::new(),
        image_states: Mutex::new(Vec::new()),
    });
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileSystemArtifactStore::new(dir.path(), "https://cdn.test").unwrap());
    let orchestrator = PipelineOrchestrator::new(
        ledger.clone(),
        store,
        segments.clone(),
        adapters,
        fast_config(),
    )
    .unwrap();

    let segment = segments.append_segment(StoryId::generate()).await.unwrap();
    let mut row = segments.get(segment.id).await.unwrap();
    let read_at = row.updated_at;
    row.set_narrative_text("A short scene.").unwrap();
    segments.update(row, read_at).await.unwrap();
    segments.image_states.lock().unwrap().clear();

    // No credits granted; the reservation is refused up front.
    let user = UserId::generate();
    let request = GenerationRequest::new(segment.id, user, [ArtifactKind::Image]);
    let result = orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert!(matches!(
        result.outcome(ArtifactKind::Image),
        Some(ArtifactOutcome::Failed {
            failure: FailureKind::InsufficientCredits,
            ..
        })
    ));
    assert_eq!(image.calls(), 0);
    // The only row write is the terminal failure; a kind with no backing
    // reservation must never be observable as pending.
    assert_eq!(
        *segments.image_states.lock().unwrap(),
        vec![ArtifactState::Failed]
    );
}

#[tokio::test]
async fn test_concurrent_duplicate_request_is_rejected() {
    let image = Arc::new(
        ScriptedAdapter::new(ArtifactKind::Image)
            .then_succeed_binary(vec![9, 9], "image/png")
            .with_latency(std::time::Duration::from_millis(50)),
    );
    let adapters = AdapterRegistry::new().with_arc(image.clone());
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;
    seed_text(&harness.segments, segment_id, "A short scene.").await;

    let first = GenerationRequest::new(segment_id, user, [ArtifactKind::Image]);
    let second = GenerationRequest::new(segment_id, user, [ArtifactKind::Image]);
    let profile = StoryProfile::default();
    let cancel_a = CancelFlag::new();
    let cancel_b = CancelFlag::new();

    let (a, b) = tokio::join!(
        harness
            .orchestrator
            .process(&first, &profile, &cancel_a),
        harness
            .orchestrator
            .process(&second, &profile, &cancel_b),
    );

    let succeeded = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1, "exactly one racing request may proceed");
    let rejected = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(
        rejected.kind(),
        TaleForgeErrorKind::Pipeline(e) if matches!(
            e.kind,
            taleforge_error::PipelineErrorKind::ConflictingRequest { .. }
        )
    ));

    // Only the winner charged credits.
    assert_eq!(image.calls(), 1);
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 9);
}

#[tokio::test]
async fn test_cancelled_request_reserves_nothing() {
    let image = Arc::new(ScriptedAdapter::new(ArtifactKind::Image).then_succeed_binary(vec![1], "image/png"));
    let adapters = AdapterRegistry::new().with_arc(image.clone());
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;
    seed_text(&harness.segments, segment_id, "A short scene.").await;

    let cancel = CancelFlag::new();
    cancel.cancel();
    let request = GenerationRequest::new(segment_id, user, [ArtifactKind::Image]);
    let result = harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &cancel)
        .await
        .unwrap();

    assert!(matches!(
        result.outcome(ArtifactKind::Image),
        Some(ArtifactOutcome::Skipped {
            reason: SkipReason::Cancelled
        })
    ));
    assert_eq!(image.calls(), 0);
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 10);
}

#[tokio::test]
async fn test_cancel_during_provider_call_discards_payload_and_releases_credits() {
    let image = Arc::new(
        ScriptedAdapter::new(ArtifactKind::Image)
            .then_succeed_binary(vec![1], "image/png")
            .with_latency(Duration::from_millis(80)),
    );
    let adapters = AdapterRegistry::new()
        .with(ScriptedAdapter::succeeding(ArtifactKind::Text, fifty_words()))
        .with_arc(image.clone());
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;

    let cancel = CancelFlag::new();
    let request =
        GenerationRequest::new(segment_id, user, [ArtifactKind::Text, ArtifactKind::Image]);
    let trip = {
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            cancel.cancel();
        }
    };
    let profile = StoryProfile::default();
    let (result, ()) = tokio::join!(
        harness
            .orchestrator
            .process(&request, &profile, &cancel),
        trip,
    );
    let result = result.unwrap();

    // Text landed before the flag tripped and is kept.
    assert!(matches!(
        result.outcome(ArtifactKind::Text),
        Some(ArtifactOutcome::Succeeded { .. })
    ));
    assert_eq!(result.credits_charged, 2);
    // The in-flight image call finished, but its payload was discarded and
    // its reservation returned.
    assert_eq!(image.calls(), 1);
    assert!(matches!(
        result.outcome(ArtifactKind::Image),
        Some(ArtifactOutcome::Skipped {
            reason: SkipReason::Cancelled
        })
    ));
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 8);

    let segment = harness.segments.get(segment_id).await.unwrap();
    assert!(segment.has_text());
    assert_eq!(segment.state(ArtifactKind::Image), ArtifactState::NotRequested);
    assert_eq!(segment.reference(ArtifactKind::Image), None);
}

#[tokio::test]
async fn test_cancelled_regeneration_keeps_prior_success() {
    let image = Arc::new(
        ScriptedAdapter::new(ArtifactKind::Image)
            .then_succeed_binary(vec![1, 1], "image/png")
            .then_succeed_binary(vec![2, 2], "image/png")
            .with_latency(Duration::from_millis(40)),
    );
    let adapters = AdapterRegistry::new().with_arc(image.clone());
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;
    seed_text(&harness.segments, segment_id, "A short scene.").await;
    let profile = StoryProfile::default();

    let first = GenerationRequest::new(segment_id, user, [ArtifactKind::Image]);
    harness
        .orchestrator
        .process(&first, &profile, &CancelFlag::new())
        .await
        .unwrap();
    let segment = harness.segments.get(segment_id).await.unwrap();
    let original = segment.reference(ArtifactKind::Image).unwrap().to_string();

    let cancel = CancelFlag::new();
    let second = GenerationRequest::new(segment_id, user, [ArtifactKind::Image]);
    let trip = {
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(15)).await;
            cancel.cancel();
        }
    };
    let (result, ()) = tokio::join!(
        harness.orchestrator.process(&second, &profile, &cancel),
        trip,
    );
    let result = result.unwrap();

    assert!(matches!(
        result.outcome(ArtifactKind::Image),
        Some(ArtifactOutcome::Skipped {
            reason: SkipReason::Cancelled
        })
    ));
    assert_eq!(image.calls(), 2);
    // The earlier success survives the aborted regeneration untouched.
    let segment = harness.segments.get(segment_id).await.unwrap();
    assert_eq!(segment.state(ArtifactKind::Image), ArtifactState::Succeeded);
    assert_eq!(
        segment.reference(ArtifactKind::Image),
        Some(original.as_str())
    );
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 9);
}

#[tokio::test]
async fn test_video_waits_for_narration_when_configured() {
    let adapters = AdapterRegistry::new()
        .with(ScriptedAdapter::new(ArtifactKind::Audio).then_succeed_binary(vec![1], "audio/mp3"))
        .with(
            ScriptedAdapter::new(ArtifactKind::Video)
                .then_succeed_binary(vec![2], "video/mp4")
                .with_quote(3),
        );
    let mut config = fast_config();
    config.video_requires_narration = true;
    let harness = harness_with_config(adapters, config);
    let (segment_id, user) = fresh_segment(&harness, 10).await;
    seed_text(&harness.segments, segment_id, &fifty_words()).await;

    let request =
        GenerationRequest::new(segment_id, user, [ArtifactKind::Audio, ArtifactKind::Video]);
    let result = harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(result.succeeded_count(), 2);
    // Audio 1 plus the adapter-quoted video cost.
    assert_eq!(result.credits_charged, 4);

    let segment = harness.segments.get(segment_id).await.unwrap();
    assert!(segment.reference(ArtifactKind::Video).is_some());
}

#[tokio::test]
async fn test_video_without_narration_is_skipped_when_required() {
    let video = Arc::new(ScriptedAdapter::new(ArtifactKind::Video).then_succeed_binary(vec![2], "video/mp4"));
    let adapters = AdapterRegistry::new().with_arc(video.clone());
    let mut config = fast_config();
    config.video_requires_narration = true;
    let harness = harness_with_config(adapters, config);
    let (segment_id, user) = fresh_segment(&harness, 10).await;
    seed_text(&harness.segments, segment_id, "A short scene.").await;

    let request = GenerationRequest::new(segment_id, user, [ArtifactKind::Video]);
    let result = harness
        .orchestrator
        .process(&request, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert!(matches!(
        result.outcome(ArtifactKind::Video),
        Some(ArtifactOutcome::Skipped {
            reason: SkipReason::MissingPrerequisite
        })
    ));
    assert_eq!(video.calls(), 0);
    assert_eq!(harness.ledger.balance(user).await.unwrap(), 10);
}

#[tokio::test]
async fn test_empty_and_unroutable_requests_are_rejected() {
    let adapters = AdapterRegistry::new()
        .with(ScriptedAdapter::succeeding(ArtifactKind::Text, "hello"));
    let harness = harness(adapters);
    let (segment_id, user) = fresh_segment(&harness, 10).await;

    let empty = GenerationRequest::new(segment_id, user, std::iter::empty());
    let err = harness
        .orchestrator
        .process(&empty, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), TaleForgeErrorKind::Pipeline(_)));

    let unroutable = GenerationRequest::new(segment_id, user, [ArtifactKind::Video]);
    let err = harness
        .orchestrator
        .process(&unroutable, &StoryProfile::default(), &CancelFlag::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        TaleForgeErrorKind::Pipeline(e) if matches!(
            e.kind,
            taleforge_error::PipelineErrorKind::AdapterMissing(_)
        )
    ));
}
