//! Per-segment generation orchestrator.

use crate::{CancelFlag, PipelineConfig};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use taleforge_core::{
    ArtifactKind, ArtifactOutcome, ArtifactState, FailureKind, GenerationRequest, ProviderPayload,
    ReservationId, SegmentContext, SegmentId, SegmentResult, SkipReason, StoryProfile,
    StorySegment, MIN_CHARGE_CREDITS,
};
use taleforge_error::{
    PipelineError, PipelineErrorKind, ProviderError, SegmentError, SegmentErrorKind, StoreError,
    StoreErrorKind, TaleForgeErrorKind, TaleForgeResult,
};
use taleforge_ledger::CreditLedger;
use taleforge_providers::{AdapterRegistry, ProviderAdapter};
use taleforge_segments::{
    begin_attempt, record_failure, record_success, InFlightRegistry, SegmentRepository,
};
use taleforge_storage::{ArtifactReference, ArtifactStore};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_retry2::{
    strategy::{jitter, ExponentialBackoff},
    Retry, RetryError,
};
use tracing::{debug, info, instrument, warn};

/// Bounded re-read attempts after an optimistic-concurrency conflict.
const MAX_WRITE_TRIES: usize = 4;

/// Coordinates the ledger, providers, store, and segment repository for one
/// generation request at a time per (segment, kind).
///
/// Per artifact kind the sequence is: reserve credits, call the provider
/// under a deadline with retries, persist the payload, record the outcome on
/// the segment row, then commit or release the reservation. Kinds fail
/// independently; partial success is reported per kind, never collapsed.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use taleforge_core::{ArtifactKind, GenerationRequest, StoryProfile, UserId};
/// use taleforge_ledger::{CreditLedger, InMemoryCreditLedger};
/// use taleforge_pipeline::{CancelFlag, PipelineConfig, PipelineOrchestrator};
/// use taleforge_providers::{AdapterRegistry, ScriptedAdapter};
/// use taleforge_segments::{InMemorySegmentRepository, SegmentRepository};
/// use taleforge_storage::FileSystemArtifactStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> taleforge_error::TaleForgeResult<()> {
/// let ledger = Arc::new(InMemoryCreditLedger::new());
/// let store = Arc::new(FileSystemArtifactStore::new("/var/lib/taleforge", "https://cdn.test")?);
/// let segments = Arc::new(InMemorySegmentRepository::new());
/// let adapters = AdapterRegistry::new()
///     .with(ScriptedAdapter::succeeding(ArtifactKind::Text, "Once upon a time"));
///
/// let orchestrator = PipelineOrchestrator::new(
///     ledger.clone(),
///     store,
///     segments.clone(),
///     adapters,
///     PipelineConfig::default(),
/// )?;
///
/// let user = UserId::generate();
/// ledger.grant(user, 10).await?;
/// let segment = segments.append_segment(taleforge_core::StoryId::generate()).await?;
/// let request = GenerationRequest::new(segment.id, user, [ArtifactKind::Text]);
/// let result = orchestrator
///     .process(&request, &StoryProfile::default(), &CancelFlag::new())
///     .await?;
/// assert_eq!(result.credits_charged, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PipelineOrchestrator {
    ledger: Arc<dyn CreditLedger>,
    store: Arc<dyn ArtifactStore>,
    segments: Arc<dyn SegmentRepository>,
    adapters: AdapterRegistry,
    inflight: InFlightRegistry,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    /// Assemble an orchestrator over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(
        ledger: Arc<dyn CreditLedger>,
        store: Arc<dyn ArtifactStore>,
        segments: Arc<dyn SegmentRepository>,
        adapters: AdapterRegistry,
        config: PipelineConfig,
    ) -> TaleForgeResult<Self> {
        config.validate()?;
        Ok(Self {
            ledger,
            store,
            segments,
            adapters,
            inflight: InFlightRegistry::new(),
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one generation request to completion.
    ///
    /// Text runs first when requested, since every other kind consumes the
    /// narrative text. The remaining kinds fan out concurrently under
    /// `max_concurrent_artifacts`. Per-kind failures land in the result;
    /// only request-level problems (empty request, missing adapter, an
    /// in-flight conflict, unknown segment) surface as errors.
    ///
    /// # Errors
    ///
    /// - `EmptyRequest` if the request names no kinds
    /// - `AdapterMissing` if a requested kind has no registered adapter
    /// - `ConflictingRequest` if another request holds any requested kind
    /// - `NotFound` if the segment does not exist
    #[instrument(
        skip(self, request, profile, cancel),
        fields(segment = %request.segment_id, user = %request.user_id)
    )]
    pub async fn process(
        &self,
        request: &GenerationRequest,
        profile: &StoryProfile,
        cancel: &CancelFlag,
    ) -> TaleForgeResult<SegmentResult> {
        if request.kinds.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::EmptyRequest))?;
        }
        for kind in &request.kinds {
            if self.adapters.get(*kind).is_none() {
                return Err(PipelineError::new(PipelineErrorKind::AdapterMissing(
                    kind.to_string(),
                )))?;
            }
        }

        // Held for the whole request; releases on every exit path.
        let _permit = self.inflight.try_acquire(request.segment_id, &request.kinds)?;

        let segment = self.segments.get(request.segment_id).await?;
        let prior_text = self
            .segments
            .prior_narrative(segment.story_id, segment.sequence)
            .await?;

        let mut outcomes = BTreeMap::new();
        let mut credits_charged = 0u32;

        if request.wants_text() {
            let ctx = self.build_context(&segment, prior_text.clone(), profile);
            let (outcome, charged) = self
                .run_kind(request, ArtifactKind::Text, &ctx, cancel)
                .await;
            credits_charged += charged;
            outcomes.insert(ArtifactKind::Text, outcome);
        }

        // Re-read so a text success in this request feeds the other kinds.
        let segment = self.segments.get(request.segment_id).await?;
        let mut runnable = Vec::new();
        for kind in request.non_text_kinds() {
            if segment.has_text() {
                runnable.push(kind);
            } else {
                let reason = if request.wants_text() {
                    SkipReason::PrerequisiteFailed
                } else {
                    SkipReason::MissingPrerequisite
                };
                debug!(%kind, %reason, "Skipping kind without narrative text");
                outcomes.insert(kind, ArtifactOutcome::Skipped { reason });
            }
        }

        let ctx = self.build_context(&segment, prior_text, profile);

        // With narrated video enabled, audio must land before video starts.
        if self.config.video_requires_narration && runnable.contains(&ArtifactKind::Video) {
            if runnable.contains(&ArtifactKind::Audio) {
                runnable.retain(|k| !matches!(k, ArtifactKind::Audio | ArtifactKind::Video));
                let (audio_outcome, charged) = self
                    .run_kind(request, ArtifactKind::Audio, &ctx, cancel)
                    .await;
                credits_charged += charged;
                let narration_ready = audio_outcome.is_success();
                outcomes.insert(ArtifactKind::Audio, audio_outcome);
                if narration_ready {
                    let (video_outcome, charged) = self
                        .run_kind(request, ArtifactKind::Video, &ctx, cancel)
                        .await;
                    credits_charged += charged;
                    outcomes.insert(ArtifactKind::Video, video_outcome);
                } else {
                    outcomes.insert(
                        ArtifactKind::Video,
                        ArtifactOutcome::Skipped {
                            reason: SkipReason::PrerequisiteFailed,
                        },
                    );
                }
            } else if segment.reference(ArtifactKind::Audio).is_none() {
                runnable.retain(|k| *k != ArtifactKind::Video);
                outcomes.insert(
                    ArtifactKind::Video,
                    ArtifactOutcome::Skipped {
                        reason: SkipReason::MissingPrerequisite,
                    },
                );
            }
        }

        let limiter = Semaphore::new(self.config.max_concurrent_artifacts);
        let runs = runnable.iter().map(|kind| {
            let ctx = &ctx;
            let limiter = &limiter;
            async move {
                let _slot = limiter.acquire().await.expect("concurrency limiter closed");
                let (outcome, charged) = self.run_kind(request, *kind, ctx, cancel).await;
                (*kind, outcome, charged)
            }
        });
        for (kind, outcome, charged) in futures::future::join_all(runs).await {
            credits_charged += charged;
            outcomes.insert(kind, outcome);
        }

        let segment = self.segments.get(request.segment_id).await?;
        let status = segment.status();
        info!(
            %status,
            credits_charged,
            succeeded = outcomes.values().filter(|o| o.is_success()).count(),
            "Request settled"
        );
        Ok(SegmentResult {
            segment_id: request.segment_id,
            outcomes,
            status,
            credits_charged,
        })
    }

    fn build_context(
        &self,
        segment: &StorySegment,
        prior_text: Option<String>,
        profile: &StoryProfile,
    ) -> SegmentContext {
        SegmentContext {
            segment_id: segment.id,
            story_id: segment.story_id,
            sequence: segment.sequence,
            narrative_text: segment.narrative_text().map(ToString::to_string),
            prior_text,
            story: profile.clone(),
            include_narration: self.config.video_requires_narration,
        }
    }

    /// Drive one artifact kind to a terminal outcome.
    ///
    /// Never returns an error: everything that goes wrong past the request
    /// gate is reported as a per-kind outcome so sibling kinds stay
    /// unaffected. The returned credits are the amount committed, zero
    /// unless the kind succeeded.
    #[instrument(skip(self, request, ctx, cancel), fields(segment = %request.segment_id, %kind))]
    async fn run_kind(
        &self,
        request: &GenerationRequest,
        kind: ArtifactKind,
        ctx: &SegmentContext,
        cancel: &CancelFlag,
    ) -> (ArtifactOutcome, u32) {
        if cancel.is_cancelled() {
            return (
                ArtifactOutcome::Skipped {
                    reason: SkipReason::Cancelled,
                },
                0,
            );
        }
        let Some(adapter) = self.adapters.get(kind) else {
            // Guarded at the request gate; kept for direct callers.
            return (
                ArtifactOutcome::Failed {
                    failure: FailureKind::Unknown,
                    message: format!("no adapter registered for {kind}"),
                },
                0,
            );
        };

        // Reserve before the kind goes Pending; a row must never show a
        // pending attempt that holds no credits.
        let amount = adapter.quote(ctx).max(MIN_CHARGE_CREDITS);
        let reservation = match self
            .ledger
            .reserve(request.user_id, amount, request.idempotency_token)
            .await
        {
            Ok(reservation) => reservation,
            Err(e) => {
                let failure = match e.kind() {
                    TaleForgeErrorKind::Ledger(l) if l.is_insufficient_credits() => {
                        FailureKind::InsufficientCredits
                    }
                    _ => FailureKind::Unknown,
                };
                let message = e.to_string();
                warn!(%failure, "Reservation failed, no provider call made");
                self.fail_kind(request.segment_id, kind, failure, &message)
                    .await;
                return (ArtifactOutcome::Failed { failure, message }, 0);
            }
        };
        debug!(%reservation, amount, provider = adapter.provider_name(), "Credits reserved");

        // Remember where the kind stood so cancellation can put it back.
        let mut prior_state = ArtifactState::NotRequested;
        if let Err(e) = self
            .mutate_segment(request.segment_id, |s| {
                prior_state = s.state(kind);
                begin_attempt(s, kind)
            })
            .await
        {
            let message = e.to_string();
            self.release_quietly(reservation).await;
            return (
                ArtifactOutcome::Failed {
                    failure: FailureKind::Unknown,
                    message,
                },
                0,
            );
        }

        let payload = match self.generate_with_retry(&adapter, kind, ctx).await {
            Ok(payload) => payload,
            Err(e) => {
                let failure = FailureKind::from(&e.kind);
                let message = e.kind.to_string();
                self.release_quietly(reservation).await;
                self.fail_kind(request.segment_id, kind, failure, &message)
                    .await;
                return (ArtifactOutcome::Failed { failure, message }, 0);
            }
        };

        if cancel.is_cancelled() {
            debug!("Discarding payload for cancelled request");
            self.release_quietly(reservation).await;
            self.restore_kind(request.segment_id, kind, prior_state).await;
            return (
                ArtifactOutcome::Skipped {
                    reason: SkipReason::Cancelled,
                },
                0,
            );
        }

        let reference = match self.store_with_retry(kind, &payload).await {
            Ok(reference) => reference,
            Err(e) => {
                let message = e.to_string();
                self.release_quietly(reservation).await;
                self.fail_kind(
                    request.segment_id,
                    kind,
                    FailureKind::StorageWriteFailed,
                    &message,
                )
                .await;
                return (
                    ArtifactOutcome::Failed {
                        failure: FailureKind::StorageWriteFailed,
                        message,
                    },
                    0,
                );
            }
        };

        if let Err(e) = self
            .mutate_segment(request.segment_id, |s| {
                record_success(s, kind, &payload, &reference.url)
            })
            .await
        {
            let message = e.to_string();
            warn!(error = %message, "Failed to record success, releasing reservation");
            self.release_quietly(reservation).await;
            return (
                ArtifactOutcome::Failed {
                    failure: FailureKind::Unknown,
                    message,
                },
                0,
            );
        }

        if let Err(e) = self.ledger.commit(reservation).await {
            // The artifact exists and the row records success; a commit
            // failure here must not retract either.
            warn!(%reservation, error = %e, "Commit failed after successful generation");
        }
        info!(%reservation, amount, reference = %reference.url, "Artifact committed");
        (
            ArtifactOutcome::Succeeded {
                reference: reference.url,
            },
            amount,
        )
    }

    async fn generate_with_retry(
        &self,
        adapter: &Arc<dyn ProviderAdapter>,
        kind: ArtifactKind,
        ctx: &SegmentContext,
    ) -> Result<ProviderPayload, ProviderError> {
        let attempts = self.config.attempts(kind).max(1) as usize;
        let deadline = self.config.deadline(kind);
        let strategy = ExponentialBackoff::from_millis(self.config.backoff_base_ms)
            .factor(2)
            .max_delay(Duration::from_millis(self.config.backoff_max_ms))
            .map(jitter)
            .take(attempts - 1);

        Retry::spawn(strategy, || async {
            match adapter.generate(ctx, Instant::now() + deadline).await {
                Ok(payload) => Ok(payload),
                Err(e) if e.kind.is_retryable() => {
                    warn!(provider = adapter.provider_name(), %kind, error = %e, "Retryable provider failure");
                    let retry_after = e.kind.retry_after_ms().map(Duration::from_millis);
                    Err(RetryError::Transient {
                        err: e,
                        retry_after,
                    })
                }
                Err(e) => {
                    warn!(provider = adapter.provider_name(), %kind, error = %e, "Permanent provider failure");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }

    async fn store_with_retry(
        &self,
        kind: ArtifactKind,
        payload: &ProviderPayload,
    ) -> TaleForgeResult<ArtifactReference> {
        let attempts = self.config.storage_write_attempts.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match self
                .store
                .store(kind, payload.body().as_bytes(), payload.content_type())
                .await
            {
                Ok(reference) => return Ok(reference),
                Err(e) => {
                    warn!(%kind, attempt, error = %e, "Artifact store write failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            StoreError::new(StoreErrorKind::WriteFailed(
                "no storage attempts configured".to_string(),
            ))
            .into()
        }))
    }

    /// Read-mutate-write with bounded retries on optimistic conflicts.
    async fn mutate_segment<F>(&self, id: SegmentId, mut apply: F) -> TaleForgeResult<StorySegment>
    where
        F: FnMut(&mut StorySegment) -> TaleForgeResult<()>,
    {
        let mut conflict = None;
        for _ in 0..MAX_WRITE_TRIES {
            let mut segment = self.segments.get(id).await?;
            let read_at = segment.updated_at;
            apply(&mut segment)?;
            match self.segments.update(segment, read_at).await {
                Ok(stored) => return Ok(stored),
                Err(e) => match e.kind() {
                    TaleForgeErrorKind::Segment(s) if s.is_update_conflict() => {
                        debug!(segment = %id, "Segment write conflicted, re-reading");
                        conflict = Some(e);
                    }
                    _ => return Err(e),
                },
            }
        }
        Err(conflict.unwrap_or_else(|| {
            SegmentError::new(SegmentErrorKind::UpdateConflict(id.to_string())).into()
        }))
    }

    async fn fail_kind(&self, id: SegmentId, kind: ArtifactKind, failure: FailureKind, message: &str) {
        let result = self
            .mutate_segment(id, |s| {
                record_failure(s, kind, failure, message.to_string());
                Ok(())
            })
            .await;
        if let Err(e) = result {
            warn!(segment = %id, %kind, error = %e, "Failed to record artifact failure");
        }
    }

    /// Put a cancelled kind back where it stood before the attempt, so a
    /// previously succeeded kind keeps its reference and state.
    async fn restore_kind(&self, id: SegmentId, kind: ArtifactKind, state: ArtifactState) {
        let result = self
            .mutate_segment(id, |s| {
                s.set_state(kind, state);
                Ok(())
            })
            .await;
        if let Err(e) = result {
            warn!(segment = %id, %kind, error = %e, "Failed to restore cancelled kind");
        }
    }

    async fn release_quietly(&self, reservation: ReservationId) {
        if let Err(e) = self.ledger.release(reservation).await {
            warn!(%reservation, error = %e, "Failed to release reservation");
        }
    }
}
