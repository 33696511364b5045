//! Assembled pipeline with sensible single-process defaults.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use taleforge_core::{
    GenerationRequest, SegmentResult, StoryId, StoryProfile, StorySegment, UserId,
};
use taleforge_error::TaleForgeResult;
use taleforge_ledger::{CreditLedger, InMemoryCreditLedger, ReservationSweeper};
use taleforge_pipeline::{CancelFlag, PipelineConfig, PipelineOrchestrator};
use taleforge_providers::AdapterRegistry;
use taleforge_segments::{InMemorySegmentRepository, SegmentRepository};
use taleforge_storage::{ArtifactStore, FileSystemArtifactStore};
use tokio::task::JoinHandle;
use tracing::info;

/// Builder for a [`TaleForge`] instance.
pub struct TaleForgeBuilder {
    config: PipelineConfig,
    adapters: AdapterRegistry,
    storage_root: PathBuf,
    public_base_url: String,
    sweep_interval: Duration,
}

impl TaleForgeBuilder {
    /// Override the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Register the provider adapters to route requests through.
    pub fn adapters(mut self, adapters: AdapterRegistry) -> Self {
        self.adapters = adapters;
        self
    }

    /// Root directory for the filesystem artifact store.
    pub fn storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Public base URL written into artifact references.
    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }

    /// How often the background sweep looks for abandoned reservations.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Wire the in-memory ledger and repository to a filesystem store.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the storage root
    /// cannot be created.
    pub fn build(self) -> TaleForgeResult<TaleForge> {
        let ledger: Arc<dyn CreditLedger> = Arc::new(InMemoryCreditLedger::new());
        let segments: Arc<dyn SegmentRepository> = Arc::new(InMemorySegmentRepository::new());
        let store: Arc<dyn ArtifactStore> = Arc::new(FileSystemArtifactStore::new(
            self.storage_root,
            self.public_base_url,
        )?);
        let orchestrator = PipelineOrchestrator::new(
            ledger.clone(),
            store.clone(),
            segments.clone(),
            self.adapters,
            self.config,
        )?;
        info!("Pipeline assembled");
        Ok(TaleForge {
            orchestrator,
            ledger,
            segments,
            store,
            sweep_interval: self.sweep_interval,
        })
    }
}

/// A fully wired generation pipeline.
///
/// Owns the orchestrator and its collaborators; callers append segments,
/// grant credits, and submit generation requests through one handle.
///
/// # Examples
///
/// ```no_run
/// use taleforge::{ArtifactKind, GenerationRequest, StoryId, StoryProfile, TaleForge, UserId};
/// use taleforge_providers::{AdapterRegistry, ScriptedAdapter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> taleforge::TaleForgeResult<()> {
/// let forge = TaleForge::builder()
///     .storage_root("/var/lib/taleforge")
///     .adapters(AdapterRegistry::new().with(ScriptedAdapter::succeeding(
///         ArtifactKind::Text,
///         "Once upon a time",
///     )))
///     .build()?;
///
/// let user = UserId::generate();
/// forge.grant_credits(user, 20).await?;
/// let segment = forge.append_segment(StoryId::generate()).await?;
///
/// let request = GenerationRequest::new(segment.id, user, [ArtifactKind::Text]);
/// let result = forge.generate(&request, &StoryProfile::default()).await?;
/// assert_eq!(result.succeeded_count(), 1);
/// # Ok(())
/// # }
/// ```
pub struct TaleForge {
    orchestrator: PipelineOrchestrator,
    ledger: Arc<dyn CreditLedger>,
    segments: Arc<dyn SegmentRepository>,
    store: Arc<dyn ArtifactStore>,
    sweep_interval: Duration,
}

impl TaleForge {
    /// Start building a pipeline with default configuration.
    pub fn builder() -> TaleForgeBuilder {
        TaleForgeBuilder {
            config: PipelineConfig::default(),
            adapters: AdapterRegistry::new(),
            storage_root: PathBuf::from("artifacts"),
            public_base_url: "http://localhost/artifacts".to_string(),
            sweep_interval: Duration::from_secs(60),
        }
    }

    /// Run one generation request to completion.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        profile: &StoryProfile,
    ) -> TaleForgeResult<SegmentResult> {
        self.orchestrator
            .process(request, profile, &CancelFlag::new())
            .await
    }

    /// Run one generation request with a caller-held cancellation flag.
    pub async fn generate_cancellable(
        &self,
        request: &GenerationRequest,
        profile: &StoryProfile,
        cancel: &CancelFlag,
    ) -> TaleForgeResult<SegmentResult> {
        self.orchestrator.process(request, profile, cancel).await
    }

    /// Append the next segment to a story.
    pub async fn append_segment(&self, story: StoryId) -> TaleForgeResult<StorySegment> {
        self.segments.append_segment(story).await
    }

    /// Fetch a segment by id.
    pub async fn segment(&self, id: taleforge_core::SegmentId) -> TaleForgeResult<StorySegment> {
        self.segments.get(id).await
    }

    /// Add spendable credits to a user's balance.
    pub async fn grant_credits(&self, user: UserId, amount: u32) -> TaleForgeResult<()> {
        self.ledger.grant(user, amount).await
    }

    /// Current available balance for a user.
    pub async fn balance(&self, user: UserId) -> TaleForgeResult<u32> {
        self.ledger.balance(user).await
    }

    /// The credit ledger.
    pub fn ledger(&self) -> &Arc<dyn CreditLedger> {
        &self.ledger
    }

    /// The artifact store.
    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// The active pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        self.orchestrator.config()
    }

    /// Spawn the background sweep for abandoned reservations.
    ///
    /// The returned handle runs until aborted.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        ReservationSweeper::new(
            self.ledger.clone(),
            self.sweep_interval,
            self.config().reservation_timeout(),
        )
        .spawn()
    }
}
