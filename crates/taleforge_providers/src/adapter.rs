//! Provider adapter trait and registry.

use std::collections::HashMap;
use std::sync::Arc;
use taleforge_core::{
    audio_credits, ArtifactKind, ProviderResult, SegmentContext, IMAGE_CREDITS,
    MIN_CHARGE_CREDITS, TEXT_CREDITS,
};
use tokio::time::Instant;

/// Uniform interface to an external generation provider.
///
/// `generate` must terminate by `deadline`, surfacing a `Timeout`
/// classification rather than hanging; [`crate::run_with_deadline`] wraps a
/// provider call accordingly. Implementations are stateless at the pipeline
/// layer and safely callable concurrently.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The artifact kind this adapter produces.
    fn kind(&self) -> ArtifactKind;

    /// Provider name for logs (e.g. "openai", "elevenlabs").
    fn provider_name(&self) -> &str;

    /// Credits to reserve for generating from this context.
    ///
    /// Text and image carry fixed prices; audio prices its narration length.
    /// Video adapters report their own cost and should override this; the
    /// default charges the minimum.
    fn quote(&self, ctx: &SegmentContext) -> u32 {
        match self.kind() {
            ArtifactKind::Text => TEXT_CREDITS,
            ArtifactKind::Image => IMAGE_CREDITS,
            ArtifactKind::Audio => audio_credits(ctx.narration_words()),
            ArtifactKind::Video => MIN_CHARGE_CREDITS,
        }
    }

    /// Generate one artifact, finishing by `deadline`.
    async fn generate(&self, ctx: &SegmentContext, deadline: Instant) -> ProviderResult;
}

/// Adapter lookup by artifact kind.
///
/// # Examples
///
/// ```
/// use taleforge_core::ArtifactKind;
/// use taleforge_providers::{AdapterRegistry, ScriptedAdapter};
///
/// let registry = AdapterRegistry::new()
///     .with(ScriptedAdapter::succeeding(ArtifactKind::Text, "Once upon a time"));
/// assert!(registry.get(ArtifactKind::Text).is_some());
/// assert!(registry.get(ArtifactKind::Video).is_none());
/// ```
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<ArtifactKind, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter, replacing any previous one for its kind.
    pub fn with(mut self, adapter: impl ProviderAdapter + 'static) -> Self {
        self.adapters.insert(adapter.kind(), Arc::new(adapter));
        self
    }

    /// Register a shared adapter.
    pub fn with_arc(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    /// Look up the adapter for a kind.
    pub fn get(&self, kind: ArtifactKind) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&kind).cloned()
    }
}
