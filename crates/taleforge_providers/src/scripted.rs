//! Scripted adapter for tests and fault injection.

use crate::{run_with_deadline, ProviderAdapter};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use taleforge_core::{ArtifactKind, ProviderPayload, ProviderResult, SegmentContext};
use taleforge_error::{ProviderError, ProviderErrorKind};
use tokio::time::Instant;

/// One scripted provider response.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Return this payload
    Succeed(ProviderPayload),
    /// Fail with this classification
    Fail(ProviderErrorKind),
}

/// Adapter that replays a script of outcomes.
///
/// Outcomes are consumed in order; once the script is exhausted the last
/// outcome repeats, so a single entry models "fails every attempt".
/// Call counts are tracked for asserting retry caps.
///
/// # Examples
///
/// ```
/// use taleforge_core::ArtifactKind;
/// use taleforge_providers::ScriptedAdapter;
/// use taleforge_error::ProviderErrorKind;
///
/// let flaky = ScriptedAdapter::new(ArtifactKind::Image)
///     .then_fail(ProviderErrorKind::Unavailable("warming up".to_string()))
///     .then_succeed_binary(vec![0x89, 0x50], "image/png");
/// assert_eq!(flaky.calls(), 0);
/// ```
pub struct ScriptedAdapter {
    kind: ArtifactKind,
    script: Mutex<Script>,
    calls: AtomicU32,
    latency: Option<Duration>,
    quote: Option<u32>,
}

struct Script {
    queue: VecDeque<ScriptedOutcome>,
    last: Option<ScriptedOutcome>,
}

impl ScriptedAdapter {
    /// Create an adapter with an empty script.
    ///
    /// An empty script fails with `Unknown`; push outcomes with the
    /// builder methods.
    pub fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
            script: Mutex::new(Script {
                queue: VecDeque::new(),
                last: None,
            }),
            calls: AtomicU32::new(0),
            latency: None,
            quote: None,
        }
    }

    /// Adapter that always succeeds with the given text.
    pub fn succeeding(kind: ArtifactKind, text: impl Into<String>) -> Self {
        Self::new(kind).then_succeed_text(text)
    }

    /// Adapter that always fails with the given classification.
    pub fn failing(kind: ArtifactKind, failure: ProviderErrorKind) -> Self {
        Self::new(kind).then_fail(failure)
    }

    /// Append a text success to the script.
    pub fn then_succeed_text(self, text: impl Into<String>) -> Self {
        self.push(ScriptedOutcome::Succeed(ProviderPayload::text(text)))
    }

    /// Append a binary success to the script.
    pub fn then_succeed_binary(self, bytes: Vec<u8>, content_type: &str) -> Self {
        self.push(ScriptedOutcome::Succeed(ProviderPayload::binary(
            bytes,
            content_type,
        )))
    }

    /// Append a failure to the script.
    pub fn then_fail(self, failure: ProviderErrorKind) -> Self {
        self.push(ScriptedOutcome::Fail(failure))
    }

    /// Sleep this long before answering, for deadline tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Override the quoted credit cost.
    pub fn with_quote(mut self, credits: u32) -> Self {
        self.quote = Some(credits);
        self
    }

    /// Number of `generate` calls observed so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(self, outcome: ScriptedOutcome) -> Self {
        self.script
            .lock()
            .expect("script lock poisoned")
            .queue
            .push_back(outcome);
        self
    }

    fn next_outcome(&self) -> ScriptedOutcome {
        let mut script = self.script.lock().expect("script lock poisoned");
        if let Some(next) = script.queue.pop_front() {
            script.last = Some(next.clone());
            next
        } else if let Some(last) = &script.last {
            last.clone()
        } else {
            ScriptedOutcome::Fail(ProviderErrorKind::Unknown("empty script".to_string()))
        }
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn kind(&self) -> ArtifactKind {
        self.kind
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn quote(&self, ctx: &SegmentContext) -> u32 {
        match self.quote {
            Some(credits) => credits,
            None => default_quote(self.kind, ctx),
        }
    }

    async fn generate(&self, _ctx: &SegmentContext, deadline: Instant) -> ProviderResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.next_outcome();
        let latency = self.latency;
        run_with_deadline("scripted", deadline, async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            match outcome {
                ScriptedOutcome::Succeed(payload) => Ok(payload),
                ScriptedOutcome::Fail(kind) => Err(ProviderError::new(kind)),
            }
        })
        .await
    }
}

fn default_quote(kind: ArtifactKind, ctx: &SegmentContext) -> u32 {
    use taleforge_core::{audio_credits, IMAGE_CREDITS, MIN_CHARGE_CREDITS, TEXT_CREDITS};
    match kind {
        ArtifactKind::Text => TEXT_CREDITS,
        ArtifactKind::Image => IMAGE_CREDITS,
        ArtifactKind::Audio => audio_credits(ctx.narration_words()),
        ArtifactKind::Video => MIN_CHARGE_CREDITS,
    }
}
