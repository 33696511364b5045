//! Generic REST provider adapter.
//!
//! Tale Forge's generation providers all expose the same surface shape: a
//! POST endpoint taking a JSON generation request and answering with either
//! the generated content (body plus `content-type`) or an error status. This
//! adapter covers that shape for every artifact kind; provider-specific
//! request fields ride in the prompt assembly.

use crate::{run_with_deadline, ProviderAdapter};
use serde::Serialize;
use taleforge_core::{
    audio_credits, ArtifactKind, ProviderPayload, ProviderResult, SegmentContext, IMAGE_CREDITS,
    MIN_CHARGE_CREDITS, TEXT_CREDITS,
};
use taleforge_error::{ProviderError, ProviderErrorKind};
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Configuration for one REST provider endpoint.
#[derive(Debug, Clone)]
pub struct RestProviderConfig {
    /// Artifact kind this endpoint produces
    pub kind: ArtifactKind,
    /// Provider name for logs
    pub name: String,
    /// Generation endpoint URL
    pub endpoint: String,
    /// Bearer token, if the provider requires one
    pub api_key: Option<String>,
    /// Adapter-reported credit cost; required for video, ignored otherwise
    pub reported_cost: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GenerationBody<'a> {
    segment_id: String,
    sequence: u32,
    age_group: &'a str,
    genre: &'a str,
    language: &'a str,
    characters: &'a [String],
    narrative_text: Option<&'a str>,
    prior_text: Option<&'a str>,
    include_narration: bool,
}

/// REST adapter over a single provider endpoint.
pub struct RestProviderAdapter {
    config: RestProviderConfig,
    client: reqwest::Client,
}

impl RestProviderAdapter {
    /// Create an adapter from endpoint configuration.
    pub fn new(config: RestProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn body<'a>(&self, ctx: &'a SegmentContext) -> GenerationBody<'a> {
        GenerationBody {
            segment_id: ctx.segment_id.to_string(),
            sequence: ctx.sequence,
            age_group: &ctx.story.age_group,
            genre: &ctx.story.genre,
            language: &ctx.story.language,
            characters: &ctx.story.characters,
            narrative_text: ctx.narrative_text.as_deref(),
            prior_text: ctx.prior_text.as_deref(),
            include_narration: ctx.include_narration,
        }
    }

    /// Classify a transport-level failure.
    fn classify_transport(err: reqwest::Error) -> ProviderError {
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout(err.to_string())
        } else if err.is_connect() {
            ProviderErrorKind::Unavailable(err.to_string())
        } else {
            ProviderErrorKind::Unknown(err.to_string())
        };
        ProviderError::new(kind)
    }

    async fn call(&self, ctx: &SegmentContext) -> ProviderResult {
        let mut request = self.client.post(&self.config.endpoint).json(&self.body(ctx));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(Self::classify_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000);
            let body = response.text().await.unwrap_or_default();
            let detail = format!("{} ({})", body.trim(), status);
            return Err(ProviderError::new(Self::classify_status(
                status,
                retry_after_ms,
                detail,
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        debug!(kind = %self.config.kind, content_type = %content_type, "Provider responded");

        if self.config.kind == ArtifactKind::Text {
            let text = response.text().await.map_err(Self::classify_transport)?;
            Ok(ProviderPayload::text(text))
        } else {
            let bytes = response.bytes().await.map_err(Self::classify_transport)?;
            Ok(ProviderPayload::binary(bytes.to_vec(), content_type))
        }
    }

    /// Classify an HTTP error status, carrying the provider's backoff hint
    /// for rate limits.
    fn classify_status(
        status: reqwest::StatusCode,
        retry_after_ms: Option<u64>,
        detail: String,
    ) -> ProviderErrorKind {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            ProviderErrorKind::RateLimited {
                message: detail,
                retry_after_ms,
            }
        } else if status == reqwest::StatusCode::REQUEST_TIMEOUT
            || status == reqwest::StatusCode::GATEWAY_TIMEOUT
        {
            ProviderErrorKind::Timeout(detail)
        } else if status.is_client_error() {
            // Content filters and malformed prompts; retrying the same
            // input cannot succeed.
            ProviderErrorKind::InvalidInput(detail)
        } else if status.is_server_error() {
            ProviderErrorKind::Unavailable(detail)
        } else {
            ProviderErrorKind::Unknown(detail)
        }
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for RestProviderAdapter {
    fn kind(&self) -> ArtifactKind {
        self.config.kind
    }

    fn provider_name(&self) -> &str {
        &self.config.name
    }

    fn quote(&self, ctx: &SegmentContext) -> u32 {
        match self.config.kind {
            ArtifactKind::Text => TEXT_CREDITS,
            ArtifactKind::Image => IMAGE_CREDITS,
            ArtifactKind::Audio => audio_credits(ctx.narration_words()),
            // Video is priced by the provider, floored at the minimum charge.
            ArtifactKind::Video => self
                .config
                .reported_cost
                .unwrap_or(MIN_CHARGE_CREDITS)
                .max(MIN_CHARGE_CREDITS),
        }
    }

    #[instrument(skip(self, ctx), fields(kind = %self.config.kind, provider = %self.config.name))]
    async fn generate(&self, ctx: &SegmentContext, deadline: Instant) -> ProviderResult {
        run_with_deadline(&self.config.name, deadline, self.call(ctx)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn classify(status: u16) -> ProviderErrorKind {
        RestProviderAdapter::classify_status(
            StatusCode::from_u16(status).unwrap(),
            None,
            "detail".to_string(),
        )
    }

    #[test]
    fn rate_limit_carries_retry_after_hint() {
        let kind = RestProviderAdapter::classify_status(
            StatusCode::TOO_MANY_REQUESTS,
            Some(2_000),
            "slow down".to_string(),
        );
        assert_eq!(kind.retry_after_ms(), Some(2_000));
        assert!(kind.is_retryable());
    }

    #[test]
    fn timeout_statuses_classify_as_timeout() {
        assert!(matches!(classify(408), ProviderErrorKind::Timeout(_)));
        assert!(matches!(classify(504), ProviderErrorKind::Timeout(_)));
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let kind = classify(400);
        assert!(matches!(kind, ProviderErrorKind::InvalidInput(_)));
        assert!(!kind.is_retryable());
    }

    #[test]
    fn server_errors_are_retryable_outages() {
        let kind = classify(503);
        assert!(matches!(kind, ProviderErrorKind::Unavailable(_)));
        assert!(kind.is_retryable());
    }

    #[test]
    fn video_quote_floors_at_minimum_charge() {
        let adapter = RestProviderAdapter::new(RestProviderConfig {
            kind: ArtifactKind::Video,
            name: "renderfarm".to_string(),
            endpoint: "http://localhost/generate".to_string(),
            api_key: None,
            reported_cost: Some(0),
        });
        let ctx = SegmentContext {
            segment_id: taleforge_core::SegmentId::generate(),
            story_id: taleforge_core::StoryId::generate(),
            sequence: 1,
            narrative_text: Some("text".to_string()),
            prior_text: None,
            story: Default::default(),
            include_narration: false,
        };
        assert_eq!(adapter.quote(&ctx), MIN_CHARGE_CREDITS);
    }
}
