//! Pipeline configuration.
//!
//! Deadlines, attempt caps, backoff shape, and concurrency limits are
//! configurable; the credit pricing table is fixed policy and lives in
//! `taleforge_core::pricing`. Configuration loads from TOML files with
//! `TALEFORGE_*` environment variables taking precedence.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use taleforge_core::ArtifactKind;
use taleforge_error::{ConfigError, TaleForgeResult};
use tracing::{debug, instrument};

/// Tunable parameters of the orchestrator.
///
/// # Examples
///
/// ```
/// use taleforge_core::ArtifactKind;
/// use taleforge_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.deadline(ArtifactKind::Text).as_secs(), 30);
/// assert_eq!(config.attempts(ArtifactKind::Image), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Deadline for one text generation attempt, seconds
    #[serde(default = "default_text_deadline_secs")]
    pub text_deadline_secs: u64,
    /// Deadline for one image generation attempt, seconds
    #[serde(default = "default_image_deadline_secs")]
    pub image_deadline_secs: u64,
    /// Deadline for one audio generation attempt, seconds
    #[serde(default = "default_audio_deadline_secs")]
    pub audio_deadline_secs: u64,
    /// Deadline for one video generation attempt, seconds; the longest class
    #[serde(default = "default_video_deadline_secs")]
    pub video_deadline_secs: u64,

    /// Total provider calls allowed for text (critical, gets an extra retry)
    #[serde(default = "default_text_attempts")]
    pub text_attempts: u32,
    /// Total provider calls allowed for image
    #[serde(default = "default_other_attempts")]
    pub image_attempts: u32,
    /// Total provider calls allowed for audio
    #[serde(default = "default_other_attempts")]
    pub audio_attempts: u32,
    /// Total provider calls allowed for video
    #[serde(default = "default_other_attempts")]
    pub video_attempts: u32,

    /// Base delay of the exponential backoff, milliseconds
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Maximum backoff delay, milliseconds
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    /// Concurrent provider calls allowed within one request
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_artifacts: usize,

    /// Attempts allowed for persisting one artifact to storage
    #[serde(default = "default_storage_attempts")]
    pub storage_write_attempts: u32,

    /// Age after which an unfinalized reservation is considered abandoned
    #[serde(default = "default_reservation_timeout_secs")]
    pub reservation_timeout_secs: u64,

    /// Whether video generation requires a narration track as input
    #[serde(default)]
    pub video_requires_narration: bool,
}

fn default_text_deadline_secs() -> u64 {
    30
}
fn default_image_deadline_secs() -> u64 {
    60
}
fn default_audio_deadline_secs() -> u64 {
    90
}
fn default_video_deadline_secs() -> u64 {
    120
}
fn default_text_attempts() -> u32 {
    3
}
fn default_other_attempts() -> u32 {
    2
}
fn default_backoff_base_ms() -> u64 {
    200
}
fn default_backoff_max_ms() -> u64 {
    5_000
}
fn default_max_concurrent() -> usize {
    3
}
fn default_storage_attempts() -> u32 {
    2
}
fn default_reservation_timeout_secs() -> u64 {
    600
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_deadline_secs: default_text_deadline_secs(),
            image_deadline_secs: default_image_deadline_secs(),
            audio_deadline_secs: default_audio_deadline_secs(),
            video_deadline_secs: default_video_deadline_secs(),
            text_attempts: default_text_attempts(),
            image_attempts: default_other_attempts(),
            audio_attempts: default_other_attempts(),
            video_attempts: default_other_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            max_concurrent_artifacts: default_max_concurrent(),
            storage_write_attempts: default_storage_attempts(),
            reservation_timeout_secs: default_reservation_timeout_secs(),
            video_requires_narration: false,
        }
    }
}

impl PipelineConfig {
    /// Per-attempt deadline for a kind.
    pub fn deadline(&self, kind: ArtifactKind) -> Duration {
        let secs = match kind {
            ArtifactKind::Text => self.text_deadline_secs,
            ArtifactKind::Image => self.image_deadline_secs,
            ArtifactKind::Audio => self.audio_deadline_secs,
            ArtifactKind::Video => self.video_deadline_secs,
        };
        Duration::from_secs(secs)
    }

    /// Total provider calls allowed for a kind.
    pub fn attempts(&self, kind: ArtifactKind) -> u32 {
        match kind {
            ArtifactKind::Text => self.text_attempts,
            ArtifactKind::Image => self.image_attempts,
            ArtifactKind::Audio => self.audio_attempts,
            ArtifactKind::Video => self.video_attempts,
        }
    }

    /// Reservation timeout as a duration, for the sweeper.
    pub fn reservation_timeout(&self) -> Duration {
        Duration::from_secs(self.reservation_timeout_secs)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> TaleForgeResult<Self> {
        debug!("Loading pipeline configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("TALEFORGE"))
            .build()
            .map_err(|e| ConfigError::load(format!("{}: {}", path.as_ref().display(), e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the environment only, falling back to
    /// defaults for anything unset.
    #[instrument]
    pub fn load() -> TaleForgeResult<Self> {
        // Local development convenience; absent .env files are fine.
        let _ = dotenvy::dotenv();

        let config: Self = Config::builder()
            .add_source(Environment::with_prefix("TALEFORGE"))
            .build()
            .map_err(|e| ConfigError::load(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if any attempt cap or limit is zero, or the backoff
    /// cap is below its base.
    pub fn validate(&self) -> TaleForgeResult<()> {
        for (label, attempts) in [
            ("text_attempts", self.text_attempts),
            ("image_attempts", self.image_attempts),
            ("audio_attempts", self.audio_attempts),
            ("video_attempts", self.video_attempts),
            ("storage_write_attempts", self.storage_write_attempts),
        ] {
            if attempts == 0 {
                return Err(ConfigError::invalid(format!("{label} must be at least 1")))?;
            }
        }
        if self.max_concurrent_artifacts == 0 {
            return Err(ConfigError::invalid("max_concurrent_artifacts must be at least 1"))?;
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            return Err(ConfigError::invalid(format!(
                "backoff_max_ms ({}) must be >= backoff_base_ms ({})",
                self.backoff_max_ms, self.backoff_base_ms
            )))?;
        }
        Ok(())
    }
}
