//! Core data types for the Tale Forge segment pipeline.
//!
//! This crate provides the foundation data types shared across the pipeline:
//! artifact kinds, story segments, generation requests and results, the fixed
//! pricing policy, and telemetry initialization.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod context;
mod ids;
mod payload;
mod pricing;
mod request;
mod result;
mod segment;
mod telemetry;

pub use artifact::ArtifactKind;
pub use context::{SegmentContext, StoryProfile};
pub use ids::{RequestId, ReservationId, SegmentId, StoryId, UserId};
pub use payload::{PayloadBody, ProviderPayload, ProviderResult};
pub use pricing::{audio_credits, base_credits, AUDIO_BASE_CREDITS, AUDIO_WORDS_PER_CREDIT, IMAGE_CREDITS, MIN_CHARGE_CREDITS, TEXT_CREDITS};
pub use request::GenerationRequest;
pub use result::{ArtifactOutcome, FailureKind, SegmentResult, SkipReason};
pub use segment::{ArtifactState, LastError, SegmentStatus, StorySegment};
pub use telemetry::init_telemetry;
