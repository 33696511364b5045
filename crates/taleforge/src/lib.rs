//! Tale Forge - Multi-Modal Story Segment Generation
//!
//! Tale Forge generates children's story segments as coordinated bundles of
//! artifacts: narrative text, an illustration, a narration track, and
//! optionally a short video. Each artifact is paid for in credits through a
//! reserve/commit/release ledger, generated by a pluggable provider adapter
//! under a deadline with classified failures, persisted to
//! content-addressable storage, and recorded on the segment row.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use taleforge::{ArtifactKind, GenerationRequest, StoryId, StoryProfile, TaleForge, UserId};
//! use taleforge_providers::AdapterRegistry;
//!
//! #[tokio::main]
//! async fn main() -> taleforge::TaleForgeResult<()> {
//!     let forge = TaleForge::builder()
//!         .storage_root("/var/lib/taleforge")
//!         .adapters(AdapterRegistry::new() /* .with(...) per kind */)
//!         .build()?;
//!
//!     let user = UserId::generate();
//!     forge.grant_credits(user, 20).await?;
//!     let segment = forge.append_segment(StoryId::generate()).await?;
//!
//!     let request = GenerationRequest::new(
//!         segment.id,
//!         user,
//!         [ArtifactKind::Text, ArtifactKind::Image, ArtifactKind::Audio],
//!     );
//!     let result = forge.generate(&request, &StoryProfile::default()).await?;
//!     println!("status: {}, charged: {}", result.status, result.credits_charged);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Tale Forge is organized as a workspace with focused crates:
//!
//! - `taleforge_core` - Shared data types, pricing policy, telemetry
//! - `taleforge_error` - Error types with kind discrimination
//! - `taleforge_ledger` - Credit ledger with reserve/commit/release
//! - `taleforge_storage` - Content-addressable artifact storage
//! - `taleforge_providers` - Provider adapter trait and implementations
//! - `taleforge_segments` - Segment repository and state machine
//! - `taleforge_pipeline` - The per-request orchestrator
//!
//! This crate (`taleforge`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod forge;

pub use forge::{TaleForge, TaleForgeBuilder};

pub use taleforge_core::*;
pub use taleforge_error::*;
pub use taleforge_ledger::{
    ChargeState, CreditCharge, CreditLedger, InMemoryCreditLedger, ReservationSweeper,
};
pub use taleforge_pipeline::{CancelFlag, PipelineConfig, PipelineOrchestrator};
pub use taleforge_providers::{
    AdapterRegistry, ProviderAdapter, RestProviderAdapter, RestProviderConfig, ScriptedAdapter,
};
pub use taleforge_segments::{InMemorySegmentRepository, SegmentRepository};
pub use taleforge_storage::{ArtifactReference, ArtifactStore, FileSystemArtifactStore};
