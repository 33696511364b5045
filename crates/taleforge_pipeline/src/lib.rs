//! Pipeline orchestrator for the Tale Forge segment pipeline.
//!
//! The orchestrator is the entry point invoked per segment-generation
//! request. It sequences the credit ledger, provider adapters, artifact
//! store, and segment state machine: reserve credits, call the provider
//! under a deadline, persist the artifact, commit or release the hold, and
//! aggregate a per-kind result. Text generation runs first when requested;
//! the remaining kinds fan out concurrently under a bounded limit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod config;
mod orchestrator;

pub use cancel::CancelFlag;
pub use config::PipelineConfig;
pub use orchestrator::PipelineOrchestrator;
