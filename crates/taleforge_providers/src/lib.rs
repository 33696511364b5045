//! Provider adapters for the Tale Forge segment pipeline.
//!
//! Each artifact kind (text, image, audio, video) is generated by an
//! external provider behind the uniform [`ProviderAdapter`] interface:
//! submit a request, await the result or a deadline, and normalize every
//! failure into the shared classification. Adapters never retry; retry
//! policy lives in the orchestrator so credit accounting and attempt caps
//! stay centralized.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod deadline;
mod rest;
mod scripted;

pub use adapter::{AdapterRegistry, ProviderAdapter};
pub use deadline::run_with_deadline;
pub use rest::{RestProviderAdapter, RestProviderConfig};
pub use scripted::{ScriptedAdapter, ScriptedOutcome};
