//! Artifact storage for the Tale Forge segment pipeline.
//!
//! Generated artifacts (text, images, audio, video) are persisted to durable
//! storage; the pipeline writes the resulting stable reference into the
//! segment row. Backends are pluggable behind the [`ArtifactStore`] trait;
//! this crate ships a content-addressable filesystem backend.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod reference;
mod store;

pub use filesystem::FileSystemArtifactStore;
pub use reference::ArtifactReference;
pub use store::ArtifactStore;
