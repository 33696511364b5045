//! Segment state machine and repository for the Tale Forge pipeline.
//!
//! Owns the lifecycle of one segment's generation attempt: which per-kind
//! transitions are legal, how outcomes are recorded on the row, how
//! concurrent orchestrator instances are kept from losing updates
//! (optimistic concurrency), and how conflicting requests for the same
//! (segment, kind) are rejected (the in-flight registry).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod inflight;
mod machine;
mod memory;
mod repository;

pub use inflight::{InFlightPermit, InFlightRegistry};
pub use machine::{begin_attempt, record_failure, record_success};
pub use memory::InMemorySegmentRepository;
pub use repository::SegmentRepository;
