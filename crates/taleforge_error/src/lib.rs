//! Error types for the Tale Forge segment pipeline.
//!
//! This crate provides the foundation error types used throughout the Tale Forge
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use taleforge_error::{TaleForgeResult, LedgerError, LedgerErrorKind};
//!
//! fn reserve_credits() -> TaleForgeResult<()> {
//!     Err(LedgerError::new(LedgerErrorKind::InsufficientCredits {
//!         needed: 4,
//!         available: 1,
//!     }))?
//! }
//!
//! match reserve_credits() {
//!     Ok(()) => println!("Reserved"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod ledger;
mod pipeline;
mod provider;
mod segment;
mod storage;

pub use config::{ConfigError, ConfigErrorKind};
pub use error::{TaleForgeError, TaleForgeErrorKind, TaleForgeResult};
pub use ledger::{LedgerError, LedgerErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use provider::{ProviderError, ProviderErrorKind};
pub use segment::{SegmentError, SegmentErrorKind};
pub use storage::{StoreError, StoreErrorKind};
