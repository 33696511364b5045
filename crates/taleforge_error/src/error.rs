//! Top-level error wrapper types.

use crate::{ConfigError, LedgerError, PipelineError, ProviderError, SegmentError, StoreError};

/// Union of every domain error in the Tale Forge workspace.
///
/// # Examples
///
/// ```
/// use taleforge_error::{TaleForgeError, ConfigError};
///
/// let config_err = ConfigError::invalid("bad deadline");
/// let err: TaleForgeError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TaleForgeErrorKind {
    /// Credit ledger error
    #[from(LedgerError)]
    Ledger(LedgerError),
    /// Provider adapter error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Artifact store error
    #[from(StoreError)]
    Store(StoreError),
    /// Segment repository or state machine error
    #[from(SegmentError)]
    Segment(SegmentError),
    /// Pipeline request error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Tale Forge error with kind discrimination.
///
/// # Examples
///
/// ```
/// use taleforge_error::{TaleForgeResult, ConfigError};
///
/// fn might_fail() -> TaleForgeResult<()> {
///     Err(ConfigError::invalid("missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tale Forge Error: {}", _0)]
pub struct TaleForgeError(Box<TaleForgeErrorKind>);

impl TaleForgeError {
    /// Create a new error from a kind.
    pub fn new(kind: TaleForgeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TaleForgeErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to TaleForgeErrorKind
impl<T> From<T> for TaleForgeError
where
    T: Into<TaleForgeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Tale Forge operations.
pub type TaleForgeResult<T> = std::result::Result<T, TaleForgeError>;
