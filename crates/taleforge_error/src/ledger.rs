//! Credit ledger error types.

/// Kinds of credit ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum LedgerErrorKind {
    /// The user's available balance cannot cover the requested reservation
    #[display("Insufficient credits: need {}, have {}", needed, available)]
    InsufficientCredits {
        /// Credits required for the reservation
        needed: u32,
        /// Credits currently available
        available: u32,
    },
    /// Commit or release referenced a reservation that does not exist or was
    /// already finalized
    #[display("Unknown or finalized reservation: {}", _0)]
    UnknownReservation(String),
    /// The ledger has no account for the given user
    #[display("Unknown account: {}", _0)]
    UnknownAccount(String),
}

/// Credit ledger error with location tracking.
///
/// # Examples
///
/// ```
/// use taleforge_error::{LedgerError, LedgerErrorKind};
///
/// let err = LedgerError::new(LedgerErrorKind::UnknownReservation("r-123".to_string()));
/// assert!(format!("{}", err).contains("r-123"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ledger Error: {} at line {} in {}", kind, line, file)]
pub struct LedgerError {
    /// The kind of error that occurred
    pub kind: LedgerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl LedgerError {
    /// Create a new ledger error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LedgerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error indicates the user must top up before retrying.
    pub fn is_insufficient_credits(&self) -> bool {
        matches!(self.kind, LedgerErrorKind::InsufficientCredits { .. })
    }
}
