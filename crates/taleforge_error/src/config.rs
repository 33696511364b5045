//! Configuration error types.

/// Kinds of configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A configuration source could not be read
    #[display("Failed to load configuration: {}", _0)]
    Load(String),
    /// A configuration source was read but could not be deserialized
    #[display("Failed to parse configuration: {}", _0)]
    Parse(String),
    /// A field or combination of fields failed validation
    #[display("Invalid configuration: {}", _0)]
    Invalid(String),
}

/// Configuration error with location tracking.
///
/// # Examples
///
/// ```
/// use taleforge_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::invalid("text_attempts must be at least 1");
/// assert!(matches!(err.kind, ConfigErrorKind::Invalid(_)));
/// assert!(format!("{}", err).contains("text_attempts"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// A source that could not be read.
    #[track_caller]
    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Load(message.into()))
    }

    /// A source that could not be deserialized.
    #[track_caller]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Parse(message.into()))
    }

    /// A value that failed validation.
    #[track_caller]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Invalid(message.into()))
    }
}
