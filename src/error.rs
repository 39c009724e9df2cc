//! # Error Handling
//!
//! Error types for the study assistant library.
//!
//! ## Architecture
//!
//! - **StudyError**: one variant per failure family, each carrying an [`ErrorContext`]
//! - **ErrorContext**: operation, recovery suggestion, severity and free-form metadata
//! - **Classification**: [`classify`] helpers deciding how a failure is surfaced
//!
//! ## Taxonomy
//!
//! | Family | Variants | Surfaced as |
//! |--------|----------|-------------|
//! | Device / permission | `Device` | immediate alert, operation aborted |
//! | Transport | `Network`, `Server` | alert with the best-effort server message |
//! | Response | `Decode` | alert; the raw body never reaches the renderer |
//! | Local | `Config`, `Validation`, `State`, `Io`, `Storage`, `Processing` | error return |
//!
//! Nothing in the library retries on its own. Every failure ends the attempt and the
//! caller decides whether to re-initiate it.
//!
//! ## Usage
//!
//! ```rust
//! use symbiotic_study::error::{StudyError, HasRecoverySuggestion};
//!
//! let error = StudyError::device("camera permission denied", true)
//!     .with_operation("acquire_stream")
//!     .with_recovery_suggestion("Allow camera access and try again");
//!
//! assert_eq!(error.category(), "device");
//! assert!(error.recovery_suggestion().is_some());
//! ```

use std::collections::HashMap;
use std::time::SystemTime;

use study_scale::OptimizeError;

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational errors
    Info,
    /// Warnings that may indicate potential issues
    Warning,
    /// Errors that end the current attempt
    Error,
    /// Errors the user cannot fix without changing configuration
    Fatal,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Additional metadata as key-value pairs
    pub metadata: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
            metadata: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operation that was being performed
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Set recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity level
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }
}

/// Base error type for the study assistant library
#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    /// Configuration validation errors
    #[error("Configuration error in '{field}': {reason} (value: {value})")]
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// Camera missing, busy or denied
    #[error("Camera unavailable: {reason}")]
    Device {
        reason: String,
        denied: bool,
        context: ErrorContext,
    },
    /// Image processing errors (crop, encode, optimize)
    #[error("Processing error in {operation}: {reason}")]
    Processing {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// The proxy could not be reached or the request timed out
    #[error("Network error during {operation}: {reason}")]
    Network {
        operation: String,
        reason: String,
        timed_out: bool,
        context: ErrorContext,
    },
    /// The proxy answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Server {
        status: u16,
        message: String,
        context: ErrorContext,
    },
    /// A payload could not be decoded
    #[error("Could not decode {what}: {reason}")]
    Decode {
        what: String,
        reason: String,
        context: ErrorContext,
    },
    /// Invalid state transitions
    #[error("Cannot {attempted_operation} while {current_state}")]
    State {
        current_state: String,
        attempted_operation: String,
        context: ErrorContext,
    },
    /// Input validation errors
    #[error("Validation failed for '{field}': {constraint}")]
    Validation {
        field: String,
        constraint: String,
        context: ErrorContext,
    },
    /// I/O errors
    #[error("I/O error during {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
        context: ErrorContext,
    },
    /// Persistence backend errors
    #[error("Storage error for slot '{slot}': {reason}")]
    Storage {
        slot: String,
        reason: String,
        context: ErrorContext,
    },
}

impl StudyError {
    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Fatal),
        }
    }

    /// Create a device error. `denied` distinguishes a refused permission from a missing camera.
    pub fn device(reason: impl Into<String>, denied: bool) -> Self {
        Self::Device {
            reason: reason.into(),
            denied,
            context: ErrorContext::new(),
        }
    }

    /// Create a processing error
    pub fn processing(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Processing {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a network error
    pub fn network(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            operation: operation.into(),
            reason: reason.into(),
            timed_out: false,
            context: ErrorContext::new(),
        }
    }

    /// Create a network error for a request that ran out of time
    pub fn timeout(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            operation: operation.into(),
            reason: reason.into(),
            timed_out: true,
            context: ErrorContext::new(),
        }
    }

    /// Create a server error
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a decode error
    pub fn decode(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            what: what.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a state error
    pub fn state(current_state: impl Into<String>, attempted_operation: impl Into<String>) -> Self {
        Self::State {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create a storage error
    pub fn storage(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Storage {
            slot: slot.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Config { context, .. }
            | Self::Device { context, .. }
            | Self::Processing { context, .. }
            | Self::Network { context, .. }
            | Self::Server { context, .. }
            | Self::Decode { context, .. }
            | Self::State { context, .. }
            | Self::Validation { context, .. }
            | Self::Io { context, .. }
            | Self::Storage { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Config { context, .. }
            | Self::Device { context, .. }
            | Self::Processing { context, .. }
            | Self::Network { context, .. }
            | Self::Server { context, .. }
            | Self::Decode { context, .. }
            | Self::State { context, .. }
            | Self::Validation { context, .. }
            | Self::Io { context, .. }
            | Self::Storage { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Device { .. } => "device",
            Self::Processing { .. } => "processing",
            Self::Network { .. } => "network",
            Self::Server { .. } => "server",
            Self::Decode { .. } => "decode",
            Self::State { .. } => "state",
            Self::Validation { .. } => "validation",
            Self::Io { .. } => "io",
            Self::Storage { .. } => "storage",
        }
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for StudyError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for StudyError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

/// Error classification utilities
pub mod classify {
    use super::*;

    /// Errors shown to the user as a blocking alert rather than only logged.
    pub fn is_user_facing(error: &StudyError) -> bool {
        matches!(
            error,
            StudyError::Device { .. }
                | StudyError::Network { .. }
                | StudyError::Server { .. }
                | StudyError::Decode { .. }
        )
    }

    /// Errors that will fail again until the configuration changes
    pub fn is_fatal(error: &StudyError) -> bool {
        matches!(error, StudyError::Config { .. })
            || matches!(error, StudyError::Device { denied: true, .. })
            || error.severity() == ErrorSeverity::Fatal
    }

    /// Transport failures the user may simply re-submit after.
    pub fn is_transient(error: &StudyError) -> bool {
        match error {
            StudyError::Network { .. } => true,
            StudyError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<std::io::Error> for StudyError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<serde_json::Error> for StudyError {
    fn from(error: serde_json::Error) -> Self {
        Self::decode("json", error.to_string())
    }
}

impl From<OptimizeError> for StudyError {
    fn from(error: OptimizeError) -> Self {
        match error {
            OptimizeError::Decode(_) | OptimizeError::DataUrl(_) => {
                Self::decode("image", error.to_string())
            }
            OptimizeError::InvalidConfig(reason) => Self::config("optimize", "", reason),
            other => Self::processing("optimize", other.to_string()),
        }
    }
}

/// Result type alias for study operations
pub type StudyResult<T> = Result<T, StudyError>;
