//! Unified Error Type System
//!
//! Centralized error types for configuration construction, argument parsing
//! and wallet validation.
//!
//! ## Design Principles
//!
//! - Single unified error type (ConfigError) for the entire crate
//! - Parser failures keep the parser's own exit status
//! - Merge and default-fill never produce errors; only construction,
//!   parsing, rendering and validation do

use thiserror::Error;

use crate::constants::cli::FAILURE_EXIT_CODE;

// =============================================================================
// Validation Error
// =============================================================================

/// Structured validation error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// What validation failed
    pub kind: ValidationErrorKind,
    /// Dotted path of the value that failed validation
    pub field: Option<String>,
    /// Detailed message
    pub message: String,
    /// Expected value or type
    pub expected: Option<String>,
    /// Actual value or type received
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "Validation failed for '{}': {}", field, self.message)?;
        } else {
            write!(f, "Validation failed: {}", self.message)?;
        }
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            write!(f, " (expected {}, got {})", expected, actual)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Create a new validation error
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Add field context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add expected/actual values
    pub fn with_comparison(
        mut self,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Create from simple message
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::General, message)
    }
}

/// Validation error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Required section or field missing
    MissingField,
    /// Value has the wrong type
    Type,
    /// General validation error
    General,
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Environment error: {0}")]
    Env(#[from] Box<figment::Error>),

    /// Argument parser failure, including unrecognized arguments in strict mode
    #[error(transparent)]
    Cli(#[from] clap::Error),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("{0}")]
    Validation(ValidationError),
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::Validation(err)
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Env(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl ConfigError {
    /// Create a validation error for a missing field
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::Validation(
            ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("'{}' is required", field),
            )
            .with_field(field),
        )
    }

    /// Create a validation error for a value of the wrong type
    pub fn wrong_type(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Validation(
            ValidationError::new(ValidationErrorKind::Type, "unexpected value type")
                .with_field(field)
                .with_comparison(expected, actual),
        )
    }

    /// Process exit status for this error.
    ///
    /// Parser errors keep the parser's status (2 for usage errors, 0 for
    /// `--help`/`--version`); everything else maps to 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Cli(err) => u8::try_from(err.exit_code()).unwrap_or(FAILURE_EXIT_CODE),
            _ => FAILURE_EXIT_CODE,
        }
    }

    /// Check if this error came from unrecognized command-line input
    pub fn is_unrecognized_argument(&self) -> bool {
        matches!(self, Self::Cli(err) if err.kind() == clap::error::ErrorKind::UnknownArgument)
    }
}

// =============================================================================
// Tests
// =============================================================================
