//! Error types for the bmi_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for bmi_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any calculation or write took place
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Text that is not a decimal number
    #[error("Invalid decimal: {0}")]
    Decimal(#[from] rust_decimal::Error),

    /// A stored line could not be decoded
    #[error("Corrupt calculation log at line {line}: {reason}")]
    CorruptLog { line: usize, reason: String },

    /// An exported CSV row could not be read back
    #[error("Malformed export: {0}")]
    MalformedExport(String),

    /// A value violates a column constraint of the calculation table
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl Error {
    /// True when the caller supplied bad input, as opposed to a storage failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
