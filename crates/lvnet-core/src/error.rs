//! Unified error type for lvnet operations
//!
//! [`LvnetError`] covers everything that can go wrong *around* a verification
//! run: reading tables, parsing configuration, writing reports. Circuit
//! violations are not errors; they are reported through
//! [`crate::VerificationResult`].
//!
//! # Example
//!
//! ```
//! use lvnet_core::{LvnetError, PhaseCode};
//!
//! let err = "D".parse::<PhaseCode>().unwrap_err();
//! assert!(matches!(err, LvnetError::Parse(_)));
//! ```

use thiserror::Error;

/// Unified error type for all lvnet operations.
#[derive(Error, Debug)]
pub enum LvnetError {
    /// I/O errors (file access, report writing)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Table or configuration parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data shape errors (missing columns, empty transformer table)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using LvnetError.
pub type LvnetResult<T> = Result<T, LvnetError>;
