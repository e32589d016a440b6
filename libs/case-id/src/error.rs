//! Error types for case ID parsing.

use thiserror::Error;

/// Errors that can occur when parsing a lost case ID.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaseIdError {
    /// The input was empty after trimming.
    #[error("case ID cannot be empty")]
    Empty,

    /// The input does not start with `LOST-`.
    #[error("case ID missing prefix: expected '{expected}', got '{actual}'")]
    MissingPrefix {
        expected: &'static str,
        actual: String,
    },

    /// The code portion has the wrong number of symbols.
    #[error("case ID code must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The code portion contains a symbol outside the alphabet.
    #[error("invalid character '{0}' in case ID")]
    InvalidCharacter(char),
}
