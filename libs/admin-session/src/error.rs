use thiserror::Error;

/// Configuration errors raised when building an authenticator.
///
/// Per-request verification never returns these; a bad token simply
/// verifies as `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No signing secret was configured.
    #[error("missing admin session signing secret ({0})")]
    MissingSecret(&'static str),

    /// The secret could not be used as an HMAC key.
    #[error("invalid admin session signing secret")]
    InvalidSecret,
}
