//! Error types for the passcode lock

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for lock operations
pub type Result<T> = std::result::Result<T, LockError>;

/// Errors that can occur while driving a passcode lock
///
/// A wrong passcode is not an error: it is reported to the observer as a
/// failure event. Only configuration mistakes and collaborator failures end up
/// here.
#[derive(Debug, Error)]
pub enum LockError {
    /// An enter or change state was reached with nothing stored
    #[error("No passcode stored - set a passcode before entering or changing it")]
    PasscodeNotSet,

    /// Entry is paused after too many wrong passcodes
    #[error("Passcode entry locked for {remaining_secs} seconds")]
    LockedOut { remaining_secs: u64 },

    /// Persistence failure
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Input outside the sign alphabet
    #[error("Sign error: {0}")]
    Sign(#[from] SignError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by passcode repositories
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The stored document does not hold a valid passcode
    #[error("Stored passcode is corrupt: {0}")]
    Corrupt(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Serialization(e.to_string())
    }
}

/// Errors raised when building signs and passcodes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    #[error("'{0}' is not a passcode sign (expected 0-9)")]
    InvalidSign(char),

    #[error("{0} is not a passcode digit (expected 0-9)")]
    InvalidDigit(u8),

    #[error("Passcode is empty")]
    Empty,
}
