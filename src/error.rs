//! Error types for memoized calls
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Memo Error Enum ==
/// Unified error type returned by a memoized call.
///
/// Nothing is cached when a call fails, so repeating the call retries it.
#[derive(Error, Debug)]
pub enum MemoError {
    /// Default key derivation could not serialize the arguments
    #[error("Failed to derive cache key: {0}")]
    KeySerialization(#[from] serde_json::Error),

    /// Custom key function failed
    #[error("Cache key function failed: {0}")]
    KeyFunction(#[source] anyhow::Error),

    /// Wrapped function failed
    #[error("Memoized function failed: {0}")]
    Function(#[source] anyhow::Error),
}

impl MemoError {
    /// Returns the wrapped function's own error, if that is what failed.
    pub fn function_error(&self) -> Option<&anyhow::Error> {
        match self {
            MemoError::Function(err) => Some(err),
            _ => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for memoized calls.
pub type Result<T> = std::result::Result<T, MemoError>;
