// Error types for CacheKit
//
// This module defines the error types used throughout the cache.

use thiserror::Error;

/// Result type alias for CacheKit operations
pub type Result<T> = std::result::Result<T, Error>;

/// GitHub issue URL for error reporting
const GITHUB_ISSUES_URL: &str = "https://github.com/cachekit-rs/cachekit/issues";

/// Error types that can occur in CacheKit operations
#[derive(Error, Debug)]
pub enum Error {
    /// A constructor or setter was called with a value that violates a
    /// precondition (zero capacity, a null policy, a non-positive TTL, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was invoked in a state that should be unreachable
    /// through the public API (`select_victim` on an empty policy).
    #[error(
        "Illegal state: {0}\n\nThis is likely a bug. Please report it at: {GITHUB_ISSUES_URL}"
    )]
    IllegalState(String),

    /// A shard index or similar bounded value fell outside its valid range.
    #[error("Out of range: {0}")]
    OutOfRange(String),
}

impl Error {
    /// Get the GitHub issues URL for error reporting
    pub fn issues_url() -> &'static str {
        GITHUB_ISSUES_URL
    }

    /// Check if this error should be reported to GitHub
    ///
    /// `InvalidArgument` and `OutOfRange` are caller mistakes the caller can
    /// fix; `IllegalState` indicates a contract the core failed to uphold.
    pub fn should_report(&self) -> bool {
        matches!(self, Error::IllegalState(_))
    }

    /// Get a user-friendly error message with reporting instructions
    pub fn user_message(&self) -> String {
        if self.should_report() {
            format!("{self}\n\nNeed help? Visit our GitHub issues: {GITHUB_ISSUES_URL}")
        } else {
            self.to_string()
        }
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn illegal_state(msg: impl Into<String>) -> Self {
        Error::IllegalState(msg.into())
    }

    pub(crate) fn out_of_range(msg: impl Into<String>) -> Self {
        Error::OutOfRange(msg.into())
    }
}
