//! Errors raised while configuring or feeding the merging and alignment engines.
//!
//! Both variants are detected up front (when a tolerance, policy or spectrum is
//! constructed), never halfway through a merge. Empty inputs are not errors.

/// Errors that can occur while setting up a merge or an alignment
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeError {
    /// Malformed tolerance window or aggregation/weighting policy
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Caller-side contract broken, e.g. parallel arrays of different length
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
}

/// Convenience alias for results carrying a [`MergeError`]
pub type Result<T> = std::result::Result<T, MergeError>;
