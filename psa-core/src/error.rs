//! Error taxonomy shared by every core module.
//!
//! The engine never panics on malformed input or a misused API; every fallible
//! operation returns a [`PsaError`]. Variants follow the taxonomy of the
//! configuration/range/concurrency failures a caller can actually hit.

use thiserror::Error;

/// Errors produced by the scheduling core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PsaError {
    /// Malformed configuration: non-positive counts, an empty duration range,
    /// mismatched lengths, or an out-of-range probability.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `run()` was called before all required collaborators were set.
    #[error("not initialized: {0}")]
    NotInitialized(String),

    /// A job or processor index fell outside its valid domain.
    #[error("index out of range: {0}")]
    OutOfRange(String),

    /// Internal inconsistency, e.g. a job with no processor. Indicates a bug.
    #[error("internal invariant violated: {0}")]
    Invariant(String),

    /// `stop()` was requested; the caller gets the best-so-far result rather
    /// than a hard failure, but the reason is recorded for diagnostics.
    #[error("cancelled: {0}")]
    Cancelled(String),
}

pub type PsaResult<T> = Result<T, PsaError>;
