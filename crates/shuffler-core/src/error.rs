//! Engine error types.

use thiserror::Error;

/// Top-level error type for the selection engine and its hosts.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An operation was invoked while the engine was in the wrong status.
    /// Only produced under the strict guard policy.
    #[error("{operation} is not allowed while the engine is {status}")]
    PreconditionViolated {
        /// The operation that was attempted.
        operation: &'static str,
        /// The status the engine was in.
        status: &'static str,
    },

    /// A pick was requested on an empty pool.
    #[error("cannot pick prizes from an empty pool")]
    EmptyPool,

    /// The engine configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The results sink failed to persist a draw.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A host-side failure unrelated to engine logic.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
