//! Engine error types.

use thiserror::Error;

use super::TxnId;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine is closed; data operations require an open engine.
    #[error("engine is closed")]
    Closed,

    /// Optimistic-concurrency rejection: a concurrent transaction touched an
    /// overlapping key range first.
    #[error("transaction rejected by a concurrent commit")]
    Conflict,

    /// The named keyspace has not been registered.
    #[error("keyspace not found: {0}")]
    KeyspaceNotFound(String),

    /// The transaction handle is not live.
    #[error("unknown transaction handle: {0}")]
    UnknownTxn(TxnId),

    /// An invalid configuration path or value.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error surfaced by the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
