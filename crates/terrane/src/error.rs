//! Client-layer error types.

use terrane_core::CoreError;
use terrane_storage::EngineError;
use thiserror::Error;

/// Result alias for client-layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the client layer.
#[derive(Debug, Error)]
pub enum Error {
    /// A row's component count does not match the schema's arity.
    #[error("{what} shape mismatch: expected {expected} components, got {got}")]
    Shape {
        /// Which side of the pair was malformed ("key" or "value").
        what: &'static str,
        /// The arity the schema requires.
        expected: usize,
        /// The arity the caller supplied.
        got: usize,
    },

    /// A component's type or magnitude does not fit its field.
    #[error("domain error: {0}")]
    Domain(String),

    /// A strict point lookup found no row.
    #[error("key not found")]
    NotFound,

    /// Stored bytes could not be decoded against the schema.
    #[error("decode error: {0}")]
    Decode(String),

    /// The transaction lost an optimistic-concurrency race at commit.
    #[error("transaction rejected by a concurrent commit")]
    Conflict,

    /// An environment lifecycle, registry, or configuration violation.
    #[error("configuration error: {0}")]
    Config(String),

    /// An engine failure with no more specific client-layer meaning.
    #[error(transparent)]
    Engine(EngineError),
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Shape { what, expected, got } => Self::Shape { what, expected, got },
            CoreError::Domain(msg) => Self::Domain(msg),
            CoreError::Decode(msg) => Self::Decode(msg),
        }
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Conflict => Self::Conflict,
            EngineError::Closed => Self::Config("environment is not open".to_owned()),
            other => Self::Engine(other),
        }
    }
}
