//! Error types for the core crate.

use thiserror::Error;

/// Errors raised while packing or unpacking typed fields.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A composite key or value had the wrong number of components.
    #[error("{what} expects {expected} component(s), got {got}")]
    Shape {
        /// What was being packed ("key" or "value").
        what: &'static str,
        /// The declared field count.
        expected: usize,
        /// The number of components supplied.
        got: usize,
    },

    /// A field value is outside its codec's representable range.
    #[error("domain error: {0}")]
    Domain(String),

    /// Stored bytes could not be decoded back into field values.
    #[error("decode error: {0}")]
    Decode(String),
}

impl CoreError {
    /// Creates a shape error for a key with the wrong arity.
    #[must_use]
    pub const fn key_shape(expected: usize, got: usize) -> Self {
        Self::Shape { what: "key", expected, got }
    }

    /// Creates a shape error for a value with the wrong arity.
    #[must_use]
    pub const fn value_shape(expected: usize, got: usize) -> Self {
        Self::Shape { what: "value", expected, got }
    }

    /// Creates a domain error from anything displayable.
    #[must_use]
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    /// Creates a decode error from anything displayable.
    #[must_use]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
