//! terrane-core
//!
//! Field codecs, composite schemas, and typed values for the terrane client
//! layer. This crate knows nothing about any storage engine: it only defines
//! how typed, possibly multi-field keys and values are packed into
//! order-preserving byte strings and unpacked back.
//!
//! # Modules
//!
//! - [`field`] - per-field order-preserving codecs
//! - [`schema`] - composite key/value packing and arity validation
//! - [`value`] - the closed typed-value set and row conversions
//! - [`error`] - the shape/domain/decode error taxonomy

pub mod error;
pub mod field;
pub mod schema;
pub mod value;

pub use error::CoreError;
pub use field::{Field, IntWidth};
pub use schema::Schema;
pub use value::{IntoRow, Value};
