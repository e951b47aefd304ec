//! Typed row iterators over engine scans.
//!
//! Every iteration surface of a keyspace funnels through the iterators here:
//! they pull raw pairs from an [`EngineScan`] one at a time and decode them
//! against the keyspace's schema, so results stream without buffering. A
//! decode or engine failure is yielded once as an `Err` item and the iterator
//! then fuses.

use std::sync::Arc;

use terrane_core::{IntoRow, Schema, Value};
use terrane_storage::EngineScan;

use crate::error::Result;

/// Seek comparison for a cursor walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Strictly after the seek key, ascending.
    Gt,
    /// At or after the seek key, ascending.
    #[default]
    Ge,
    /// Strictly before the seek key, descending.
    Lt,
    /// At or before the seek key, descending.
    Le,
}

impl Order {
    pub(crate) const fn is_forward(self) -> bool {
        matches!(self, Self::Gt | Self::Ge)
    }

    pub(crate) const fn is_inclusive(self) -> bool {
        matches!(self, Self::Ge | Self::Le)
    }
}

/// Options for a cursor walk over one keyspace.
///
/// A cursor combines a seek `key` (full or a prefix of the key fields), an
/// [`Order`] relative to that key, and an optional `prefix` that confines
/// the walk to keys extending it.
#[derive(Debug, Clone, Default)]
pub struct CursorOptions {
    pub(crate) order: Order,
    pub(crate) key: Option<Vec<Value>>,
    pub(crate) prefix: Option<Vec<Value>>,
}

impl CursorOptions {
    /// Starts from defaults: ascending from the first key, no prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seek comparison.
    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Sets the seek key.
    #[must_use]
    pub fn key(mut self, key: impl IntoRow) -> Self {
        self.key = Some(key.into_row());
        self
    }

    /// Confines the walk to keys extending this prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl IntoRow) -> Self {
        self.prefix = Some(prefix.into_row());
        self
    }
}

/// Shared pull-and-fuse plumbing under the typed iterators.
struct RawRows {
    scan: Option<Box<dyn EngineScan>>,
    schema: Arc<Schema>,
}

impl RawRows {
    fn next_raw(&mut self) -> Option<Result<(Vec<u8>, Vec<u8>)>> {
        let scan = self.scan.as_mut()?;
        match scan.next() {
            Ok(Some(pair)) => Some(Ok(pair)),
            Ok(None) => {
                self.scan = None;
                None
            }
            Err(err) => {
                self.scan = None;
                Some(Err(err.into()))
            }
        }
    }
}

/// Streaming iterator of decoded `(key, value)` rows.
pub struct Rows {
    inner: RawRows,
}

impl Rows {
    pub(crate) fn new(scan: Option<Box<dyn EngineScan>>, schema: Arc<Schema>) -> Self {
        Self { inner: RawRows { scan, schema } }
    }
}

impl Iterator for Rows {
    type Item = Result<(Vec<Value>, Vec<Value>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = match self.inner.next_raw()? {
            Ok(pair) => pair,
            Err(err) => return Some(Err(err)),
        };
        let schema = &self.inner.schema;
        let decoded = schema
            .unpack_key(&key)
            .and_then(|k| Ok((k, schema.unpack_value(&value)?)));
        Some(decoded.map_err(Into::into))
    }
}

/// Streaming iterator of decoded keys.
pub struct KeyRows {
    inner: RawRows,
}

impl KeyRows {
    pub(crate) fn new(scan: Option<Box<dyn EngineScan>>, schema: Arc<Schema>) -> Self {
        Self { inner: RawRows { scan, schema } }
    }
}

impl Iterator for KeyRows {
    type Item = Result<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, _) = match self.inner.next_raw()? {
            Ok(pair) => pair,
            Err(err) => return Some(Err(err)),
        };
        Some(self.inner.schema.unpack_key(&key).map_err(Into::into))
    }
}

/// Streaming iterator of decoded values.
pub struct ValueRows {
    inner: RawRows,
}

impl ValueRows {
    pub(crate) fn new(scan: Option<Box<dyn EngineScan>>, schema: Arc<Schema>) -> Self {
        Self { inner: RawRows { scan, schema } }
    }
}

impl Iterator for ValueRows {
    type Item = Result<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, value) = match self.inner.next_raw()? {
            Ok(pair) => pair,
            Err(err) => return Some(Err(err)),
        };
        Some(self.inner.schema.unpack_value(&value).map_err(Into::into))
    }
}
