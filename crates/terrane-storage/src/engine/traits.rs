//! The storage engine trait.
//!
//! [`Engine`] is object-safe: the client layer holds an `Arc<dyn Engine>` and
//! never learns the backend's concrete types. Transactions are addressed by
//! opaque [`TxnId`] handles handed out by [`Engine::begin_txn`]; every data
//! operation takes an optional handle, routing either through that
//! transaction's isolated view or through autocommit.

use std::ops::Bound;

use serde::{Deserialize, Serialize};

use super::EngineResult;

/// Opaque handle for one engine transaction.
pub type TxnId = u64;

/// Traversal direction of a range scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending byte order.
    Forward,
    /// Descending byte order.
    Reverse,
}

/// A resolved byte-range for the engine's scan primitive.
#[derive(Debug, Clone)]
pub struct ScanBounds {
    /// Lower end of the window, in byte order.
    pub lower: Bound<Vec<u8>>,
    /// Upper end of the window, in byte order.
    pub upper: Bound<Vec<u8>>,
    /// Traversal direction within the window.
    pub direction: Direction,
}

impl ScanBounds {
    /// Creates bounds from explicit ends and a direction.
    #[must_use]
    pub const fn new(lower: Bound<Vec<u8>>, upper: Bound<Vec<u8>>, direction: Direction) -> Self {
        Self { lower, upper, direction }
    }

    /// The full keyspace in the given direction.
    #[must_use]
    pub const fn all(direction: Direction) -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded, direction)
    }
}

/// A configuration value in the engine's string-path config tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigValue {
    /// An integer setting.
    Int(i64),
    /// A string setting.
    Str(String),
}

impl ConfigValue {
    /// The integer payload, if this is an integer setting.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    /// The string payload, if this is a string setting.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Int(_) => None,
        }
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Streaming handle over one resolved range scan.
///
/// Each call returns the next raw pair within the bounds, in the scan's
/// direction, or `None` once the window is exhausted. Implementations must
/// not buffer the full result set.
pub trait EngineScan: Send {
    /// Advances the scan by one pair.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine fails mid-scan (e.g. it was closed).
    fn next(&mut self) -> EngineResult<Option<(Vec<u8>, Vec<u8>)>>;
}

/// The narrow collaborator contract the client layer consumes.
///
/// Implementations must be thread-safe; a single [`TxnId`] must not be
/// driven from multiple threads without external synchronization.
pub trait Engine: Send + Sync {
    /// Opens the engine. Returns whether a state transition occurred.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot come online.
    fn open(&self) -> EngineResult<bool>;

    /// Closes the engine, aborting live transactions and discarding
    /// session-only configuration. Returns whether a transition occurred.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot shut down cleanly.
    fn close(&self) -> EngineResult<bool>;

    /// Whether the engine is currently open.
    fn is_open(&self) -> bool;

    /// Registers a keyspace, creating it when absent. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot create the keyspace.
    fn register_keyspace(&self, name: &str) -> EngineResult<()>;

    /// Point lookup of a raw key.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Closed`](super::EngineError::Closed) on a
    /// closed engine, and keyspace/transaction handle errors.
    fn get(&self, keyspace: &str, txn: Option<TxnId>, key: &[u8]) -> EngineResult<Option<Vec<u8>>>;

    /// Stores a raw pair, replacing any existing value.
    ///
    /// # Errors
    ///
    /// As for [`Engine::get`]; additionally rejects writes through a doomed
    /// transaction handle.
    fn put(&self, keyspace: &str, txn: Option<TxnId>, key: &[u8], value: &[u8]) -> EngineResult<()>;

    /// Deletes a raw key; absent keys are a no-op.
    ///
    /// # Errors
    ///
    /// As for [`Engine::put`].
    fn delete(&self, keyspace: &str, txn: Option<TxnId>, key: &[u8]) -> EngineResult<()>;

    /// Number of live keys visible to the given handle.
    ///
    /// # Errors
    ///
    /// As for [`Engine::get`].
    fn count(&self, keyspace: &str, txn: Option<TxnId>) -> EngineResult<u64>;

    /// Opens a streaming scan over the resolved byte window.
    ///
    /// # Errors
    ///
    /// As for [`Engine::get`].
    fn scan(
        &self,
        keyspace: &str,
        txn: Option<TxnId>,
        bounds: ScanBounds,
    ) -> EngineResult<Box<dyn EngineScan>>;

    /// Begins a transaction and returns its handle. Reads through the handle
    /// observe the committed state as of this call (snapshot) plus the
    /// transaction's own writes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Closed`](super::EngineError::Closed) on a
    /// closed engine.
    fn begin_txn(&self) -> EngineResult<TxnId>;

    /// Atomically applies the transaction's buffered writes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Conflict`](super::EngineError::Conflict) when
    /// a concurrent transaction touched an overlapping key range first; the
    /// handle is then doomed and every further commit attempt fails the same
    /// way.
    fn commit_txn(&self, txn: TxnId) -> EngineResult<()>;

    /// Discards the transaction's buffered writes and releases the handle.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown handle.
    fn rollback_txn(&self, txn: TxnId) -> EngineResult<()>;

    /// Reads a configuration path. Unset paths without an engine default
    /// return `None`.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed paths.
    fn get_config(&self, path: &str) -> EngineResult<Option<ConfigValue>>;

    /// Writes a configuration path. The engine decides which paths persist
    /// across close/reopen and which are session-only.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed paths or values.
    fn set_config(&self, path: &str, value: ConfigValue) -> EngineResult<()>;
}
