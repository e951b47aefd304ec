//! Client-side transaction handles.
//!
//! A [`Transaction`] is a lazy wrapper over one engine transaction: the
//! engine-side handle is created on first use (or an explicit
//! [`Transaction::begin`]), buffered writes apply atomically at
//! [`Transaction::commit`], and [`Transaction::rollback`] discards them and
//! returns the wrapper to its unopened state so it can be used again.
//!
//! Data operations inside a transaction go through a
//! [`TransactionalDatabase`] projection, which routes the same typed surface
//! as [`Database`] through the live engine handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use terrane_core::{IntoRow, Value};
use terrane_storage::{Direction, ScanBounds, TxnId};
use tracing::debug;

use crate::cursor::{CursorOptions, KeyRows, Rows, ValueRows};
use crate::database::Database;
use crate::env::EnvShared;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// No engine handle yet; the next operation (or `begin`) creates one.
    Unopened,
    Active(TxnId),
    Committed,
}

/// One atomic unit of work against the environment.
pub struct Transaction {
    env: Arc<EnvShared>,
    status: Mutex<Status>,
}

impl Transaction {
    pub(crate) fn new(env: Arc<EnvShared>) -> Self {
        Self { env, status: Mutex::new(Status::Unopened) }
    }

    fn status(&self) -> std::sync::MutexGuard<'_, Status> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens the engine-side transaction now. Idempotent while active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on a closed environment or a committed
    /// transaction.
    pub fn begin(&self) -> Result<()> {
        self.ensure_active().map(|_| ())
    }

    pub(crate) fn ensure_active(&self) -> Result<TxnId> {
        let mut status = self.status();
        match *status {
            Status::Active(id) => Ok(id),
            Status::Unopened => {
                let id = self.env.engine.begin_txn()?;
                *status = Status::Active(id);
                debug!(txn = id, "transaction opened");
                Ok(id)
            }
            Status::Committed => {
                Err(Error::Config("transaction has already been committed".to_owned()))
            }
        }
    }

    /// Atomically applies the transaction's writes.
    ///
    /// Committing a transaction that never opened is a no-op success. A
    /// conflict rejection leaves the transaction doomed: its writes are
    /// discarded and every further commit attempt fails with
    /// [`Error::Conflict`] until it is rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] when a concurrent transaction touched an
    /// overlapping key range first, and engine errors.
    pub fn commit(&self) -> Result<()> {
        let mut status = self.status();
        match *status {
            Status::Unopened | Status::Committed => Ok(()),
            Status::Active(id) => {
                self.env.engine.commit_txn(id)?;
                *status = Status::Committed;
                debug!(txn = id, "transaction committed");
                Ok(())
            }
        }
    }

    /// Discards the transaction's writes and resets it to unopened, ready
    /// for reuse. Rolling back an unopened or committed transaction is a
    /// no-op success.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn rollback(&self) -> Result<()> {
        let mut status = self.status();
        match *status {
            Status::Unopened | Status::Committed => Ok(()),
            Status::Active(id) => {
                self.env.engine.rollback_txn(id)?;
                *status = Status::Unopened;
                debug!(txn = id, "transaction rolled back");
                Ok(())
            }
        }
    }

    /// Projects a keyspace handle into this transaction.
    #[must_use]
    pub fn database(&self, db: &Database) -> TransactionalDatabase<'_> {
        TransactionalDatabase { txn: self, db: db.clone() }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        let status = *self.status();
        if let Status::Active(id) = status {
            // Best effort: an already-closed engine has dropped the handle.
            let _ = self.env.engine.rollback_txn(id);
        }
    }
}

/// A keyspace handle scoped to one transaction.
///
/// Reads observe the committed state as of the transaction's snapshot plus
/// its own buffered writes; writes stay buffered until the transaction
/// commits.
pub struct TransactionalDatabase<'t> {
    txn: &'t Transaction,
    db: Database,
}

impl TransactionalDatabase<'_> {
    /// Strict point lookup within the transaction.
    ///
    /// # Errors
    ///
    /// As for [`Database::get`], plus transaction lifecycle errors.
    pub fn get(&self, key: impl IntoRow) -> Result<Vec<Value>> {
        let id = self.txn.ensure_active()?;
        self.db.get_at(Some(id), &key.into_row())?.ok_or(Error::NotFound)
    }

    /// Lenient point lookup within the transaction.
    ///
    /// # Errors
    ///
    /// As for [`Database::try_get`], plus transaction lifecycle errors.
    pub fn try_get(&self, key: impl IntoRow) -> Result<Option<Vec<Value>>> {
        let id = self.txn.ensure_active()?;
        self.db.get_at(Some(id), &key.into_row())
    }

    /// Buffers one write.
    ///
    /// # Errors
    ///
    /// As for [`Database::set`], plus transaction lifecycle errors.
    pub fn set(&self, key: impl IntoRow, value: impl IntoRow) -> Result<()> {
        let id = self.txn.ensure_active()?;
        self.db.set_at(Some(id), &key.into_row(), &value.into_row())
    }

    /// Buffers one delete.
    ///
    /// # Errors
    ///
    /// As for [`Database::delete`], plus transaction lifecycle errors.
    pub fn delete(&self, key: impl IntoRow) -> Result<()> {
        let id = self.txn.ensure_active()?;
        self.db.delete_at(Some(id), &key.into_row())
    }

    /// Whether a row exists for this key within the transaction.
    ///
    /// # Errors
    ///
    /// As for [`Database::exists`], plus transaction lifecycle errors.
    pub fn exists(&self, key: impl IntoRow) -> Result<bool> {
        let id = self.txn.ensure_active()?;
        self.db.exists_at(Some(id), &key.into_row())
    }

    /// As [`Database::multi_get`], within the transaction.
    ///
    /// # Errors
    ///
    /// As for [`Database::multi_get`], plus transaction lifecycle errors.
    pub fn multi_get<K: IntoRow>(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Vec<Option<Vec<Value>>>> {
        let id = self.txn.ensure_active()?;
        self.db.multi_get_at(Some(id), keys.into_iter().map(IntoRow::into_row).collect())
    }

    /// As [`Database::multi_get_map`], within the transaction.
    ///
    /// # Errors
    ///
    /// As for [`Database::multi_get_map`], plus transaction lifecycle errors.
    pub fn multi_get_map<K: IntoRow>(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<HashMap<Vec<Value>, Vec<Value>>> {
        let id = self.txn.ensure_active()?;
        self.db.multi_get_map_at(Some(id), keys.into_iter().map(IntoRow::into_row).collect())
    }

    /// As [`Database::multi_delete`], within the transaction.
    ///
    /// # Errors
    ///
    /// As for [`Database::multi_delete`], plus transaction lifecycle errors.
    pub fn multi_delete<K: IntoRow>(&self, keys: impl IntoIterator<Item = K>) -> Result<()> {
        let id = self.txn.ensure_active()?;
        self.db.multi_delete_at(Some(id), keys.into_iter().map(IntoRow::into_row).collect())
    }

    /// As [`Database::update`], buffered in the transaction.
    ///
    /// # Errors
    ///
    /// As for [`Database::update`], plus transaction lifecycle errors.
    pub fn update<K: IntoRow, V: IntoRow>(
        &self,
        rows: impl IntoIterator<Item = (K, V)>,
    ) -> Result<()> {
        let id = self.txn.ensure_active()?;
        self.db
            .update_at(Some(id), rows.into_iter().map(|(k, v)| (k.into_row(), v.into_row())).collect())
    }

    /// Number of rows visible to the transaction.
    ///
    /// # Errors
    ///
    /// Returns engine and transaction lifecycle errors.
    pub fn len(&self) -> Result<u64> {
        let id = self.txn.ensure_active()?;
        self.db.len_at(Some(id))
    }

    /// Whether the transaction sees no live rows.
    ///
    /// # Errors
    ///
    /// Returns engine and transaction lifecycle errors.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Iterates every row visible to the transaction, ascending.
    ///
    /// # Errors
    ///
    /// Returns engine and transaction lifecycle errors.
    pub fn iter(&self) -> Result<Rows> {
        let id = self.txn.ensure_active()?;
        self.db.scan_at(Some(id), ScanBounds::all(Direction::Forward))
    }

    /// Iterates every key visible to the transaction, ascending.
    ///
    /// # Errors
    ///
    /// Returns engine and transaction lifecycle errors.
    pub fn keys(&self) -> Result<KeyRows> {
        let id = self.txn.ensure_active()?;
        self.db.keys_at(Some(id), ScanBounds::all(Direction::Forward))
    }

    /// Iterates every value visible to the transaction, ascending.
    ///
    /// # Errors
    ///
    /// Returns engine and transaction lifecycle errors.
    pub fn values(&self) -> Result<ValueRows> {
        let id = self.txn.ensure_active()?;
        self.db.values_at(Some(id), ScanBounds::all(Direction::Forward))
    }

    /// As [`Database::get_range`], within the transaction.
    ///
    /// # Errors
    ///
    /// As for [`Database::get_range`], plus transaction lifecycle errors.
    pub fn get_range<S: IntoRow, E: IntoRow>(
        &self,
        start: Option<S>,
        stop: Option<E>,
        reverse: bool,
    ) -> Result<Rows> {
        let id = self.txn.ensure_active()?;
        self.db.range_at(
            Some(id),
            start.map(IntoRow::into_row),
            stop.map(IntoRow::into_row),
            reverse,
        )
    }

    /// As [`Database::cursor`], within the transaction.
    ///
    /// # Errors
    ///
    /// As for [`Database::cursor`], plus transaction lifecycle errors.
    pub fn cursor(&self, options: CursorOptions) -> Result<Rows> {
        let id = self.txn.ensure_active()?;
        self.db.cursor_at(Some(id), &options)
    }

    /// As [`Database::cursor_keys`], within the transaction.
    ///
    /// # Errors
    ///
    /// As for [`Database::cursor_keys`], plus transaction lifecycle errors.
    pub fn cursor_keys(&self, options: CursorOptions) -> Result<KeyRows> {
        let id = self.txn.ensure_active()?;
        self.db.cursor_keys_at(Some(id), &options)
    }
}
