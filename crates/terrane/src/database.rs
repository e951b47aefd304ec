//! Typed keyspace handles.
//!
//! A [`Database`] binds one registered keyspace name to its schema and routes
//! every operation through the environment's engine. The handle is cheap to
//! clone and thread-safe; all mutation happens engine-side.
//!
//! Each public operation has a `*_at` twin taking an optional transaction
//! handle. The public surface passes `None` (autocommit); transactional
//! projections pass their live handle so the same packing and decoding logic
//! serves both paths.

use std::collections::HashMap;
use std::sync::Arc;

use terrane_core::{IntoRow, Schema, Value};
use terrane_storage::{ConfigValue, Direction, ScanBounds, TxnId};

use crate::cursor::{CursorOptions, KeyRows, Rows, ValueRows};
use crate::env::EnvShared;
use crate::error::{Error, Result};
use crate::range::{self, PackedBound};

/// A typed handle onto one named keyspace.
#[derive(Clone)]
pub struct Database {
    pub(crate) env: Arc<EnvShared>,
    pub(crate) name: String,
    pub(crate) schema: Arc<Schema>,
}

impl Database {
    /// The keyspace name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The keyspace's schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Strict point lookup: the decoded value row, or [`Error::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an absent key, shape/domain errors for
    /// a malformed key, and engine errors.
    pub fn get(&self, key: impl IntoRow) -> Result<Vec<Value>> {
        self.get_at(None, &key.into_row())?.ok_or(Error::NotFound)
    }

    /// Lenient point lookup: `None` for an absent key.
    ///
    /// # Errors
    ///
    /// Returns shape/domain errors for a malformed key, and engine errors.
    pub fn try_get(&self, key: impl IntoRow) -> Result<Option<Vec<Value>>> {
        self.get_at(None, &key.into_row())
    }

    /// Stores one row, replacing any existing value for the key.
    ///
    /// # Errors
    ///
    /// Returns shape/domain errors when either row does not fit the schema,
    /// and engine errors.
    pub fn set(&self, key: impl IntoRow, value: impl IntoRow) -> Result<()> {
        self.set_at(None, &key.into_row(), &value.into_row())
    }

    /// Deletes one key. Deleting an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns shape/domain errors for a malformed key, and engine errors.
    pub fn delete(&self, key: impl IntoRow) -> Result<()> {
        self.delete_at(None, &key.into_row())
    }

    /// Whether a row exists for this key.
    ///
    /// # Errors
    ///
    /// As for [`Database::try_get`].
    pub fn exists(&self, key: impl IntoRow) -> Result<bool> {
        self.exists_at(None, &key.into_row())
    }

    /// Fetches many keys in one pass, preserving request order. Absent keys
    /// yield `None`. Every key is validated before the first fetch.
    ///
    /// # Errors
    ///
    /// Returns shape/domain errors for any malformed key, and engine errors.
    pub fn multi_get<K: IntoRow>(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Vec<Option<Vec<Value>>>> {
        self.multi_get_at(None, keys.into_iter().map(IntoRow::into_row).collect())
    }

    /// Fetches many keys into a map from key row to value row. Absent keys
    /// are omitted.
    ///
    /// # Errors
    ///
    /// As for [`Database::multi_get`].
    pub fn multi_get_map<K: IntoRow>(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<HashMap<Vec<Value>, Vec<Value>>> {
        self.multi_get_map_at(None, keys.into_iter().map(IntoRow::into_row).collect())
    }

    /// Deletes many keys. Every key is validated before the first delete.
    ///
    /// # Errors
    ///
    /// As for [`Database::multi_get`].
    pub fn multi_delete<K: IntoRow>(&self, keys: impl IntoIterator<Item = K>) -> Result<()> {
        self.multi_delete_at(None, keys.into_iter().map(IntoRow::into_row).collect())
    }

    /// Stores many rows. The whole batch is validated and packed before the
    /// first write, so a malformed row leaves the keyspace untouched.
    ///
    /// # Errors
    ///
    /// Returns shape/domain errors for any malformed row, and engine errors.
    pub fn update<K: IntoRow, V: IntoRow>(
        &self,
        rows: impl IntoIterator<Item = (K, V)>,
    ) -> Result<()> {
        self.update_at(
            None,
            rows.into_iter().map(|(k, v)| (k.into_row(), v.into_row())).collect(),
        )
    }

    /// Number of live rows in the keyspace.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn len(&self) -> Result<u64> {
        self.len_at(None)
    }

    /// Whether the keyspace holds no live rows.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len_at(None)? == 0)
    }

    /// Iterates every row in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn iter(&self) -> Result<Rows> {
        self.scan_at(None, ScanBounds::all(Direction::Forward))
    }

    /// Iterates every key in ascending order.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn keys(&self) -> Result<KeyRows> {
        self.keys_at(None, ScanBounds::all(Direction::Forward))
    }

    /// Iterates every value in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn values(&self) -> Result<ValueRows> {
        self.values_at(None, ScanBounds::all(Direction::Forward))
    }

    /// Range read between two optional bounds, both inclusive.
    ///
    /// Bounds may be full keys or prefixes of the key fields; a prefix upper
    /// bound covers every key extending it. Supplying the bounds in
    /// descending order flips the traversal to descending, as does `reverse`.
    ///
    /// # Errors
    ///
    /// Returns shape/domain errors for malformed bounds, and engine errors.
    pub fn get_range<S: IntoRow, E: IntoRow>(
        &self,
        start: Option<S>,
        stop: Option<E>,
        reverse: bool,
    ) -> Result<Rows> {
        self.range_at(
            None,
            start.map(IntoRow::into_row),
            stop.map(IntoRow::into_row),
            reverse,
        )
    }

    /// Cursor walk: seek to a key and iterate in the requested order,
    /// optionally confined to a key prefix.
    ///
    /// # Errors
    ///
    /// Returns shape/domain errors for malformed options, and engine errors.
    pub fn cursor(&self, options: CursorOptions) -> Result<Rows> {
        self.cursor_at(None, &options)
    }

    /// As [`Database::cursor`], yielding keys only.
    ///
    /// # Errors
    ///
    /// As for [`Database::cursor`].
    pub fn cursor_keys(&self, options: CursorOptions) -> Result<KeyRows> {
        self.cursor_keys_at(None, &options)
    }

    // ------------------------------------------------------------------
    // Per-keyspace configuration
    // ------------------------------------------------------------------

    /// The keyspace's compression codec, if one is set.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn compression(&self) -> Result<Option<String>> {
        let value = self.env.engine.get_config(&self.config_path("compression"))?;
        Ok(value.and_then(|v| v.as_str().map(str::to_owned)))
    }

    /// Sets the keyspace's compression codec. This setting survives
    /// close/reopen.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn set_compression(&self, codec: &str) -> Result<()> {
        self.env.engine.set_config(&self.config_path("compression"), ConfigValue::from(codec))?;
        Ok(())
    }

    /// The keyspace's mmap flag (defaults to 1).
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn mmap(&self) -> Result<i64> {
        let value = self.env.engine.get_config(&self.config_path("mmap"))?;
        Ok(value.and_then(|v| v.as_int()).unwrap_or(1))
    }

    /// Sets the keyspace's mmap flag for this session.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn set_mmap(&self, flag: i64) -> Result<()> {
        self.env.engine.set_config(&self.config_path("mmap"), ConfigValue::Int(flag))?;
        Ok(())
    }

    /// The keyspace's sync flag (defaults to 1).
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn sync(&self) -> Result<i64> {
        let value = self.env.engine.get_config(&self.config_path("sync"))?;
        Ok(value.and_then(|v| v.as_int()).unwrap_or(1))
    }

    /// Sets the keyspace's sync flag for this session.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn set_sync(&self, flag: i64) -> Result<()> {
        self.env.engine.set_config(&self.config_path("sync"), ConfigValue::Int(flag))?;
        Ok(())
    }

    fn config_path(&self, leaf: &str) -> String {
        format!("db.{}.{}", self.name, leaf)
    }
}

// Transaction-routable operation bodies. The public methods above pass
// `txn = None`; `TransactionalDatabase` passes its live handle.
impl Database {
    pub(crate) fn get_at(&self, txn: Option<TxnId>, key: &[Value]) -> Result<Option<Vec<Value>>> {
        let packed = self.schema.pack_key(key)?;
        match self.env.engine.get(&self.name, txn, &packed)? {
            Some(raw) => Ok(Some(self.schema.unpack_value(&raw)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn set_at(&self, txn: Option<TxnId>, key: &[Value], value: &[Value]) -> Result<()> {
        let packed_key = self.schema.pack_key(key)?;
        let packed_value = self.schema.pack_value(value)?;
        self.env.engine.put(&self.name, txn, &packed_key, &packed_value)?;
        Ok(())
    }

    pub(crate) fn delete_at(&self, txn: Option<TxnId>, key: &[Value]) -> Result<()> {
        let packed = self.schema.pack_key(key)?;
        self.env.engine.delete(&self.name, txn, &packed)?;
        Ok(())
    }

    pub(crate) fn exists_at(&self, txn: Option<TxnId>, key: &[Value]) -> Result<bool> {
        let packed = self.schema.pack_key(key)?;
        Ok(self.env.engine.get(&self.name, txn, &packed)?.is_some())
    }

    pub(crate) fn multi_get_at(
        &self,
        txn: Option<TxnId>,
        keys: Vec<Vec<Value>>,
    ) -> Result<Vec<Option<Vec<Value>>>> {
        let packed = self.pack_all_keys(&keys)?;
        packed
            .iter()
            .map(|key| {
                match self.env.engine.get(&self.name, txn, key)? {
                    Some(raw) => Ok(Some(self.schema.unpack_value(&raw)?)),
                    None => Ok(None),
                }
            })
            .collect()
    }

    pub(crate) fn multi_get_map_at(
        &self,
        txn: Option<TxnId>,
        keys: Vec<Vec<Value>>,
    ) -> Result<HashMap<Vec<Value>, Vec<Value>>> {
        let packed = self.pack_all_keys(&keys)?;
        let mut found = HashMap::with_capacity(keys.len());
        for (row, key) in keys.into_iter().zip(&packed) {
            if let Some(raw) = self.env.engine.get(&self.name, txn, key)? {
                found.insert(row, self.schema.unpack_value(&raw)?);
            }
        }
        Ok(found)
    }

    pub(crate) fn multi_delete_at(&self, txn: Option<TxnId>, keys: Vec<Vec<Value>>) -> Result<()> {
        let packed = self.pack_all_keys(&keys)?;
        for key in &packed {
            self.env.engine.delete(&self.name, txn, key)?;
        }
        Ok(())
    }

    pub(crate) fn update_at(
        &self,
        txn: Option<TxnId>,
        rows: Vec<(Vec<Value>, Vec<Value>)>,
    ) -> Result<()> {
        let mut packed = Vec::with_capacity(rows.len());
        for (key, value) in &rows {
            packed.push((self.schema.pack_key(key)?, self.schema.pack_value(value)?));
        }
        for (key, value) in &packed {
            self.env.engine.put(&self.name, txn, key, value)?;
        }
        Ok(())
    }

    pub(crate) fn len_at(&self, txn: Option<TxnId>) -> Result<u64> {
        Ok(self.env.engine.count(&self.name, txn)?)
    }

    pub(crate) fn scan_at(&self, txn: Option<TxnId>, bounds: ScanBounds) -> Result<Rows> {
        let scan = self.env.engine.scan(&self.name, txn, bounds)?;
        Ok(Rows::new(Some(scan), Arc::clone(&self.schema)))
    }

    pub(crate) fn keys_at(&self, txn: Option<TxnId>, bounds: ScanBounds) -> Result<KeyRows> {
        let scan = self.env.engine.scan(&self.name, txn, bounds)?;
        Ok(KeyRows::new(Some(scan), Arc::clone(&self.schema)))
    }

    pub(crate) fn values_at(&self, txn: Option<TxnId>, bounds: ScanBounds) -> Result<ValueRows> {
        let scan = self.env.engine.scan(&self.name, txn, bounds)?;
        Ok(ValueRows::new(Some(scan), Arc::clone(&self.schema)))
    }

    pub(crate) fn range_at(
        &self,
        txn: Option<TxnId>,
        start: Option<Vec<Value>>,
        stop: Option<Vec<Value>>,
        reverse: bool,
    ) -> Result<Rows> {
        let start = start.map(|row| self.pack_bound(&row)).transpose()?;
        let stop = stop.map(|row| self.pack_bound(&row)).transpose()?;
        let bounds = range::resolve_range(start.as_ref(), stop.as_ref(), reverse);
        self.scan_at(txn, bounds)
    }

    pub(crate) fn cursor_at(&self, txn: Option<TxnId>, options: &CursorOptions) -> Result<Rows> {
        match self.cursor_window(options)? {
            Some(bounds) => self.scan_at(txn, bounds),
            None => Ok(Rows::new(None, Arc::clone(&self.schema))),
        }
    }

    pub(crate) fn cursor_keys_at(
        &self,
        txn: Option<TxnId>,
        options: &CursorOptions,
    ) -> Result<KeyRows> {
        match self.cursor_window(options)? {
            Some(bounds) => self.keys_at(txn, bounds),
            None => Ok(KeyRows::new(None, Arc::clone(&self.schema))),
        }
    }

    /// Packs a range bound: a full key when every component is present, a
    /// self-delimiting prefix otherwise.
    fn pack_bound(&self, row: &[Value]) -> Result<PackedBound> {
        if row.len() == self.schema.key_arity() {
            Ok(PackedBound { bytes: self.schema.pack_key(row)?, partial: false })
        } else {
            Ok(PackedBound { bytes: self.schema.pack_key_prefix(row)?, partial: true })
        }
    }

    fn cursor_window(&self, options: &CursorOptions) -> Result<Option<ScanBounds>> {
        let key = match &options.key {
            Some(row) => Some(self.pack_bound(row)?.bytes),
            None => None,
        };
        let prefix = match &options.prefix {
            Some(row) => Some(self.schema.pack_scan_prefix(row)?),
            None => None,
        };
        Ok(range::resolve_cursor(
            options.order.is_forward(),
            options.order.is_inclusive(),
            key,
            prefix,
        ))
    }

    fn pack_all_keys(&self, keys: &[Vec<Value>]) -> Result<Vec<Vec<u8>>> {
        keys.iter().map(|row| Ok(self.schema.pack_key(row)?)).collect()
    }
}
