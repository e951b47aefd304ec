//! Ordered in-process engine with optimistic concurrency.
//!
//! `MemoryEngine` keeps each keyspace as a `BTreeMap` of version chains.
//! Every committed write is stamped with a global commit sequence number;
//! readers resolve a key against a snapshot sequence, which gives
//! transactions a stable view as of `begin_txn` and lets scans stream
//! without holding locks between calls.
//!
//! # Conflict detection
//!
//! Transactions buffer their writes. At commit, a transaction is rejected
//! when a written key was committed by someone else after this transaction's
//! snapshot, or when another live transaction holds an overlapping
//! uncommitted write (the lock case). A rejected transaction is *doomed*:
//! its buffer is discarded and every later commit attempt fails with
//! [`EngineError::Conflict`].
//!
//! # Configuration
//!
//! The config tree distinguishes persistent paths (currently the per-keyspace
//! `*.compression` policy) from session paths, which are dropped on
//! [`Engine::close`]. `db.<name>.mmap` and `db.<name>.sync` default to 1.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::engine::{
    ConfigValue, Direction, Engine, EngineError, EngineResult, EngineScan, ScanBounds, TxnId,
};

/// Versions of one key, ascending by commit sequence. `None` is a tombstone.
type VersionChain = Vec<(u64, Option<Vec<u8>>)>;

/// Uncommitted writes of one transaction, per keyspace.
type WriteSet = HashMap<String, BTreeMap<Vec<u8>, Option<Vec<u8>>>>;

#[derive(Default)]
struct KeyspaceData {
    data: BTreeMap<Vec<u8>, VersionChain>,
}

struct TxnState {
    snapshot: u64,
    writes: WriteSet,
    doomed: bool,
}

#[derive(Default)]
struct State {
    open: bool,
    commit_seq: u64,
    next_txn: TxnId,
    keyspaces: HashMap<String, KeyspaceData>,
    txns: HashMap<TxnId, TxnState>,
    persistent: HashMap<String, ConfigValue>,
    session: HashMap<String, ConfigValue>,
}

/// Ordered in-process storage engine.
///
/// Cloning the engine handle shares the underlying store, the way two
/// environment instances over the same data directory would.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    state: Arc<RwLock<State>>,
}

impl MemoryEngine {
    /// Creates an empty, closed engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        // Lock poisoning only happens when a writer panicked; the data is
        // plain maps, so the poisoned view is still coherent.
        self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl State {
    fn require_open(&self) -> EngineResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(EngineError::Closed)
        }
    }

    fn keyspace(&self, name: &str) -> EngineResult<&KeyspaceData> {
        self.keyspaces.get(name).ok_or_else(|| EngineError::KeyspaceNotFound(name.to_owned()))
    }

    fn keyspace_mut(&mut self, name: &str) -> EngineResult<&mut KeyspaceData> {
        self.keyspaces.get_mut(name).ok_or_else(|| EngineError::KeyspaceNotFound(name.to_owned()))
    }

    fn txn(&self, id: TxnId) -> EngineResult<&TxnState> {
        self.txns.get(&id).ok_or(EngineError::UnknownTxn(id))
    }

    /// Snapshot sequence for reads through the given handle.
    fn snapshot_for(&self, txn: Option<TxnId>) -> EngineResult<u64> {
        match txn {
            Some(id) => Ok(self.txn(id)?.snapshot),
            None => Ok(self.commit_seq),
        }
    }

    /// Buffers a transactional write, rejecting doomed handles.
    fn buffer_write(
        &mut self,
        id: TxnId,
        keyspace: &str,
        key: &[u8],
        value: Option<Vec<u8>>,
    ) -> EngineResult<()> {
        self.keyspace(keyspace)?;
        let txn = self.txns.get_mut(&id).ok_or(EngineError::UnknownTxn(id))?;
        if txn.doomed {
            return Err(EngineError::Conflict);
        }
        txn.writes.entry(keyspace.to_owned()).or_default().insert(key.to_vec(), value);
        Ok(())
    }
}

/// Value of `chain` visible at `snapshot`, if any version qualifies.
fn visible_at(chain: &VersionChain, snapshot: u64) -> Option<&Option<Vec<u8>>> {
    chain.iter().rev().find(|(seq, _)| *seq <= snapshot).map(|(_, value)| value)
}

/// Live (non-tombstone) value of `chain` at `snapshot`.
fn live_at(chain: &VersionChain, snapshot: u64) -> Option<&Vec<u8>> {
    visible_at(chain, snapshot).and_then(Option::as_ref)
}

fn bound_ref(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(b) => Bound::Included(b.as_slice()),
        Bound::Excluded(b) => Bound::Excluded(b.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// Whether a `(lower, upper)` window can contain no key at all. Also guards
/// the `BTreeMap::range` panic on inverted windows.
fn window_is_empty(lower: &Bound<Vec<u8>>, upper: &Bound<Vec<u8>>) -> bool {
    match (lower, upper) {
        (Bound::Included(l), Bound::Included(u)) => l > u,
        (Bound::Included(l), Bound::Excluded(u))
        | (Bound::Excluded(l), Bound::Included(u))
        | (Bound::Excluded(l), Bound::Excluded(u)) => l >= u,
        _ => false,
    }
}

impl Engine for MemoryEngine {
    fn open(&self) -> EngineResult<bool> {
        let mut state = self.write();
        if state.open {
            return Ok(false);
        }
        state.open = true;
        debug!(keyspaces = state.keyspaces.len(), "engine opened");
        Ok(true)
    }

    fn close(&self) -> EngineResult<bool> {
        let mut state = self.write();
        if !state.open {
            return Ok(false);
        }
        state.open = false;
        let aborted = state.txns.len();
        state.txns.clear();
        state.session.clear();
        debug!(aborted_txns = aborted, "engine closed");
        Ok(true)
    }

    fn is_open(&self) -> bool {
        self.read().open
    }

    fn register_keyspace(&self, name: &str) -> EngineResult<()> {
        self.write().keyspaces.entry(name.to_owned()).or_default();
        Ok(())
    }

    fn get(&self, keyspace: &str, txn: Option<TxnId>, key: &[u8]) -> EngineResult<Option<Vec<u8>>> {
        let state = self.read();
        state.require_open()?;
        if let Some(id) = txn {
            if let Some(buffered) = state.txn(id)?.writes.get(keyspace).and_then(|w| w.get(key)) {
                return Ok(buffered.clone());
            }
        }
        let snapshot = state.snapshot_for(txn)?;
        Ok(state
            .keyspace(keyspace)?
            .data
            .get(key)
            .and_then(|chain| live_at(chain, snapshot))
            .cloned())
    }

    fn put(
        &self,
        keyspace: &str,
        txn: Option<TxnId>,
        key: &[u8],
        value: &[u8],
    ) -> EngineResult<()> {
        let mut state = self.write();
        state.require_open()?;
        match txn {
            Some(id) => state.buffer_write(id, keyspace, key, Some(value.to_vec())),
            None => {
                state.commit_seq += 1;
                let seq = state.commit_seq;
                state
                    .keyspace_mut(keyspace)?
                    .data
                    .entry(key.to_vec())
                    .or_default()
                    .push((seq, Some(value.to_vec())));
                Ok(())
            }
        }
    }

    fn delete(&self, keyspace: &str, txn: Option<TxnId>, key: &[u8]) -> EngineResult<()> {
        let mut state = self.write();
        state.require_open()?;
        match txn {
            Some(id) => state.buffer_write(id, keyspace, key, None),
            None => {
                let seq = state.commit_seq;
                let ks = state.keyspace_mut(keyspace)?;
                // Absent keys are a no-op; don't grow tombstone chains.
                let Some(chain) = ks.data.get_mut(key) else { return Ok(()) };
                if live_at(chain, seq).is_none() {
                    return Ok(());
                }
                chain.push((seq + 1, None));
                state.commit_seq = seq + 1;
                Ok(())
            }
        }
    }

    fn count(&self, keyspace: &str, txn: Option<TxnId>) -> EngineResult<u64> {
        let state = self.read();
        state.require_open()?;
        let snapshot = state.snapshot_for(txn)?;
        let overlay = match txn {
            Some(id) => state.txn(id)?.writes.get(keyspace),
            None => None,
        };
        let ks = state.keyspace(keyspace)?;

        let base = ks
            .data
            .iter()
            .filter(|(key, chain)| {
                live_at(chain, snapshot).is_some()
                    && !overlay.is_some_and(|w| w.contains_key(key.as_slice()))
            })
            .count();
        let added = overlay.map_or(0, |w| w.values().filter(|v| v.is_some()).count());
        Ok((base + added) as u64)
    }

    fn scan(
        &self,
        keyspace: &str,
        txn: Option<TxnId>,
        bounds: ScanBounds,
    ) -> EngineResult<Box<dyn EngineScan>> {
        let state = self.read();
        state.require_open()?;
        state.keyspace(keyspace)?;
        let snapshot = state.snapshot_for(txn)?;
        let overlay = match txn {
            Some(id) => state.txn(id)?.writes.get(keyspace).cloned().unwrap_or_default(),
            None => BTreeMap::new(),
        };
        Ok(Box::new(MemoryScan {
            state: Arc::clone(&self.state),
            keyspace: keyspace.to_owned(),
            snapshot,
            overlay,
            lower: bounds.lower,
            upper: bounds.upper,
            direction: bounds.direction,
            done: false,
        }))
    }

    fn begin_txn(&self) -> EngineResult<TxnId> {
        let mut state = self.write();
        state.require_open()?;
        state.next_txn += 1;
        let id = state.next_txn;
        let snapshot = state.commit_seq;
        state.txns.insert(id, TxnState { snapshot, writes: WriteSet::new(), doomed: false });
        Ok(id)
    }

    fn commit_txn(&self, txn: TxnId) -> EngineResult<()> {
        let mut state = self.write();
        state.require_open()?;
        let current = state.txn(txn)?;
        if current.doomed {
            return Err(EngineError::Conflict);
        }

        let snapshot = current.snapshot;
        let conflicted = current.writes.iter().any(|(keyspace, writes)| {
            writes.keys().any(|key| {
                let committed_later = state
                    .keyspaces
                    .get(keyspace)
                    .and_then(|ks| ks.data.get(key))
                    .and_then(|chain| chain.last())
                    .is_some_and(|(seq, _)| *seq > snapshot);
                let locked_elsewhere = state.txns.iter().any(|(other_id, other)| {
                    *other_id != txn
                        && !other.doomed
                        && other.writes.get(keyspace).is_some_and(|w| w.contains_key(key))
                });
                committed_later || locked_elsewhere
            })
        });

        if conflicted {
            let current = state.txns.get_mut(&txn).ok_or(EngineError::UnknownTxn(txn))?;
            current.doomed = true;
            current.writes.clear();
            debug!(txn, "commit rejected, transaction doomed");
            return Err(EngineError::Conflict);
        }

        let Some(current) = state.txns.remove(&txn) else {
            return Err(EngineError::UnknownTxn(txn));
        };
        state.commit_seq += 1;
        let seq = state.commit_seq;
        for (keyspace, writes) in current.writes {
            let ks = state.keyspaces.entry(keyspace).or_default();
            for (key, value) in writes {
                ks.data.entry(key).or_default().push((seq, value));
            }
        }
        Ok(())
    }

    fn rollback_txn(&self, txn: TxnId) -> EngineResult<()> {
        let mut state = self.write();
        state.txns.remove(&txn).ok_or(EngineError::UnknownTxn(txn))?;
        Ok(())
    }

    fn get_config(&self, path: &str) -> EngineResult<Option<ConfigValue>> {
        let state = self.read();
        if path == "engine.status" {
            let status = if state.open { "online" } else { "offline" };
            return Ok(Some(ConfigValue::Str(status.to_owned())));
        }
        if let Some(value) = state.session.get(path).or_else(|| state.persistent.get(path)) {
            return Ok(Some(value.clone()));
        }
        // Engine defaults for well-known per-keyspace paths.
        if path.ends_with(".mmap") || path.ends_with(".sync") {
            return Ok(Some(ConfigValue::Int(1)));
        }
        Ok(None)
    }

    fn set_config(&self, path: &str, value: ConfigValue) -> EngineResult<()> {
        if path.is_empty() {
            return Err(EngineError::Config("empty configuration path".to_owned()));
        }
        let mut state = self.write();
        // Compression policy is part of the persisted keyspace catalog;
        // everything else lives for the session only.
        if path.ends_with(".compression") {
            state.persistent.insert(path.to_owned(), value);
        } else {
            state.session.insert(path.to_owned(), value);
        }
        Ok(())
    }
}

/// Streaming scan over a snapshot of one keyspace, merged with a
/// transaction's write overlay.
///
/// The scan re-seeks from the last returned key on every call, so it holds
/// the engine lock only while producing one pair.
struct MemoryScan {
    state: Arc<RwLock<State>>,
    keyspace: String,
    snapshot: u64,
    overlay: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    lower: Bound<Vec<u8>>,
    upper: Bound<Vec<u8>>,
    direction: Direction,
    done: bool,
}

impl MemoryScan {
    /// Shrinks the window past a returned key.
    fn advance_past(&mut self, key: &[u8]) {
        match self.direction {
            Direction::Forward => self.lower = Bound::Excluded(key.to_vec()),
            Direction::Reverse => self.upper = Bound::Excluded(key.to_vec()),
        }
    }
}

impl EngineScan for MemoryScan {
    fn next(&mut self) -> EngineResult<Option<(Vec<u8>, Vec<u8>)>> {
        if self.done || window_is_empty(&self.lower, &self.upper) {
            self.done = true;
            return Ok(None);
        }

        let state = self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.require_open()?;
        let ks = state.keyspace(&self.keyspace)?;
        let window = (bound_ref(&self.lower), bound_ref(&self.upper));

        let mut base = ks
            .data
            .range::<[u8], _>(window)
            .filter(|(key, chain)| {
                !self.overlay.contains_key(key.as_slice())
                    && live_at(chain, self.snapshot).is_some()
            })
            .map(|(key, chain)| (key, live_at(chain, self.snapshot)));
        let mut buffered = self
            .overlay
            .range::<[u8], _>(window)
            .filter_map(|(key, value)| value.as_ref().map(|v| (key, Some(v))));

        let (base_next, over_next) = match self.direction {
            Direction::Forward => (base.next(), buffered.next()),
            Direction::Reverse => (base.next_back(), buffered.next_back()),
        };

        let picked = match (base_next, over_next) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => match self.direction {
                Direction::Forward => Some(if b.0 <= o.0 { b } else { o }),
                Direction::Reverse => Some(if b.0 >= o.0 { b } else { o }),
            },
        };

        match picked {
            Some((key, Some(value))) => {
                let pair = (key.clone(), value.clone());
                drop(state);
                self.advance_past(&pair.0);
                Ok(Some(pair))
            }
            _ => {
                self.done = true;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn open_engine() -> MemoryEngine {
        let engine = MemoryEngine::new();
        engine.register_keyspace("main").unwrap();
        assert!(engine.open().unwrap());
        engine
    }

    fn collect(engine: &MemoryEngine, txn: Option<TxnId>, bounds: ScanBounds) -> Vec<Vec<u8>> {
        let mut scan = engine.scan("main", txn, bounds).unwrap();
        let mut keys = Vec::new();
        while let Some((key, _)) = scan.next().unwrap() {
            keys.push(key);
        }
        keys
    }

    // ========================================================================
    // Point operations
    // ========================================================================

    #[test]
    fn put_get_delete_autocommit() {
        let engine = open_engine();
        engine.put("main", None, b"k1", b"v1").unwrap();
        assert_eq!(engine.get("main", None, b"k1").unwrap(), Some(b"v1".to_vec()));

        engine.put("main", None, b"k1", b"v1-e").unwrap();
        assert_eq!(engine.get("main", None, b"k1").unwrap(), Some(b"v1-e".to_vec()));

        engine.delete("main", None, b"k1").unwrap();
        assert_eq!(engine.get("main", None, b"k1").unwrap(), None);

        // Deleting an absent key is a no-op.
        engine.delete("main", None, b"nope").unwrap();
        assert_eq!(engine.count("main", None).unwrap(), 0);
    }

    #[test]
    fn operations_fail_when_closed() {
        let engine = open_engine();
        engine.put("main", None, b"k", b"v").unwrap();
        assert!(engine.close().unwrap());
        assert!(matches!(engine.get("main", None, b"k"), Err(EngineError::Closed)));
        assert!(matches!(engine.begin_txn(), Err(EngineError::Closed)));

        // Data survives close/reopen.
        assert!(engine.open().unwrap());
        assert_eq!(engine.get("main", None, b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn unknown_keyspace_is_an_error() {
        let engine = open_engine();
        assert!(matches!(
            engine.get("missing", None, b"k"),
            Err(EngineError::KeyspaceNotFound(_))
        ));
    }

    // ========================================================================
    // Scans
    // ========================================================================

    #[test]
    fn scan_directions_and_bounds() {
        let engine = open_engine();
        for k in [b"a", b"b", b"c", b"d"] {
            engine.put("main", None, k, b"v").unwrap();
        }

        assert_eq!(
            collect(&engine, None, ScanBounds::all(Direction::Forward)),
            vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]
        );
        assert_eq!(
            collect(&engine, None, ScanBounds::all(Direction::Reverse)),
            vec![b"d".to_vec(), b"c".to_vec(), b"b".to_vec(), b"a".to_vec()]
        );
        assert_eq!(
            collect(
                &engine,
                None,
                ScanBounds::new(
                    Bound::Included(b"b".to_vec()),
                    Bound::Excluded(b"d".to_vec()),
                    Direction::Forward,
                )
            ),
            vec![b"b".to_vec(), b"c".to_vec()]
        );
    }

    #[test]
    fn inverted_window_is_empty() {
        let engine = open_engine();
        engine.put("main", None, b"a", b"v").unwrap();
        let bounds = ScanBounds::new(
            Bound::Included(b"z".to_vec()),
            Bound::Included(b"a".to_vec()),
            Direction::Forward,
        );
        assert!(collect(&engine, None, bounds).is_empty());
    }

    #[test]
    fn scan_skips_deleted_keys() {
        let engine = open_engine();
        engine.put("main", None, b"a", b"v").unwrap();
        engine.put("main", None, b"b", b"v").unwrap();
        engine.delete("main", None, b"a").unwrap();
        assert_eq!(collect(&engine, None, ScanBounds::all(Direction::Forward)), vec![b"b".to_vec()]);
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    #[test]
    fn read_your_writes_and_isolation() {
        let engine = open_engine();
        engine.put("main", None, b"k1", b"v1").unwrap();

        let txn = engine.begin_txn().unwrap();
        engine.put("main", Some(txn), b"k2", b"v2").unwrap();
        engine.delete("main", Some(txn), b"k1").unwrap();

        // The transaction sees its own writes...
        assert_eq!(engine.get("main", Some(txn), b"k2").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(engine.get("main", Some(txn), b"k1").unwrap(), None);
        assert_eq!(collect(&engine, Some(txn), ScanBounds::all(Direction::Forward)), vec![
            b"k2".to_vec()
        ]);

        // ...while autocommit readers do not.
        assert_eq!(engine.get("main", None, b"k1").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(engine.get("main", None, b"k2").unwrap(), None);

        engine.commit_txn(txn).unwrap();
        assert_eq!(engine.get("main", None, b"k2").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(engine.get("main", None, b"k1").unwrap(), None);
    }

    #[test]
    fn snapshot_reads_ignore_later_commits() {
        let engine = open_engine();
        engine.put("main", None, b"k", b"old").unwrap();

        let txn = engine.begin_txn().unwrap();
        engine.put("main", None, b"k", b"new").unwrap();

        assert_eq!(engine.get("main", Some(txn), b"k").unwrap(), Some(b"old".to_vec()));
        engine.rollback_txn(txn).unwrap();
    }

    #[test]
    fn disjoint_transactions_both_commit() {
        let engine = open_engine();
        let t1 = engine.begin_txn().unwrap();
        let t2 = engine.begin_txn().unwrap();
        engine.put("main", Some(t1), b"a", b"1").unwrap();
        engine.put("main", Some(t2), b"b", b"2").unwrap();
        engine.commit_txn(t1).unwrap();
        engine.commit_txn(t2).unwrap();
        assert_eq!(engine.count("main", None).unwrap(), 2);
    }

    #[test]
    fn overlapping_commit_conflicts_and_dooms() {
        let engine = open_engine();
        let t1 = engine.begin_txn().unwrap();
        engine.put("main", Some(t1), b"k", b"t1").unwrap();

        let t2 = engine.begin_txn().unwrap();
        engine.put("main", Some(t2), b"k", b"t2").unwrap();

        // t1 still holds an uncommitted write on the same key.
        assert!(matches!(engine.commit_txn(t2), Err(EngineError::Conflict)));

        engine.commit_txn(t1).unwrap();

        // A doomed transaction never gets a second chance.
        assert!(matches!(engine.commit_txn(t2), Err(EngineError::Conflict)));
        assert!(matches!(engine.put("main", Some(t2), b"x", b"y"), Err(EngineError::Conflict)));

        assert_eq!(engine.get("main", None, b"k").unwrap(), Some(b"t1".to_vec()));
    }

    #[test]
    fn commit_after_conflicting_commit_is_rejected() {
        let engine = open_engine();
        let t1 = engine.begin_txn().unwrap();
        engine.put("main", Some(t1), b"k", b"t1").unwrap();
        engine.commit_txn(t1).unwrap();

        // t2 writes a key that an autocommit put touches after t2's snapshot.
        let t2 = engine.begin_txn().unwrap();
        engine.put("main", Some(t2), b"k", b"t2").unwrap();
        engine.put("main", None, b"k", b"autocommit").unwrap();
        assert!(matches!(engine.commit_txn(t2), Err(EngineError::Conflict)));
        assert_eq!(engine.get("main", None, b"k").unwrap(), Some(b"autocommit".to_vec()));
    }

    #[test]
    fn rollback_discards_buffered_writes() {
        let engine = open_engine();
        let txn = engine.begin_txn().unwrap();
        engine.put("main", Some(txn), b"k", b"v").unwrap();
        engine.rollback_txn(txn).unwrap();
        assert_eq!(engine.get("main", None, b"k").unwrap(), None);
        assert!(matches!(engine.rollback_txn(txn), Err(EngineError::UnknownTxn(_))));
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    #[test]
    fn compression_persists_across_close_session_paths_do_not() {
        let engine = open_engine();
        engine.set_config("db.main.compression", ConfigValue::Str("lz4".into())).unwrap();
        engine.set_config("scheduler.threads", ConfigValue::Int(2)).unwrap();

        assert!(engine.close().unwrap());
        assert!(engine.open().unwrap());

        assert_eq!(
            engine.get_config("db.main.compression").unwrap(),
            Some(ConfigValue::Str("lz4".into()))
        );
        assert_eq!(engine.get_config("scheduler.threads").unwrap(), None);
    }

    #[test]
    fn per_keyspace_defaults() {
        let engine = open_engine();
        assert_eq!(engine.get_config("db.main.mmap").unwrap(), Some(ConfigValue::Int(1)));
        assert_eq!(engine.get_config("db.main.sync").unwrap(), Some(ConfigValue::Int(1)));
        assert_eq!(
            engine.get_config("engine.status").unwrap(),
            Some(ConfigValue::Str("online".into()))
        );
    }
}
