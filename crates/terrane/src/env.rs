//! The environment: engine lifecycle, keyspace registry, configuration.
//!
//! An [`Environment`] owns an engine behind `Arc<dyn Engine>` and a registry
//! mapping keyspace names to their schemas. Keyspaces must be attached while
//! the environment is closed; handles stay valid across close/reopen cycles.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use terrane_core::Schema;
use terrane_storage::{ConfigValue, Engine, MemoryEngine};
use tracing::{debug, info};

use crate::database::Database;
use crate::error::{Error, Result};
use crate::txn::Transaction;

/// State shared between an environment and every handle it hands out.
pub(crate) struct EnvShared {
    pub(crate) engine: Arc<dyn Engine>,
    registry: RwLock<HashMap<String, Arc<Schema>>>,
}

/// The top-level handle: engine lifecycle, keyspace registry, transactions,
/// and the configuration tree.
#[derive(Clone)]
pub struct Environment {
    shared: Arc<EnvShared>,
}

impl Environment {
    /// Creates an environment over the given engine.
    #[must_use]
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            shared: Arc::new(EnvShared { engine, registry: RwLock::new(HashMap::new()) }),
        }
    }

    /// Creates an environment over a fresh in-process engine.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryEngine::new()))
    }

    fn registry(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Schema>>> {
        self.shared.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attaches a keyspace under `name` with the given schema and returns a
    /// typed handle.
    ///
    /// Attaching is idempotent: re-attaching a registered name with a
    /// compatible schema returns a fresh handle, at any point in the
    /// lifecycle. A name not yet registered can only be attached while the
    /// environment is closed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the name is registered with an
    /// incompatible schema, or when a new name is attached while open.
    pub fn add_database(&self, name: &str, schema: Schema) -> Result<Database> {
        let mut registry = self.shared.registry.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = registry.get(name) {
            if !existing.compatible_with(&schema) {
                return Err(Error::Config(format!(
                    "keyspace `{name}` is already registered with a different schema"
                )));
            }
            return Ok(self.handle(name, Arc::clone(existing)));
        }
        if self.shared.engine.is_open() {
            return Err(Error::Config(format!(
                "cannot add keyspace `{name}` while the environment is open"
            )));
        }
        self.shared.engine.register_keyspace(name)?;
        let schema = Arc::new(schema);
        registry.insert(name.to_owned(), Arc::clone(&schema));
        debug!(keyspace = name, "keyspace registered");
        Ok(self.handle(name, schema))
    }

    /// A handle onto an already-attached keyspace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown name.
    pub fn database(&self, name: &str) -> Result<Database> {
        match self.registry().get(name) {
            Some(schema) => Ok(self.handle(name, Arc::clone(schema))),
            None => Err(Error::Config(format!("unknown keyspace `{name}`"))),
        }
    }

    /// Opens the environment. Returns whether a transition occurred; opening
    /// an already-open environment is a no-op returning `false`.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn open(&self) -> Result<bool> {
        let changed = self.shared.engine.open()?;
        if changed {
            info!(keyspaces = self.registry().len(), "environment opened");
        }
        Ok(changed)
    }

    /// Closes the environment, aborting live transactions and discarding
    /// session-only configuration. Returns whether a transition occurred.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn close(&self) -> Result<bool> {
        let changed = self.shared.engine.close()?;
        if changed {
            info!("environment closed");
        }
        Ok(changed)
    }

    /// Whether the environment is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.engine.is_open()
    }

    /// Creates a lazy transaction handle.
    #[must_use]
    pub fn transaction(&self) -> Transaction {
        Transaction::new(Arc::clone(&self.shared))
    }

    /// Runs `body` inside a transaction: commits when it returns `Ok`, rolls
    /// back when it returns `Err`.
    ///
    /// # Errors
    ///
    /// Returns the body's error, or [`Error::Conflict`]/engine errors from
    /// the commit.
    pub fn with_transaction<T>(&self, body: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
        let txn = self.transaction();
        match body(&txn) {
            Ok(out) => {
                txn.commit()?;
                Ok(out)
            }
            Err(err) => {
                let _ = txn.rollback();
                Err(err)
            }
        }
    }

    /// Reads a configuration path.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn config(&self, path: &str) -> Result<Option<ConfigValue>> {
        Ok(self.shared.engine.get_config(path)?)
    }

    /// Writes a configuration path.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn set_config(&self, path: &str, value: impl Into<ConfigValue>) -> Result<()> {
        self.shared.engine.set_config(path, value.into())?;
        Ok(())
    }

    /// The engine's scheduler thread count, if configured this session.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn scheduler_threads(&self) -> Result<Option<i64>> {
        Ok(self.config("scheduler.threads")?.and_then(|v| v.as_int()))
    }

    /// Configures the engine's scheduler thread count for this session.
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn set_scheduler_threads(&self, threads: i64) -> Result<()> {
        self.set_config("scheduler.threads", ConfigValue::Int(threads))
    }

    /// The engine's lifecycle status string ("online" or "offline").
    ///
    /// # Errors
    ///
    /// Returns engine errors.
    pub fn status(&self) -> Result<String> {
        let status = self.config("engine.status")?.and_then(|v| v.as_str().map(str::to_owned));
        Ok(status.unwrap_or_else(|| "offline".to_owned()))
    }

    fn handle(&self, name: &str, schema: Arc<Schema>) -> Database {
        Database { env: Arc::clone(&self.shared), name: name.to_owned(), schema }
    }
}
