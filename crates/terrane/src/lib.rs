//! terrane
//!
//! A schema-typed client layer over an embedded ordered key-value engine.
//!
//! Keyspaces are declared with composite, typed keys and values; rows are
//! packed into order-preserving byte strings so range reads and cursor walks
//! traverse in tuple order, including per-field descending order. Writes are
//! either autocommitted or batched in optimistic transactions that detect
//! conflicts at commit.
//!
//! # Quick start
//!
//! ```
//! use terrane::{Environment, Field, Schema, Value};
//!
//! # fn main() -> terrane::Result<()> {
//! let env = Environment::in_memory();
//! let db = env.add_database(
//!     "events",
//!     Schema::new(
//!         vec![Field::u64(), Field::string()],
//!         vec![Field::string()],
//!     )?,
//! )?;
//! env.open()?;
//!
//! db.set((1_u64, "login"), "alice")?;
//! db.set((2_u64, "logout"), "alice")?;
//!
//! let row = db.get((1_u64, "login"))?;
//! assert_eq!(row, vec![Value::from("alice")]);
//!
//! for item in db.get_range(Some(1_u64), None::<u64>, false)? {
//!     let (key, value) = item?;
//!     println!("{key:?} => {value:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`env`] - engine lifecycle, keyspace registry, configuration
//! - [`database`] - typed keyspace handles
//! - [`txn`] - optimistic transactions
//! - [`cursor`] - streaming row iterators and cursor options
//! - [`error`] - the client-layer failure taxonomy
//!
//! Schemas and field codecs live in [`terrane_core`]; the engine contract
//! and the in-process backend live in [`terrane_storage`].

pub mod cursor;
pub mod database;
pub mod env;
pub mod error;
mod range;
pub mod txn;

pub use cursor::{CursorOptions, KeyRows, Order, Rows, ValueRows};
pub use database::Database;
pub use env::Environment;
pub use error::{Error, Result};
pub use txn::{Transaction, TransactionalDatabase};

pub use terrane_core::{CoreError, Field, IntWidth, IntoRow, Schema, Value};
pub use terrane_storage::{ConfigValue, Engine, EngineError, MemoryEngine};
