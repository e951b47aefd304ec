//! terrane-storage
//!
//! The storage-engine collaborator contract for terrane, plus the default
//! in-process backend.
//!
//! # Overview
//!
//! The client layer consumes the engine through a deliberately narrow
//! primitive interface: point put/get/delete, bounded range scans,
//! begin/commit/rollback of optimistic transactions, and a string-path
//! configuration tree. Everything else — durability, compaction, on-disk
//! format — is the engine's own business and never leaks through this crate.
//!
//! # Core items
//!
//! - [`Engine`] - the object-safe collaborator contract
//! - [`EngineScan`] - one-pair-at-a-time range scan streaming
//! - [`MemoryEngine`] - ordered in-process backend with MVCC snapshots and
//!   commit-time conflict detection
//!
//! # Error Handling
//!
//! All operations return [`EngineResult<T>`], an alias for
//! `Result<T, EngineError>`. Conflict rejections at commit surface as
//! [`EngineError::Conflict`] and are never retried here.

pub mod backends;
pub mod engine;

pub use backends::MemoryEngine;
pub use engine::{
    ConfigValue, Direction, Engine, EngineError, EngineResult, EngineScan, ScanBounds, TxnId,
};
