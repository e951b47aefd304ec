//! Storage backend implementations.
//!
//! # Available backends
//!
//! - [`memory`] - ordered in-process store with MVCC snapshots and
//!   commit-time conflict detection

pub mod memory;

pub use self::memory::MemoryEngine;
