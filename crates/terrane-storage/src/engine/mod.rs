//! Engine contract types.
//!
//! This module defines what terrane requires from a storage engine:
//!
//! - [`Engine`] - lifecycle, keyspace registry, point ops, scans,
//!   transactions, and configuration
//! - [`EngineScan`] - streaming range-scan handle
//! - [`EngineError`] - the engine-side failure taxonomy

mod error;
mod traits;

pub use error::{EngineError, EngineResult};
pub use traits::{ConfigValue, Direction, Engine, EngineScan, ScanBounds, TxnId};
