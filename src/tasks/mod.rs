//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the life of a cache.
//!
//! # Tasks
//! - Cleanup: removes expired entries and evicts down to capacity

mod cleanup;

pub use cleanup::{sweep, CleanupScheduler, SweepReport};
