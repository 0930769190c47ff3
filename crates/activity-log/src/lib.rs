//! Employee activity log: recorder, bounded event store, query engine, and aggregates.
//!
//! [`ActivityLog`] owns the collection. The [`query`] and [`aggregate`] modules are pure
//! functions over a snapshot and can be used without a log.

pub mod aggregate;
pub mod classify;
mod log;
pub mod query;
mod retention;

pub use activity_types::*;
pub use log::{ActivityLog, ActivityLogError, LogChange, LogConfig, DEFAULT_CAPACITY};
pub use retention::{spawn_retention, RetentionPolicy};
