//! Safety monitoring
//!
//! Decides when a running motor has reached a boundary and must stop.

pub mod monitor;

pub use monitor::{BoundaryMonitor, BoundaryStatus, DEFAULT_POLL_INTERVAL_MS};
