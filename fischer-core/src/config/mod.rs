//! Configuration types
//!
//! Static wiring table and soft limits, loaded once at startup. Changing
//! pins or ranges never touches driver logic.

pub mod hardware;

pub use hardware::*;
