//! Motor driver implementation
//!
//! - DC motor on an H-bridge: full-on clockwise, full-on counterclockwise,
//!   or both inputs low
//! - Background boundary monitor with a cancellation token
//! - Lock-free direction link read by the rotation sensor

pub mod dc;
pub mod link;
pub mod monitor;

pub use dc::{Motor, MotorConfig, MotorError, Outcome};
pub use link::MotorLink;
pub use monitor::{CancelToken, MonitorHandle};
