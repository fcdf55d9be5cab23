//! Sensor implementations
//!
//! - Limit switch: level-read boundary contact
//! - Rotation sensor: rising-edge pulse counter

pub mod limit;
pub mod rotation;

pub use limit::LimitSwitch;
pub use rotation::{RotationSensor, SensorError};
