//! Hardware driver implementations
//!
//! This crate provides the arm's moving parts on top of the `fischer-hal`
//! digital I/O traits:
//!
//! - Rotation sensor (edge-counted pulses, signed by commanded direction)
//! - Limit switch (clockwise hard stop)
//! - DC motor on two H-bridge inputs, with a background boundary monitor
//! - Robot: four axes wired from the configuration table
//!
//! # Threads
//!
//! Each motor runs one monitor thread for its whole lifetime. Rotation
//! pulses arrive on the I/O backend's interrupt thread. Commands may come
//! from any other thread. Each motor's drive state sits behind its own
//! mutex; rotation counts are atomics and never take that mutex.

#![deny(unsafe_code)]

pub mod motor;
pub mod robot;
pub mod sensor;

pub use motor::{CancelToken, MonitorHandle, Motor, MotorConfig, MotorError, MotorLink, Outcome};
pub use robot::{AxisId, AxisStatus, Robot, RobotError};
pub use sensor::{LimitSwitch, RotationSensor, SensorError};

#[cfg(test)]
pub(crate) mod testing {
    use std::thread;
    use std::time::{Duration, Instant};

    /// Poll `condition` until it holds or `timeout` passes
    pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        condition()
    }
}
