//! Motor direction state
//!
//! A motor is either idle or driven full-on in one of two directions.

pub mod machine;

pub use machine::{Direction, MotorStatus};
