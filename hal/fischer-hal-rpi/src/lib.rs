//! Raspberry Pi backend for the arm controller
//!
//! This crate implements the shared `fischer-hal` traits on top of `rppal`:
//!
//! - Pin claiming with BCM range checks
//! - Push-pull outputs for the H-bridge inputs
//! - Pull-up inputs for limit switches and pulse sensors
//! - Asynchronous rising-edge interrupts (serviced on rppal's interrupt thread)

#![deny(unsafe_code)]

pub mod gpio;

pub use gpio::{RpiGpio, RpiInput, RpiOutput};

// Re-export shared traits from fischer-hal for convenience
pub use fischer_hal::{EdgeInput, Gpio, InputPin, OutputPin};
