//! Fischer Hardware Abstraction Layer
//!
//! This crate defines the digital I/O capability consumed by the arm
//! drivers. Board backends implement the traits; the drivers never touch
//! a GPIO register or character device directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers (fischer-drivers)              │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  fischer-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ fischer-hal-  │       │  sim (tests)  │
//! │     rpi       │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`gpio::EdgeInput`] - Rising-edge callback registration
//! - [`gpio::Gpio`] - Pin provider (configures pins as input or output)

#![deny(unsafe_code)]

pub mod embedded;
pub mod gpio;
#[cfg(feature = "sim")]
pub mod sim;

// Re-export key traits at crate root for convenience
pub use gpio::{EdgeCallback, EdgeInput, Gpio, GpioError, InputPin, Level, OutputPin, Pull};
