//! Board-agnostic core logic for the robot arm controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations or threads:
//!
//! - Motor direction state and the pulse counting sign law
//! - Boundary checks (clockwise hard stop, counterclockwise soft limit)
//! - Configuration type definitions and validation

#![deny(unsafe_code)]

pub mod config;
pub mod safety;
pub mod state;
