//! Configuration loading
//!
//! The wiring table comes from a TOML file named on the command line, or
//! from the copy of `arm.toml` compiled into the binary.

mod loader;
mod toml;

pub use loader::{load, LoadError, EMBEDDED_CONFIG};
pub use toml::parse_config;
