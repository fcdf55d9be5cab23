//! Configuration source selection

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fischer_core::config::{ArmConfig, ConfigError};
use thiserror::Error;
use tracing::{debug, info};

use super::toml::parse_config;

/// Embedded default configuration (compiled into the binary)
/// Edit arm.toml and rebuild to customize
pub const EMBEDDED_CONFIG: &str = include_str!("../../arm.toml");

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] ::toml::de::Error),
    /// Parsed table failed validation
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Load the configuration from `path`, or the embedded default
pub fn load(path: Option<&Path>) -> Result<ArmConfig, LoadError> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_owned(),
                source,
            })?;
            parse_config(&text)?
        }
        None => {
            info!("Using embedded configuration");
            parse_config(EMBEDDED_CONFIG)?
        }
    };

    log_config_summary(&config);
    Ok(config)
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &ArmConfig) {
    info!(
        "Configuration loaded: {} axes, monitor every {} ms",
        config.axes.len(),
        config.poll_interval_ms
    );
    for axis in &config.axes {
        debug!(
            "  {}: +GPIO{} -GPIO{} limit GPIO{} rotation GPIO{} range {}",
            axis.name,
            axis.positive_pin,
            axis.negative_pin,
            axis.limit_switch.pin,
            axis.rotation_sensor.pin,
            axis.range
        );
    }
}
