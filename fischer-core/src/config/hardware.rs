//! Hardware configuration types
//!
//! These types define the pin assignment and soft limits for each axis of
//! the arm.

use std::collections::BTreeSet;

use heapless::{String, Vec};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::safety::DEFAULT_POLL_INTERVAL_MS;

/// Number of axes on the arm
pub const MAX_AXES: usize = 4;

/// Maximum axis name length
pub const MAX_LABEL_LEN: usize = 16;

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Default status refresh period for the control console (5 Hz)
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 200;

#[cfg(feature = "serde")]
fn default_pull_up() -> bool {
    true
}

#[cfg(feature = "serde")]
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

#[cfg(feature = "serde")]
fn default_status_interval_ms() -> u64 {
    DEFAULT_STATUS_INTERVAL_MS
}

/// Input pin configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// BCM GPIO number
    pub pin: u8,
    /// Enable internal pull-up
    #[cfg_attr(feature = "serde", serde(default = "default_pull_up"))]
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a floating input
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            pull_up: false,
        }
    }

    /// Create an input with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self { pin, pull_up: true }
    }
}

/// One motor axis: H-bridge inputs, limit switch, rotation sensor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisConfig {
    /// Axis name (e.g. "axis1", "gripper")
    pub name: String<MAX_LABEL_LEN>,
    /// Output driven high for clockwise travel
    pub positive_pin: u8,
    /// Output driven high for counterclockwise travel
    pub negative_pin: u8,
    /// Limit switch at the clockwise hard stop
    pub limit_switch: PinConfig,
    /// Pulse sensor on the motor shaft
    pub rotation_sensor: PinConfig,
    /// Maximum counterclockwise travel in pulses
    pub range: i32,
}

impl AxisConfig {
    /// Every pin number this axis claims
    pub fn pins(&self) -> [u8; 4] {
        [
            self.positive_pin,
            self.negative_pin,
            self.limit_switch.pin,
            self.rotation_sensor.pin,
        ]
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Unsupported format version
    #[error("config version mismatch: found {found}, expected {}", CONFIG_VERSION)]
    VersionMismatch {
        /// Version in the loaded file
        found: u8,
    },
    /// Wrong number of axes
    #[error("expected {} axes, found {0}", MAX_AXES)]
    AxisCount(usize),
    /// Same GPIO used twice
    #[error("GPIO {0} is assigned more than once")]
    DuplicatePin(u8),
    /// Same axis name used twice
    #[error("axis name {0:?} is used more than once")]
    DuplicateName(std::string::String),
    /// Range must be positive
    #[error("axis {0:?} has a non-positive range")]
    InvalidRange(std::string::String),
    /// Monitor poll period must be non-zero
    #[error("poll interval must be greater than zero")]
    InvalidPollInterval,
    /// Status refresh period must be non-zero
    #[error("status interval must be greater than zero")]
    InvalidStatusInterval,
}

/// Complete arm configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArmConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    /// Boundary monitor poll period per motor
    #[cfg_attr(feature = "serde", serde(default = "default_poll_interval_ms"))]
    pub poll_interval_ms: u64,
    /// Console status refresh period
    #[cfg_attr(feature = "serde", serde(default = "default_status_interval_ms"))]
    pub status_interval_ms: u64,
    /// Axis table, in console order
    #[cfg_attr(feature = "serde", serde(rename = "axis"))]
    pub axes: Vec<AxisConfig, MAX_AXES>,
}

/// Build a label, truncating at `MAX_LABEL_LEN`
pub fn label(name: &str) -> String<MAX_LABEL_LEN> {
    let mut out = String::new();
    for c in name.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

fn axis(name: &str, positive: u8, negative: u8, limit: u8, rotation: u8, range: i32) -> AxisConfig {
    AxisConfig {
        name: label(name),
        positive_pin: positive,
        negative_pin: negative,
        limit_switch: PinConfig::with_pullup(limit),
        rotation_sensor: PinConfig::with_pullup(rotation),
        range,
    }
}

impl Default for ArmConfig {
    /// Stock wiring of the arm on a Raspberry Pi (BCM numbering)
    fn default() -> Self {
        let mut axes = Vec::new();
        for a in [
            axis("axis1", 23, 27, 11, 13, 1700),
            axis("axis2", 15, 22, 1, 19, 1500),
            axis("axis3", 18, 10, 0, 5, 200),
            axis("axis4", 17, 9, 12, 6, 28),
        ] {
            // Capacity is MAX_AXES, exactly four pushes
            let _ = axes.push(a);
        }

        Self {
            version: CONFIG_VERSION,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            axes,
        }
    }
}

impl ArmConfig {
    /// Find an axis by name
    pub fn find_axis(&self, name: &str) -> Option<&AxisConfig> {
        self.axes.iter().find(|a| a.name.as_str() == name)
    }

    /// Check the table for wiring and limit mistakes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch {
                found: self.version,
            });
        }

        if self.axes.len() != MAX_AXES {
            return Err(ConfigError::AxisCount(self.axes.len()));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }

        if self.status_interval_ms == 0 {
            return Err(ConfigError::InvalidStatusInterval);
        }

        let mut pins = BTreeSet::new();
        let mut names = BTreeSet::new();
        for axis in &self.axes {
            if !names.insert(axis.name.as_str()) {
                return Err(ConfigError::DuplicateName(axis.name.as_str().into()));
            }
            if axis.range <= 0 {
                return Err(ConfigError::InvalidRange(axis.name.as_str().into()));
            }
            for pin in axis.pins() {
                if !pins.insert(pin) {
                    return Err(ConfigError::DuplicatePin(pin));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_config() {
        let pin = PinConfig::new(10);
        assert_eq!(pin.pin, 10);
        assert!(!pin.pull_up);

        let pullup = PinConfig::with_pullup(4);
        assert!(pullup.pull_up);
    }

    #[test]
    fn test_default_table() {
        let config = ArmConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.poll_interval_ms, 100);

        let axis3 = config.find_axis("axis3").unwrap();
        assert_eq!(axis3.range, 200);
        assert_eq!(axis3.pins(), [18, 10, 0, 5]);
        assert!(axis3.limit_switch.pull_up);

        assert_eq!(config.axes[3].range, 28);
        assert!(config.find_axis("axis9").is_none());
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let mut config = ArmConfig::default();
        config.axes[1].negative_pin = 23;
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(23)));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut config = ArmConfig::default();
        config.axes[2].name = label("axis1");
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateName("axis1".into()))
        );
    }

    #[test]
    fn test_axis_count() {
        let mut config = ArmConfig::default();
        config.axes.pop();
        assert_eq!(config.validate(), Err(ConfigError::AxisCount(3)));
    }

    #[test]
    fn test_range_and_interval() {
        let mut config = ArmConfig::default();
        config.axes[0].range = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange("axis1".into()))
        );

        let mut config = ArmConfig::default();
        config.poll_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPollInterval));

        let mut config = ArmConfig::default();
        config.status_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidStatusInterval));
    }

    #[test]
    fn test_version_mismatch() {
        let config = ArmConfig {
            version: 2,
            ..ArmConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::VersionMismatch { found: 2 })
        );
    }

    #[test]
    fn test_label_truncates() {
        let long = label("a-very-long-axis-name");
        assert_eq!(long.len(), MAX_LABEL_LEN);
        assert_eq!(long.as_str(), "a-very-long-axis");
    }
}
