//! Four-axis robot arm
//!
//! The robot owns every sensor and motor in index-aligned containers. An
//! [`AxisId`] selects the same slot in each. Motors hold shared handles to
//! their sensors; each rotation sensor holds only a [`MotorLink`](crate::MotorLink)
//! back to its motor, so there is no ownership cycle.
//!
//! Construction order matters: sensors, then motors (monitors start here),
//! then the sensor back-references, and only then are the edge callbacks
//! armed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fischer_core::config::{ArmConfig, ConfigError, PinConfig};
use fischer_core::state::MotorStatus;
use fischer_hal::{Gpio, GpioError, Pull};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::motor::{Motor, MotorConfig, MotorError, Outcome};
use crate::sensor::{LimitSwitch, RotationSensor, SensorError};

/// Errors raised while building or commanding the robot
#[derive(Debug, Error)]
pub enum RobotError {
    /// Rejected configuration
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// I/O layer failure
    #[error(transparent)]
    Gpio(#[from] GpioError),
    /// Sensor failure
    #[error(transparent)]
    Sensor(#[from] SensorError),
    /// Motor failure
    #[error(transparent)]
    Motor(#[from] MotorError),
    /// No axis with this index or name
    #[error("unknown axis {0:?}")]
    UnknownAxis(String),
}

/// Index of an axis in the robot's containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AxisId(usize);

impl AxisId {
    /// Zero-based slot
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AxisId {
    /// One-based, as printed on the arm
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// One axis as seen by a status display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisStatus {
    /// Axis slot
    pub id: AxisId,
    /// Configured name
    pub name: String,
    /// Limit switch level, `None` if the read failed
    pub limit_clear: Option<bool>,
    /// Rotation count
    pub count: i32,
    /// Motor state
    pub motor: MotorStatus,
}

fn pull(config: &PinConfig) -> Pull {
    if config.pull_up {
        Pull::Up
    } else {
        Pull::None
    }
}

/// The arm: four motors and their eight sensors
pub struct Robot<G: Gpio> {
    limit_switches: Vec<Arc<LimitSwitch<G::Input>>>,
    rotation_sensors: Vec<Arc<RotationSensor<G::Input>>>,
    motors: Vec<Motor<G::Output, G::Input>>,
    // Declared last: pins above are released before the backend
    gpio: G,
}

impl<G: Gpio> Robot<G> {
    /// Claim every pin in `config` and bring the arm up stopped
    pub fn new(gpio: G, config: &ArmConfig) -> Result<Self, RobotError> {
        config.validate()?;
        let poll_interval = Duration::from_millis(config.poll_interval_ms);

        let mut limit_switches = Vec::with_capacity(config.axes.len());
        let mut rotation_sensors = Vec::with_capacity(config.axes.len());
        for axis in &config.axes {
            let limit = &axis.limit_switch;
            let rotation = &axis.rotation_sensor;
            limit_switches.push(Arc::new(LimitSwitch::new(
                gpio.input(limit.pin, pull(limit))?,
            )));
            rotation_sensors.push(Arc::new(RotationSensor::new(
                gpio.input(rotation.pin, pull(rotation))?,
            )));
        }

        let mut motors = Vec::with_capacity(config.axes.len());
        for (i, axis) in config.axes.iter().enumerate() {
            motors.push(Motor::new(
                axis.name.as_str(),
                gpio.output(axis.positive_pin)?,
                gpio.output(axis.negative_pin)?,
                limit_switches[i].clone(),
                rotation_sensors[i].clone(),
                MotorConfig {
                    range: axis.range,
                    poll_interval,
                },
            )?);
        }

        for (sensor, motor) in rotation_sensors.iter().zip(&motors) {
            sensor.attach(motor.link())?;
        }
        for (i, sensor) in rotation_sensors.iter().enumerate() {
            if let Err(e) = sensor.start() {
                // No callback stays armed on a robot that was never built
                for armed in &rotation_sensors[..i] {
                    if let Err(stop) = armed.stop() {
                        warn!("Rotation sensor GPIO{}: {}", armed.pin(), stop);
                    }
                }
                return Err(e.into());
            }
        }

        info!("Robot ready with {} axes", motors.len());
        Ok(Self {
            limit_switches,
            rotation_sensors,
            motors,
            gpio,
        })
    }

    /// The I/O backend the robot was built on
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Number of axes
    pub fn len(&self) -> usize {
        self.motors.len()
    }

    /// Check if the robot has no axes
    pub fn is_empty(&self) -> bool {
        self.motors.is_empty()
    }

    /// Every axis, in configuration order
    pub fn axes(&self) -> impl Iterator<Item = AxisId> {
        (0..self.motors.len()).map(AxisId)
    }

    /// Axis at zero-based `index`
    pub fn axis(&self, index: usize) -> Option<AxisId> {
        (index < self.motors.len()).then_some(AxisId(index))
    }

    /// Axis with the configured `name`
    pub fn find(&self, name: &str) -> Option<AxisId> {
        self.motors.iter().position(|m| m.name() == name).map(AxisId)
    }

    /// Resolve a one-based number or a name
    pub fn resolve(&self, key: &str) -> Result<AxisId, RobotError> {
        let by_number = key
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.axis(i));

        by_number
            .or_else(|| self.find(key))
            .ok_or_else(|| RobotError::UnknownAxis(key.to_owned()))
    }

    /// Motor of `id`
    pub fn motor(&self, id: AxisId) -> &Motor<G::Output, G::Input> {
        &self.motors[id.0]
    }

    /// Limit switch of `id`
    pub fn limit_switch(&self, id: AxisId) -> &LimitSwitch<G::Input> {
        &self.limit_switches[id.0]
    }

    /// Rotation sensor of `id`
    pub fn rotation_sensor(&self, id: AxisId) -> &RotationSensor<G::Input> {
        &self.rotation_sensors[id.0]
    }

    /// Drive every axis clockwise toward its limit switch
    ///
    /// Each motor is commanded independently and stopped by its own
    /// monitor; this call does not wait. Axes already at the hard stop are
    /// left alone. Every axis is tried even if one fails; the first error
    /// is returned.
    pub fn auto_home(&self) -> Result<(), RobotError> {
        info!("Auto home");
        self.for_each_motor(|motor| {
            if motor.clockwise()? == Outcome::Blocked {
                debug!("{}: already home", motor.name());
            }
            Ok(())
        })
    }

    /// Stop every motor
    pub fn stop_all(&self) -> Result<(), RobotError> {
        self.for_each_motor(|motor| motor.stop())
    }

    /// Snapshot of every axis for display
    pub fn status(&self) -> Vec<AxisStatus> {
        self.axes()
            .map(|id| {
                let motor = self.motor(id);
                let limit_clear = match self.limit_switch(id).state() {
                    Ok(clear) => Some(clear),
                    Err(e) => {
                        warn!("{}: limit switch read failed: {}", motor.name(), e);
                        None
                    }
                };
                AxisStatus {
                    id,
                    name: motor.name().to_owned(),
                    limit_clear,
                    count: self.rotation_sensor(id).counter(),
                    motor: motor.status(),
                }
            })
            .collect()
    }

    /// Stop monitors and motors and disarm the sensors
    ///
    /// Process exit does the same implicitly; this makes it deterministic.
    pub fn shutdown(&self) -> Result<(), RobotError> {
        let motors = self.for_each_motor(|motor| motor.shutdown());
        let mut sensors = Ok(());
        for sensor in &self.rotation_sensors {
            if let Err(e) = sensor.stop() {
                warn!("Rotation sensor GPIO{}: {}", sensor.pin(), e);
                sensors = sensors.and(Err(e));
            }
        }
        motors?;
        sensors?;
        debug!("Robot shut down");
        Ok(())
    }

    fn for_each_motor<F>(&self, mut command: F) -> Result<(), RobotError>
    where
        F: FnMut(&Motor<G::Output, G::Input>) -> Result<(), MotorError>,
    {
        let mut first = Ok(());
        for motor in &self.motors {
            if let Err(e) = command(motor) {
                warn!("{}: {}", motor.name(), e);
                if first.is_ok() {
                    first = Err(e);
                }
            }
        }
        first.map_err(RobotError::from)
    }
}

impl<G: Gpio> Drop for Robot<G> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Robot shutdown incomplete: {}", e);
        }
    }
}
