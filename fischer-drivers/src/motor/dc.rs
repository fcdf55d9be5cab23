//! DC motor on an H-bridge
//!
//! Two outputs select the drive: positive high for clockwise, negative high
//! for counterclockwise, both low to stop. There is no speed control.
//!
//! # Locking
//!
//! The pins and the running state sit behind one mutex. Commands and the
//! monitor's read-decide-act cycle both hold it, so a command can never
//! slip in between the monitor's boundary check and its stop. The rotation
//! count is an atomic owned by the sensor and is never guarded by this lock.
//!
//! # Usage
//!
//! ```ignore
//! let motor = Motor::new("axis1", positive, negative, limit, rotation, config)?;
//! motor.counterclockwise()?; // Outcome::Moved, or Outcome::Blocked at the soft limit
//! // The monitor stops the motor once the count passes the range.
//! ```

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use fischer_core::safety::{BoundaryMonitor, BoundaryStatus, DEFAULT_POLL_INTERVAL_MS};
use fischer_core::state::{Direction, MotorStatus};
use fischer_hal::{EdgeInput, GpioError, OutputPin};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::link::MotorLink;
use super::monitor::{CancelToken, MonitorHandle};
use crate::sensor::{LimitSwitch, RotationSensor};

/// Errors that can occur with motor operations
#[derive(Debug, Error)]
pub enum MotorError {
    /// I/O layer failure
    #[error(transparent)]
    Gpio(#[from] GpioError),
    /// Monitor thread could not be started
    #[error("failed to spawn monitor thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Result of a movement command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Drive applied
    Moved,
    /// Refused by a boundary guard; nothing changed
    Blocked,
}

/// DC motor configuration
#[derive(Debug, Clone)]
pub struct MotorConfig {
    /// Maximum counterclockwise travel in rotation pulses
    pub range: i32,
    /// Boundary monitor poll period
    pub poll_interval: Duration,
}

impl MotorConfig {
    /// Configuration with the default poll period
    pub fn with_range(range: i32) -> Self {
        Self {
            range,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

struct Drive<O> {
    positive: O,
    negative: O,
    status: MotorStatus,
}

struct Shared<O, I> {
    name: String,
    drive: Mutex<Drive<O>>,
    limit: Arc<LimitSwitch<I>>,
    rotation: Arc<RotationSensor<I>>,
    boundary: BoundaryMonitor,
    link: MotorLink,
}

impl<O: OutputPin, I: EdgeInput> Shared<O, I> {
    fn drive(&self) -> MutexGuard<'_, Drive<O>> {
        self.drive.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Energize one winding
    ///
    /// The opposite pin always goes low before the requested one goes high,
    /// so both are never high together, even on a direct reversal.
    fn energize(&self, drive: &mut Drive<O>, direction: Direction) -> Result<(), MotorError> {
        let (off, on) = match direction {
            Direction::Clockwise => (&mut drive.negative, &mut drive.positive),
            Direction::CounterClockwise => (&mut drive.positive, &mut drive.negative),
            Direction::Idle => return self.halt(drive),
        };

        if let Err(e) = off.set_low().and_then(|()| on.set_high()) {
            warn!("{}: drive write failed ({}), forcing stop", self.name, e);
            // The status ends up matching whichever pin is still high
            let _ = self.halt(drive);
            return Err(e.into());
        }

        drive.status = MotorStatus::driving(direction);
        self.link.publish(direction);
        Ok(())
    }

    /// Drive both pins low and mark the motor idle
    ///
    /// If a write fails the status follows the pin left high, so the
    /// monitor keeps guarding a winding that is still energized.
    fn halt(&self, drive: &mut Drive<O>) -> Result<(), MotorError> {
        let positive = drive.positive.set_low();
        let negative = drive.negative.set_low();

        let result = positive.and(negative);
        let direction = if drive.positive.is_set_high() {
            Direction::Clockwise
        } else if drive.negative.is_set_high() {
            Direction::CounterClockwise
        } else {
            Direction::Idle
        };
        drive.status = MotorStatus::driving(direction);
        self.link.publish(direction);

        if let Err(e) = result {
            error!("{}: stop failed ({}), still {}", self.name, e, direction);
            return Err(e.into());
        }
        Ok(())
    }

    fn clockwise(&self) -> Result<Outcome, MotorError> {
        let mut drive = self.drive();
        if !self.boundary.clockwise_allowed(self.limit.state()?) {
            debug!("{}: clockwise ignored, limit switch reached", self.name);
            return Ok(Outcome::Blocked);
        }
        self.energize(&mut drive, Direction::Clockwise)?;
        debug!("{}: clockwise", self.name);
        Ok(Outcome::Moved)
    }

    fn counterclockwise(&self) -> Result<Outcome, MotorError> {
        let mut drive = self.drive();
        let count = self.rotation.counter();
        if !self.boundary.counterclockwise_allowed(count) {
            debug!(
                "{}: counterclockwise ignored, count {} at range {}",
                self.name,
                count,
                self.boundary.range()
            );
            return Ok(Outcome::Blocked);
        }
        self.energize(&mut drive, Direction::CounterClockwise)?;
        debug!("{}: counterclockwise", self.name);
        Ok(Outcome::Moved)
    }

    fn stop(&self) -> Result<(), MotorError> {
        let mut drive = self.drive();
        self.halt(&mut drive)?;
        debug!("{}: stop", self.name);
        Ok(())
    }

    /// One monitor cycle, holding the drive lock throughout
    fn poll_boundaries(&self) -> Result<BoundaryStatus, MotorError> {
        let mut drive = self.drive();
        if !drive.status.running {
            return Ok(BoundaryStatus::Clear);
        }

        // The switch only matters on the way toward it
        let limit_clear = match drive.status.direction {
            Direction::Clockwise => self.limit.state()?,
            _ => true,
        };
        let count = self.rotation.counter();
        let status = self.boundary.check(drive.status, limit_clear, count);

        if status.resets_counter() {
            self.rotation.reset();
        }
        if status.requires_stop() {
            self.halt(&mut drive)?;
        }

        match status {
            BoundaryStatus::Clear => {}
            BoundaryStatus::HomeReached => {
                info!("{}: limit switch reached, count zeroed", self.name)
            }
            BoundaryStatus::RangeExceeded => warn!(
                "{}: count {} passed range {}, stopped",
                self.name,
                count,
                self.boundary.range()
            ),
        }
        Ok(status)
    }
}

/// DC motor with its boundary monitor
///
/// The monitor thread starts in [`Motor::new`] and runs until
/// [`Motor::shutdown`] or drop.
pub struct Motor<O, I> {
    shared: Arc<Shared<O, I>>,
    monitor: Mutex<Option<MonitorHandle>>,
    token: CancelToken,
}

impl<O, I> Motor<O, I>
where
    O: OutputPin + 'static,
    I: EdgeInput + 'static,
{
    /// Create a stopped motor and start its monitor
    pub fn new(
        name: &str,
        mut positive: O,
        mut negative: O,
        limit: Arc<LimitSwitch<I>>,
        rotation: Arc<RotationSensor<I>>,
        config: MotorConfig,
    ) -> Result<Self, MotorError> {
        positive.set_low()?;
        negative.set_low()?;

        let shared = Arc::new(Shared {
            name: name.to_owned(),
            drive: Mutex::new(Drive {
                positive,
                negative,
                status: MotorStatus::IDLE,
            }),
            limit,
            rotation,
            boundary: BoundaryMonitor::new(config.range),
            link: MotorLink::new(),
        });

        let watched = shared.clone();
        let monitor = MonitorHandle::spawn(name, config.poll_interval, move || {
            if let Err(e) = watched.poll_boundaries() {
                error!("{}: boundary check failed: {}", watched.name, e);
            }
        })
        .map_err(MotorError::Spawn)?;
        let token = monitor.token();

        info!(
            "{}: motor ready (range {}, poll {:?})",
            name, config.range, config.poll_interval
        );

        Ok(Self {
            shared,
            monitor: Mutex::new(Some(monitor)),
            token,
        })
    }

    /// Drive clockwise, toward the limit switch
    ///
    /// Blocked while the limit switch reads the hard stop.
    pub fn clockwise(&self) -> Result<Outcome, MotorError> {
        self.shared.clockwise()
    }

    /// Drive counterclockwise, away from the limit switch
    ///
    /// Blocked once the rotation count has reached the range.
    pub fn counterclockwise(&self) -> Result<Outcome, MotorError> {
        self.shared.counterclockwise()
    }

    /// Drive both pins low
    pub fn stop(&self) -> Result<(), MotorError> {
        self.shared.stop()
    }

    /// Cancel and join the monitor, then stop the motor
    ///
    /// Safe to call more than once.
    pub fn shutdown(&self) -> Result<(), MotorError> {
        let monitor = self
            .monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(monitor) = monitor {
            monitor.shutdown();
        }
        self.stop()
    }
}

impl<O: OutputPin, I: EdgeInput> Motor<O, I> {
    /// Axis name used in logs
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Direction and running flag, read under the drive lock
    pub fn status(&self) -> MotorStatus {
        self.shared.drive().status
    }

    /// Commanded direction
    pub fn direction(&self) -> Direction {
        self.status().direction
    }

    /// Check if a winding is energized
    pub fn is_running(&self) -> bool {
        self.status().running
    }

    /// Counterclockwise range in pulses
    pub fn range(&self) -> i32 {
        self.shared.boundary.range()
    }

    /// Limit switch guarding this motor
    pub fn limit_switch(&self) -> &Arc<LimitSwitch<I>> {
        &self.shared.limit
    }

    /// Rotation sensor counting this motor's pulses
    pub fn rotation_sensor(&self) -> &Arc<RotationSensor<I>> {
        &self.shared.rotation
    }

    /// Direction view for the rotation sensor's back-reference
    pub fn link(&self) -> MotorLink {
        self.shared.link.clone()
    }

    /// Token that cancels this motor's monitor loop
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }
}

impl<O, I> Drop for Motor<O, I> {
    fn drop(&mut self) {
        let monitor = self
            .monitor
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(monitor) = monitor {
            monitor.shutdown();
        }
    }
}
