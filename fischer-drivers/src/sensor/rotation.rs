//! Rotation pulse counter
//!
//! One rising edge per pulse from the shaft sensor. The sign of each pulse
//! comes from the owning motor's commanded direction at the moment the edge
//! arrives: clockwise counts down, counterclockwise counts up, idle is
//! ignored.
//!
//! There is no quadrature input, so a motor that coasts or is back-driven
//! against its command is miscounted. The count is re-referenced to zero
//! each time the axis reaches its clockwise hard stop.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use fischer_core::state::Direction;
use fischer_hal::{EdgeInput, GpioError};
use thiserror::Error;
use tracing::debug;

use crate::motor::MotorLink;

/// Errors that can occur with sensor operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// I/O layer failure
    #[error(transparent)]
    Gpio(#[from] GpioError),
    /// `start()` called while counting is already armed
    #[error("rotation sensor on GPIO {0} is already started")]
    AlreadyStarted(u8),
    /// `start()` called before the owning motor was attached
    #[error("rotation sensor on GPIO {0} has no motor attached")]
    Detached(u8),
    /// Owning motor can only be attached once
    #[error("rotation sensor on GPIO {0} already has a motor attached")]
    AlreadyAttached(u8),
}

/// Apply one pulse to `count`
///
/// Runs on the I/O backend's interrupt thread: a single atomic update.
fn count_edge(count: &AtomicI32, direction: Direction) {
    let delta = direction.count_delta();
    if delta != 0 {
        count.fetch_add(delta, Ordering::SeqCst);
    }
}

/// Edge-counted rotation sensor
pub struct RotationSensor<I> {
    id: u8,
    pin: Mutex<I>,
    count: Arc<AtomicI32>,
    motor: OnceLock<MotorLink>,
    armed: AtomicBool,
}

impl<I: EdgeInput> RotationSensor<I> {
    /// Wrap a configured input pin; counting starts with [`start`](Self::start)
    pub fn new(pin: I) -> Self {
        Self {
            id: pin.id(),
            pin: Mutex::new(pin),
            count: Arc::new(AtomicI32::new(0)),
            motor: OnceLock::new(),
            armed: AtomicBool::new(false),
        }
    }

    fn pin_guard(&self) -> MutexGuard<'_, I> {
        self.pin.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// GPIO number of the sensor
    pub fn pin(&self) -> u8 {
        self.id
    }

    /// Wire the back-reference to the owning motor
    ///
    /// Set once, before [`start`](Self::start); never reassigned.
    pub fn attach(&self, motor: MotorLink) -> Result<(), SensorError> {
        self.motor
            .set(motor)
            .map_err(|_| SensorError::AlreadyAttached(self.id))
    }

    /// Zero the count and arm the rising-edge callback
    ///
    /// Fails with [`SensorError::Detached`] if no motor is attached yet and
    /// with [`SensorError::AlreadyStarted`] if already armed.
    pub fn start(&self) -> Result<(), SensorError> {
        let motor = self
            .motor
            .get()
            .cloned()
            .ok_or(SensorError::Detached(self.id))?;

        if self.armed.swap(true, Ordering::SeqCst) {
            return Err(SensorError::AlreadyStarted(self.id));
        }

        self.count.store(0, Ordering::SeqCst);
        let count = self.count.clone();
        let armed = self
            .pin_guard()
            .on_rising_edge(Box::new(move || count_edge(&count, motor.direction())));

        if let Err(e) = armed {
            self.armed.store(false, Ordering::SeqCst);
            return Err(e.into());
        }

        debug!("Rotation sensor GPIO{} armed", self.id);
        Ok(())
    }

    /// Disarm the callback; the count keeps its last value
    pub fn stop(&self) -> Result<(), SensorError> {
        if self.armed.load(Ordering::SeqCst) {
            self.pin_guard().clear_edge_callback()?;
            self.armed.store(false, Ordering::SeqCst);
            debug!("Rotation sensor GPIO{} disarmed", self.id);
        }
        Ok(())
    }

    /// Check if the edge callback is armed
    pub fn is_started(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Current signed pulse count
    pub fn counter(&self) -> i32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Zero the count
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fischer_hal::sim::{SimGpio, SimInput};
    use fischer_hal::{Gpio, Pull};
    use proptest::prelude::*;
    use std::thread;

    const PIN: u8 = 13;

    fn sensor(gpio: &SimGpio) -> RotationSensor<SimInput> {
        RotationSensor::new(gpio.input(PIN, Pull::Up).unwrap())
    }

    fn started(gpio: &SimGpio) -> (RotationSensor<SimInput>, MotorLink) {
        let sensor = sensor(gpio);
        let link = MotorLink::new();
        sensor.attach(link.clone()).unwrap();
        sensor.start().unwrap();
        (sensor, link)
    }

    #[test]
    fn test_start_requires_motor() {
        let gpio = SimGpio::new();
        let sensor = sensor(&gpio);
        assert_eq!(sensor.start(), Err(SensorError::Detached(PIN)));
        assert!(!gpio.has_callback(PIN));
    }

    #[test]
    fn test_attach_once() {
        let gpio = SimGpio::new();
        let sensor = sensor(&gpio);
        sensor.attach(MotorLink::new()).unwrap();
        assert_eq!(
            sensor.attach(MotorLink::new()),
            Err(SensorError::AlreadyAttached(PIN))
        );
    }

    #[test]
    fn test_double_start_fails_loudly() {
        let gpio = SimGpio::new();
        let (sensor, _link) = started(&gpio);
        assert_eq!(sensor.start(), Err(SensorError::AlreadyStarted(PIN)));
        assert!(sensor.is_started());
    }

    #[test]
    fn test_start_zeroes_count() {
        let gpio = SimGpio::new();
        let (sensor, link) = started(&gpio);
        link.publish(Direction::CounterClockwise);
        gpio.pulses(PIN, 4);
        assert_eq!(sensor.counter(), 4);

        sensor.stop().unwrap();
        assert_eq!(sensor.counter(), 4);
        sensor.start().unwrap();
        assert_eq!(sensor.counter(), 0);
    }

    #[test]
    fn test_stop_disarms() {
        let gpio = SimGpio::new();
        let (sensor, link) = started(&gpio);
        link.publish(Direction::CounterClockwise);

        sensor.stop().unwrap();
        assert!(!sensor.is_started());
        assert!(!gpio.pulse(PIN));
        assert_eq!(sensor.counter(), 0);

        // Stopping an idle sensor is a no-op
        sensor.stop().unwrap();
    }

    #[test]
    fn test_reset() {
        let gpio = SimGpio::new();
        let (sensor, link) = started(&gpio);
        link.publish(Direction::Clockwise);
        gpio.pulses(PIN, 9);
        assert_eq!(sensor.counter(), -9);
        sensor.reset();
        assert_eq!(sensor.counter(), 0);
    }

    #[test]
    fn test_concurrent_edges_and_reset() {
        let gpio = SimGpio::new();
        let (sensor, link) = started(&gpio);
        link.publish(Direction::CounterClockwise);

        let pulser = {
            let gpio = gpio.clone();
            thread::spawn(move || gpio.pulses(PIN, 10_000))
        };
        for _ in 0..100 {
            sensor.reset();
            thread::yield_now();
        }
        pulser.join().unwrap();

        // Every pulse after the last reset is counted exactly once
        let after_reset = sensor.counter();
        assert!((0..=10_000).contains(&after_reset));

        sensor.reset();
        gpio.pulses(PIN, 25);
        assert_eq!(sensor.counter(), 25);
    }

    #[test]
    fn test_concurrent_edges_are_not_lost() {
        let gpio = SimGpio::new();
        let (sensor, link) = started(&gpio);
        link.publish(Direction::CounterClockwise);

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let gpio = gpio.clone();
                thread::spawn(move || gpio.pulses(PIN, 2_500))
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(sensor.counter(), 10_000);
    }

    proptest! {
        #[test]
        fn prop_sign_law(
            pulses in proptest::collection::vec((0u8..3, 0usize..50), 0..20)
        ) {
            let gpio = SimGpio::new();
            let (sensor, link) = started(&gpio);
            let mut expected = 0i32;

            for (raw, n) in pulses {
                let direction = Direction::from_u8(raw);
                link.publish(direction);
                gpio.pulses(PIN, n);
                expected += direction.count_delta() * n as i32;
                prop_assert_eq!(sensor.counter(), expected);
            }
        }
    }
}
