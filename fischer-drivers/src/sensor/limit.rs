//! Limit switch at the clockwise hard stop

use std::sync::{Mutex, PoisonError};

use fischer_hal::{GpioError, InputPin};

/// Boundary contact wired to a pull-up input
///
/// Reads high while the arm is clear to keep moving clockwise and low once
/// the hard stop is reached. Holds no state beyond the pin.
pub struct LimitSwitch<I> {
    id: u8,
    pin: Mutex<I>,
}

impl<I: InputPin> LimitSwitch<I> {
    /// Wrap a configured input pin
    pub fn new(pin: I) -> Self {
        Self {
            id: pin.id(),
            pin: Mutex::new(pin),
        }
    }

    /// GPIO number of the switch
    pub fn pin(&self) -> u8 {
        self.id
    }

    /// True while the arm may move further clockwise
    pub fn state(&self) -> Result<bool, GpioError> {
        self.pin
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_high()
    }
}
