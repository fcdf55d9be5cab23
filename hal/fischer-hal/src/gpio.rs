//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by board-specific backends, plus rising-edge callback registration for
//! pulse inputs.

use thiserror::Error;

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Check if this is the high level
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Input bias resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pull {
    /// Floating input
    None,
    /// Internal pull-up (idle level is high)
    #[default]
    Up,
    /// Internal pull-down (idle level is low)
    Down,
}

/// Errors raised by the I/O layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpioError {
    /// Pin does not exist or is already claimed
    #[error("GPIO pin {0} is not available")]
    PinUnavailable(u8),
    /// An edge callback is already armed on this pin
    #[error("GPIO pin {0} already has an edge callback registered")]
    CallbackAlreadyRegistered(u8),
    /// Backend-specific failure
    #[error("GPIO backend error: {0}")]
    Backend(String),
}

/// Callback invoked by the I/O layer on a rising edge
///
/// Runs on the backend's interrupt thread, so it must be short and must not
/// block on locks held by application threads.
pub type EdgeCallback = Box<dyn FnMut() + Send + 'static>;

/// Digital output pin
pub trait OutputPin: Send {
    /// Pin number as known to the backend
    fn id(&self) -> u8;

    /// Set the pin high (logic 1)
    fn set_high(&mut self) -> Result<(), GpioError>;

    /// Set the pin low (logic 0)
    fn set_low(&mut self) -> Result<(), GpioError>;

    /// Set the pin to a specific level
    fn set_level(&mut self, level: Level) -> Result<(), GpioError> {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin: Send {
    /// Pin number as known to the backend
    fn id(&self) -> u8;

    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> Result<bool, GpioError>;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> Result<bool, GpioError> {
        self.is_high().map(|high| !high)
    }
}

/// Input pin that can notify on rising edges
pub trait EdgeInput: InputPin {
    /// Arm `callback` for every rising edge on this pin
    ///
    /// Registering while a callback is already armed is an error; the
    /// caller must [`clear_edge_callback`](Self::clear_edge_callback) first.
    fn on_rising_edge(&mut self, callback: EdgeCallback) -> Result<(), GpioError>;

    /// Remove the armed callback (no-op if none is armed)
    fn clear_edge_callback(&mut self) -> Result<(), GpioError>;
}

/// Pin provider
///
/// Created once at process start and handed to the robot, which claims
/// every pin it needs during construction.
pub trait Gpio {
    /// Output pin type produced by this backend
    type Output: OutputPin + 'static;
    /// Input pin type produced by this backend
    type Input: EdgeInput + 'static;

    /// Claim `pin` as an output, initially driven low
    fn output(&self, pin: u8) -> Result<Self::Output, GpioError>;

    /// Claim `pin` as an input with the given bias
    fn input(&self, pin: u8, pull: Pull) -> Result<Self::Input, GpioError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch {
        high: bool,
    }

    impl OutputPin for Latch {
        fn id(&self) -> u8 {
            7
        }

        fn set_high(&mut self) -> Result<(), GpioError> {
            self.high = true;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), GpioError> {
            self.high = false;
            Ok(())
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_level_from_bool() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert!(Level::High.is_high());
        assert!(!Level::Low.is_high());
    }

    #[test]
    fn test_set_level_dispatches() {
        let mut pin = Latch { high: false };
        pin.set_level(Level::High).unwrap();
        assert!(pin.is_set_high());
        pin.set_level(Level::Low).unwrap();
        assert!(pin.is_set_low());
    }

    #[test]
    fn test_default_pull_is_up() {
        assert_eq!(Pull::default(), Pull::Up);
    }
}
