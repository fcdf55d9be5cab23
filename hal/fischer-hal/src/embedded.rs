//! `embedded-hal` adapter
//!
//! Wraps any `embedded-hal` 1.0 digital output so it can serve as a motor
//! drive pin. Useful for port expanders and other drivers that already
//! speak `embedded-hal`.

use embedded_hal::digital::{self, Error as _};

use crate::gpio::{GpioError, OutputPin};

/// Output pin backed by an `embedded-hal` implementation
pub struct EmbeddedOutput<P> {
    pin: P,
    id: u8,
    high: bool,
}

impl<P: digital::OutputPin> EmbeddedOutput<P> {
    /// Wrap `pin`, driving it low first
    pub fn new(id: u8, mut pin: P) -> Result<Self, GpioError> {
        pin.set_low().map_err(backend_error)?;
        Ok(Self {
            pin,
            id,
            high: false,
        })
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

fn backend_error<E: digital::Error>(e: E) -> GpioError {
    GpioError::Backend(format!("{:?}", e.kind()))
}

impl<P: digital::OutputPin + Send> OutputPin for EmbeddedOutput<P> {
    fn id(&self) -> u8 {
        self.id
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.pin.set_high().map_err(backend_error)?;
        self.high = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), GpioError> {
        self.pin.set_low().map_err(backend_error)?;
        self.high = false;
        Ok(())
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct FakePin {
        writes: Vec<bool>,
    }

    impl digital::ErrorType for FakePin {
        type Error = Infallible;
    }

    impl digital::OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.writes.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.writes.push(true);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl digital::Error for Broken {
        fn kind(&self) -> digital::ErrorKind {
            digital::ErrorKind::Other
        }
    }

    struct BrokenPin;

    impl digital::ErrorType for BrokenPin {
        type Error = Broken;
    }

    impl digital::OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Broken> {
            Err(Broken)
        }

        fn set_high(&mut self) -> Result<(), Broken> {
            Err(Broken)
        }
    }

    #[test]
    fn test_wrap_drives_low() {
        let out = EmbeddedOutput::new(4, FakePin::default()).unwrap();
        assert!(out.is_set_low());
        assert_eq!(out.id(), 4);
        assert_eq!(out.into_inner().writes, vec![false]);
    }

    #[test]
    fn test_writes_track_level() {
        let mut out = EmbeddedOutput::new(4, FakePin::default()).unwrap();
        out.set_high().unwrap();
        assert!(out.is_set_high());
        out.set_low().unwrap();
        assert!(out.is_set_low());
        assert_eq!(out.into_inner().writes, vec![false, true, false]);
    }

    #[test]
    fn test_backend_error_is_mapped() {
        let result = EmbeddedOutput::new(9, BrokenPin);
        assert!(matches!(result, Err(GpioError::Backend(_))));
    }
}
