//! GPIO pin provider backed by `rppal`

use fischer_hal::embedded::EmbeddedOutput;
use fischer_hal::{EdgeCallback, EdgeInput, Gpio, GpioError, InputPin, Pull};
use rppal::gpio as rgpio;
use tracing::debug;

/// Number of BCM GPIO lines broken out on the 40-pin header
pub const GPIO_COUNT: u8 = 28;

fn backend_error(e: rgpio::Error) -> GpioError {
    match e {
        rgpio::Error::PinNotAvailable(pin) | rgpio::Error::PinUsed(pin) => {
            GpioError::PinUnavailable(pin)
        }
        other => GpioError::Backend(other.to_string()),
    }
}

/// Raspberry Pi pin provider
///
/// Opens the GPIO peripheral once; every pin claimed through it is released
/// (and reset to input) when the pin is dropped.
#[derive(Clone)]
pub struct RpiGpio {
    gpio: rgpio::Gpio,
}

impl RpiGpio {
    /// Open the GPIO peripheral
    pub fn new() -> Result<Self, GpioError> {
        let gpio = rgpio::Gpio::new().map_err(backend_error)?;
        Ok(Self { gpio })
    }

    fn claim(&self, pin: u8) -> Result<rgpio::Pin, GpioError> {
        if pin >= GPIO_COUNT {
            return Err(GpioError::PinUnavailable(pin));
        }
        self.gpio.get(pin).map_err(backend_error)
    }
}

impl Gpio for RpiGpio {
    type Output = RpiOutput;
    type Input = RpiInput;

    fn output(&self, pin: u8) -> Result<RpiOutput, GpioError> {
        let out = self.claim(pin)?.into_output_low();
        debug!("GPIO{} configured as output", pin);
        EmbeddedOutput::new(pin, out)
    }

    fn input(&self, pin: u8, pull: Pull) -> Result<RpiInput, GpioError> {
        let raw = self.claim(pin)?;
        let pin = match pull {
            Pull::Up => raw.into_input_pullup(),
            Pull::Down => raw.into_input_pulldown(),
            Pull::None => raw.into_input(),
        };
        debug!("GPIO{} configured as input ({:?})", pin.pin(), pull);
        Ok(RpiInput { pin, armed: false })
    }
}

/// Output pin on the Pi header, driven through rppal's `embedded-hal` impl
pub type RpiOutput = EmbeddedOutput<rgpio::OutputPin>;

/// Input pin on the Pi header
pub struct RpiInput {
    pin: rgpio::InputPin,
    armed: bool,
}

impl InputPin for RpiInput {
    fn id(&self) -> u8 {
        self.pin.pin()
    }

    fn is_high(&self) -> Result<bool, GpioError> {
        Ok(self.pin.is_high())
    }
}

impl EdgeInput for RpiInput {
    fn on_rising_edge(&mut self, mut callback: EdgeCallback) -> Result<(), GpioError> {
        // rppal silently replaces an armed interrupt, so track it here
        if self.armed {
            return Err(GpioError::CallbackAlreadyRegistered(self.id()));
        }
        self.pin
            .set_async_interrupt(rgpio::Trigger::RisingEdge, None, move |_event| callback())
            .map_err(backend_error)?;
        self.armed = true;
        Ok(())
    }

    fn clear_edge_callback(&mut self) -> Result<(), GpioError> {
        if self.armed {
            self.pin.clear_async_interrupt().map_err(backend_error)?;
            self.armed = false;
        }
        Ok(())
    }
}
