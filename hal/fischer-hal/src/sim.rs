//! Simulated GPIO backend
//!
//! Keeps every pin in memory so drivers can be exercised on a host. Tests
//! drive input levels, fire rising edges, inject I/O faults and inspect the
//! ordered log of output writes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::gpio::{EdgeCallback, EdgeInput, Gpio, GpioError, InputPin, Level, OutputPin, Pull};

type SharedCallback = Arc<Mutex<EdgeCallback>>;

#[derive(Default)]
struct Bank {
    claimed: BTreeSet<u8>,
    outputs: BTreeMap<u8, Level>,
    inputs: BTreeMap<u8, Level>,
    callbacks: BTreeMap<u8, SharedCallback>,
    faulty: BTreeSet<u8>,
    history: Vec<(u8, Level)>,
}

impl Bank {
    fn check_fault(&self, pin: u8) -> Result<(), GpioError> {
        if self.faulty.contains(&pin) {
            Err(GpioError::Backend(format!("simulated fault on pin {}", pin)))
        } else {
            Ok(())
        }
    }
}

/// In-memory pin provider
///
/// Clones share the same pin bank, so a test keeps one handle while the
/// robot owns another.
#[derive(Clone, Default)]
pub struct SimGpio {
    bank: Arc<Mutex<Bank>>,
}

impl SimGpio {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    fn bank(&self) -> MutexGuard<'_, Bank> {
        self.bank.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drive an input pin to `level`
    ///
    /// A low-to-high transition fires the pin's edge callback, if armed.
    pub fn set_input(&self, pin: u8, level: Level) {
        let callback = {
            let mut bank = self.bank();
            let previous = bank.inputs.insert(pin, level);
            let rising = level == Level::High && previous != Some(Level::High);
            if rising {
                bank.callbacks.get(&pin).cloned()
            } else {
                None
            }
        };
        if let Some(callback) = callback {
            fire(&callback);
        }
    }

    /// Fire one rising edge on `pin` without changing its resting level
    ///
    /// Returns false if no callback is armed.
    pub fn pulse(&self, pin: u8) -> bool {
        let callback = self.bank().callbacks.get(&pin).cloned();
        match callback {
            Some(callback) => {
                fire(&callback);
                true
            }
            None => false,
        }
    }

    /// Fire `count` rising edges on `pin`
    pub fn pulses(&self, pin: u8, count: usize) {
        for _ in 0..count {
            self.pulse(pin);
        }
    }

    /// Current level of an output pin
    pub fn output_level(&self, pin: u8) -> Option<Level> {
        self.bank().outputs.get(&pin).copied()
    }

    /// Check whether an edge callback is armed on `pin`
    pub fn has_callback(&self, pin: u8) -> bool {
        self.bank().callbacks.contains_key(&pin)
    }

    /// Make every read and write on `pin` fail until cleared
    pub fn inject_fault(&self, pin: u8, faulty: bool) {
        let mut bank = self.bank();
        if faulty {
            bank.faulty.insert(pin);
        } else {
            bank.faulty.remove(&pin);
        }
    }

    /// Ordered log of every successful output write
    pub fn history(&self) -> Vec<(u8, Level)> {
        self.bank().history.clone()
    }

    /// Forget the write log
    pub fn clear_history(&self) {
        self.bank().history.clear();
    }

    fn claim(&self, pin: u8) -> Result<(), GpioError> {
        if self.bank().claimed.insert(pin) {
            Ok(())
        } else {
            Err(GpioError::PinUnavailable(pin))
        }
    }
}

fn fire(callback: &SharedCallback) {
    let mut callback = callback.lock().unwrap_or_else(PoisonError::into_inner);
    (&mut **callback)();
}

impl Gpio for SimGpio {
    type Output = SimOutput;
    type Input = SimInput;

    fn output(&self, pin: u8) -> Result<SimOutput, GpioError> {
        self.claim(pin)?;
        self.bank().outputs.insert(pin, Level::Low);
        Ok(SimOutput {
            id: pin,
            gpio: self.clone(),
        })
    }

    fn input(&self, pin: u8, pull: Pull) -> Result<SimInput, GpioError> {
        self.claim(pin)?;
        let idle = match pull {
            Pull::Up => Level::High,
            Pull::Down | Pull::None => Level::Low,
        };
        self.bank().inputs.entry(pin).or_insert(idle);
        Ok(SimInput {
            id: pin,
            gpio: self.clone(),
        })
    }
}

/// Simulated output pin
pub struct SimOutput {
    id: u8,
    gpio: SimGpio,
}

impl SimOutput {
    fn write(&mut self, level: Level) -> Result<(), GpioError> {
        let mut bank = self.gpio.bank();
        bank.check_fault(self.id)?;
        bank.outputs.insert(self.id, level);
        bank.history.push((self.id, level));
        Ok(())
    }
}

impl OutputPin for SimOutput {
    fn id(&self) -> u8 {
        self.id
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.write(Level::High)
    }

    fn set_low(&mut self) -> Result<(), GpioError> {
        self.write(Level::Low)
    }

    fn is_set_high(&self) -> bool {
        self.gpio.output_level(self.id) == Some(Level::High)
    }
}

/// Simulated input pin
pub struct SimInput {
    id: u8,
    gpio: SimGpio,
}

impl InputPin for SimInput {
    fn id(&self) -> u8 {
        self.id
    }

    fn is_high(&self) -> Result<bool, GpioError> {
        let bank = self.gpio.bank();
        bank.check_fault(self.id)?;
        Ok(bank.inputs.get(&self.id) == Some(&Level::High))
    }
}

impl EdgeInput for SimInput {
    fn on_rising_edge(&mut self, callback: EdgeCallback) -> Result<(), GpioError> {
        let mut bank = self.gpio.bank();
        bank.check_fault(self.id)?;
        if bank.callbacks.contains_key(&self.id) {
            return Err(GpioError::CallbackAlreadyRegistered(self.id));
        }
        bank.callbacks.insert(self.id, Arc::new(Mutex::new(callback)));
        Ok(())
    }

    fn clear_edge_callback(&mut self) -> Result<(), GpioError> {
        self.gpio.bank().callbacks.remove(&self.id);
        Ok(())
    }
}
