//! Status LED driven over any `embedded-hal` output pin.

use embedded_hal::digital::OutputPin;

use crate::error::Error;

/// LED with a configurable polarity. Tracks the last state it was driven to.
pub struct StatusLed<P: OutputPin> {
    pin: P,
    active_low: bool,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Wrap `pin`. The pin is assumed to already be in the "off" level.
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            lit: false,
        }
    }

    pub fn on(&mut self) -> Result<(), Error> {
        self.set(true)
    }

    pub fn off(&mut self) -> Result<(), Error> {
        self.set(false)
    }

    pub fn is_on(&self) -> bool {
        self.lit
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }

    fn set(&mut self, lit: bool) -> Result<(), Error> {
        let high = lit != self.active_low;
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| Error::Gpio)?;
        self.lit = lit;
        Ok(())
    }
}
