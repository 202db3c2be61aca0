//! Plain GPIO lines with per-deployment polarity.

use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::error::{HwError, Result};

pub struct GpioInput {
    pin: InputPin,
    active_low: bool,
}

impl GpioInput {
    /// Active-low lines get the internal pull-up so an open switch reads inactive.
    pub fn open(gpio: &Gpio, pin: u8, active_low: bool) -> Result<Self> {
        let p = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open input pin {pin}: {e}")))?;
        let pin = if active_low {
            p.into_input_pullup()
        } else {
            p.into_input_pulldown()
        };
        Ok(Self { pin, active_low })
    }
}

impl lift_traits::InputLine for GpioInput {
    fn is_active(&mut self) -> std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.pin.is_low() == self.active_low)
    }
}

pub struct GpioOutput {
    pin: OutputPin,
}

impl GpioOutput {
    pub fn open(gpio: &Gpio, pin: u8) -> Result<Self> {
        let pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open output pin {pin}: {e}")))?
            .into_output_low();
        Ok(Self { pin })
    }
}

impl lift_traits::OutputLine for GpioOutput {
    fn set_active(
        &mut self,
        on: bool,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}
