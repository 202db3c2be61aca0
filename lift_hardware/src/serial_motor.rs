//! Register-based serial motor driver speaking Modbus-RTU over a UART.
//!
//! The driver only takes a duty value, so travel direction comes from a
//! separate direction line when one is wired.

use std::path::Path;

use rppal::gpio::{Gpio, OutputPin};
use rppal::uart::{Parity, Uart};
use tracing::debug;

use lift_traits::Direction;

use crate::error::{HwError, Result};
use crate::modbus;

pub struct SerialMotor {
    uart: Uart,
    address: u8,
    dir: Option<OutputPin>,
}

impl SerialMotor {
    pub fn open(
        gpio: &Gpio,
        port: &Path,
        baud: u32,
        address: u8,
        pwm_frequency_hz: u16,
        dir_pin: Option<u8>,
    ) -> Result<Self> {
        let mut uart = Uart::with_path(port, baud, Parity::None, 8, 1)
            .map_err(|e| HwError::Serial(format!("open {}: {e}", port.display())))?;
        uart.set_write_mode(true)
            .map_err(|e| HwError::Serial(e.to_string()))?;
        let dir = match dir_pin {
            Some(pin) => Some(
                gpio.get(pin)
                    .map_err(|e| HwError::Gpio(format!("open motor dir pin {pin}: {e}")))?
                    .into_output_low(),
            ),
            None => None,
        };
        let mut motor = Self { uart, address, dir };
        motor.write_register(modbus::REG_FREQUENCY, pwm_frequency_hz.clamp(1, 1000))?;
        motor.write_register(modbus::REG_DUTY, 0)?;
        motor.write_register(modbus::REG_ENABLE, 1)?;
        Ok(motor)
    }

    fn write_register(&mut self, register: u16, value: u16) -> Result<()> {
        let frame = modbus::write_register(self.address, register, value);
        let written = self
            .uart
            .write(&frame)
            .map_err(|e| HwError::Serial(e.to_string()))?;
        if written != frame.len() {
            return Err(HwError::ShortWrite {
                written,
                expected: frame.len(),
            });
        }
        debug!(frame = ?frame, "modbus frame sent");
        Ok(())
    }
}

impl lift_traits::Motor for SerialMotor {
    fn run(
        &mut self,
        direction: Direction,
        speed_percent: u8,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(dir) = self.dir.as_mut() {
            match direction {
                Direction::Up => dir.set_high(),
                Direction::Down => dir.set_low(),
            }
        }
        self.write_register(modbus::REG_DUTY, modbus::duty_for_percent(speed_percent))?;
        Ok(())
    }

    fn stop(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write_register(modbus::REG_DUTY, 0)?;
        Ok(())
    }
}
