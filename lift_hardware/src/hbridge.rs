//! H-bridge hoist drive: two direction inputs plus a PWM enable.

use rppal::gpio::{Gpio, OutputPin};
use tracing::debug;

use lift_traits::Direction;

use crate::error::{HwError, Result};

pub struct HBridgeMotor {
    in1: OutputPin,
    in2: OutputPin,
    pwm: OutputPin,
    pwm_hz: f64,
}

impl HBridgeMotor {
    pub fn open(gpio: &Gpio, in1: u8, in2: u8, pwm: u8, pwm_hz: f64) -> Result<Self> {
        let out = |pin: u8| -> Result<OutputPin> {
            Ok(gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(format!("open motor pin {pin}: {e}")))?
                .into_output_low())
        };
        Ok(Self {
            in1: out(in1)?,
            in2: out(in2)?,
            pwm: out(pwm)?,
            pwm_hz,
        })
    }
}

impl lift_traits::Motor for HBridgeMotor {
    fn run(
        &mut self,
        direction: Direction,
        speed_percent: u8,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match direction {
            Direction::Up => {
                self.in2.set_low();
                self.in1.set_high();
            }
            Direction::Down => {
                self.in1.set_low();
                self.in2.set_high();
            }
        }
        let duty = f64::from(speed_percent.min(100)) / 100.0;
        self.pwm
            .set_pwm_frequency(self.pwm_hz, duty)
            .map_err(|e| HwError::Gpio(format!("motor pwm: {e}")))?;
        debug!(?direction, speed_percent, "h-bridge run");
        Ok(())
    }

    fn stop(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pwm
            .clear_pwm()
            .map_err(|e| HwError::Gpio(format!("motor pwm: {e}")))?;
        self.pwm.set_low();
        self.in1.set_low();
        self.in2.set_low();
        debug!("h-bridge stop");
        Ok(())
    }
}
