use rppal::gpio::{Gpio, OutputPin};

use crate::error::{HwError, Result};
use crate::servo::{SERVO_FREQUENCY_HZ, angle_to_duty_fraction};

/// Door servo on a software-PWM GPIO.
pub struct ServoDoor {
    pin: OutputPin,
}

impl ServoDoor {
    pub fn open(gpio: &Gpio, pin: u8) -> Result<Self> {
        let pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open door servo pin {pin}: {e}")))?
            .into_output_low();
        Ok(Self { pin })
    }
}

impl lift_traits::DoorActuator for ServoDoor {
    fn set_angle(
        &mut self,
        degrees: u8,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pin
            .set_pwm_frequency(SERVO_FREQUENCY_HZ, angle_to_duty_fraction(degrees))
            .map_err(|e| HwError::Gpio(format!("door servo pwm: {e}")))?;
        tracing::debug!(degrees, "door servo angle");
        Ok(())
    }
}
