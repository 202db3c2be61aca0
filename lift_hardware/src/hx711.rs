use std::time::Duration;
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::{attempt_timeout, sign_extend_24, wait_until_low_with_timeout};

/// Poll interval while waiting for DT to signal data-ready.
const READY_POLL: Duration = Duration::from_micros(200);

pub struct Hx711 {
    dt: rppal::gpio::InputPin,
    sck: rppal::gpio::OutputPin,
    gain_pulses: u8, // 25, 26, 27 based on gain/channel
}

impl Hx711 {
    pub fn new(
        dt_pin: rppal::gpio::InputPin,
        mut sck_pin: rppal::gpio::OutputPin,
        gain_pulses: u8,
    ) -> Result<Self> {
        sck_pin.set_low(); // clock idle low; holding it high > 60us powers the chip down
        Ok(Self {
            dt: dt_pin,
            sck: sck_pin,
            gain_pulses,
        })
    }

    /// True when a conversion is waiting to be clocked out.
    pub fn is_ready(&self) -> bool {
        self.dt.is_low()
    }

    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<i32> {
        let dt = &self.dt;
        wait_until_low_with_timeout(|| dt.is_high(), timeout, READY_POLL)?;

        // Clock out 24 bits, MSB first
        let mut value: u32 = 0;
        for _ in 0..24 {
            self.sck.set_high();
            spin_delay_100ns();
            value = (value << 1) | u32::from(self.dt.is_high());
            self.sck.set_low();
            spin_delay_100ns();
        }

        // Extra pulses select gain/channel for the next conversion
        let extra = self.gain_pulses.saturating_sub(24);
        for _ in 0..extra {
            self.sck.set_high();
            spin_delay_100ns();
            self.sck.set_low();
            spin_delay_100ns();
        }

        let raw = sign_extend_24(value);
        trace!(raw, "hx711 raw read");
        Ok(raw)
    }
}

#[inline(always)]
fn spin_delay_100ns() {
    std::hint::spin_loop();
}

/// Load cell backed by a bit-banged HX711.
///
/// Data-ready timeouts are retried, with the caller's timeout split across
/// all attempts so one read never blocks longer than asked.
pub struct HardwareLoadCell {
    hx711: Hx711,
    max_retries: u32,
}

impl HardwareLoadCell {
    pub fn open(gpio: &rppal::gpio::Gpio, dt_pin: u8, sck_pin: u8, gain_pulses: u8) -> Result<Self> {
        let dt = gpio
            .get(dt_pin)
            .map_err(|e| HwError::Gpio(format!("open hx711 dt pin {dt_pin}: {e}")))?
            .into_input();
        let sck = gpio
            .get(sck_pin)
            .map_err(|e| HwError::Gpio(format!("open hx711 sck pin {sck_pin}: {e}")))?
            .into_output_low();
        Ok(Self {
            hx711: Hx711::new(dt, sck, gain_pulses)?,
            max_retries: 2,
        })
    }
}

impl lift_traits::LoadCell for HardwareLoadCell {
    fn read(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let per_attempt = attempt_timeout(timeout, self.max_retries + 1);
        let mut attempts = 0;
        loop {
            match self.hx711.read_with_timeout(per_attempt) {
                Ok(raw) => return Ok(raw),
                Err(HwError::DataReadyTimeout) if attempts < self.max_retries => {
                    attempts += 1;
                    tracing::debug!(retries = attempts, "hx711 not ready, retrying");
                }
                Err(e) => return Err(Box::new(e)),
            }
        }
    }
}
