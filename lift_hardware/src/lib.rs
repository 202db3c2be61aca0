//! Device implementations for the elevator controller.
//!
//! Simulated devices and the pure codecs (Modbus frames, servo mapping) are
//! always built. Raspberry Pi GPIO/PWM/UART devices need the `hardware`
//! feature on Linux.

pub mod error;
pub mod modbus;
pub mod servo;
pub mod sim;
pub mod util;

#[cfg(feature = "hardware")]
pub mod door;
#[cfg(feature = "hardware")]
pub mod gpio;
#[cfg(feature = "hardware")]
pub mod hbridge;
#[cfg(feature = "hardware")]
pub mod hx711;
#[cfg(feature = "hardware")]
pub mod serial_motor;

pub use error::HwError;
pub use sim::{SimulatedDoor, SimulatedLine, SimulatedLoadCell, SimulatedShaft};

#[cfg(feature = "hardware")]
pub use rppal::gpio::Gpio;
