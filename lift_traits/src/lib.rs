pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Direction of car travel as seen by the hoist motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

/// Load-cell amplifier producing signed raw samples.
pub trait LoadCell {
    /// Block until a sample is ready or `timeout` elapses.
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>>;
}

/// Hoist motor. Speed is a normalized percentage (0..=100).
pub trait Motor {
    fn run(
        &mut self,
        direction: Direction,
        speed_percent: u8,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Positional door actuator (hobby servo or equivalent).
pub trait DoorActuator {
    fn set_angle(&mut self, degrees: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Digital input with deployment-specific polarity already applied.
pub trait InputLine {
    fn is_active(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Digital output (indicator lamp, enable line).
pub trait OutputLine {
    fn set_active(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: LoadCell + ?Sized> LoadCell for Box<T> {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(timeout)
    }
}

impl<T: Motor + ?Sized> Motor for Box<T> {
    fn run(
        &mut self,
        direction: Direction,
        speed_percent: u8,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).run(direction, speed_percent)
    }
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).stop()
    }
}

impl<T: DoorActuator + ?Sized> DoorActuator for Box<T> {
    fn set_angle(&mut self, degrees: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_angle(degrees)
    }
}

impl<T: InputLine + ?Sized> InputLine for Box<T> {
    fn is_active(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).is_active()
    }
}

impl<T: OutputLine + ?Sized> OutputLine for Box<T> {
    fn set_active(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_active(on)
    }
}
