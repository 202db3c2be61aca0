//! Actuator gateway: hoist motor and door.

use lift_traits::{Direction, Motor};
use tracing::{debug, error};

use crate::door::Door;
use crate::error::LiftError;
use crate::hw_error::map_hw_error;
use crate::state::{DoorState, MotorState};

/// Outputs commanded by the state machine and by monitor overrides.
///
/// Commands return once issued; arrival is only ever observed through the
/// floor sensors.
pub trait ActuatorGateway {
    fn move_up(&mut self, speed_percent: u8) -> Result<(), LiftError>;
    fn move_down(&mut self, speed_percent: u8) -> Result<(), LiftError>;
    fn stop(&mut self) -> Result<(), LiftError>;
    /// Blocks for the door settle time.
    fn door_open(&mut self) -> Result<(), LiftError>;
    /// Blocks for the door settle time.
    fn door_close(&mut self) -> Result<(), LiftError>;
    fn motor_state(&self) -> MotorState;
    fn door_state(&self) -> DoorState;
}

pub struct Actuators {
    motor: Box<dyn Motor + Send>,
    door: Door,
    motor_state: MotorState,
}

impl Actuators {
    pub fn new(motor: Box<dyn Motor + Send>, door: Door) -> Self {
        Self {
            motor,
            door,
            motor_state: MotorState::Stopped,
        }
    }

    fn run(&mut self, direction: Direction, speed_percent: u8) -> Result<(), LiftError> {
        let speed = speed_percent.min(100);
        if let Err(e) = self.motor.run(direction, speed) {
            let err = map_hw_error(&*e);
            error!(error = %err, ?direction, "motor run failed");
            return Err(err);
        }
        self.motor_state = match direction {
            Direction::Up => MotorState::Up,
            Direction::Down => MotorState::Down,
        };
        debug!(?direction, speed, "motor running");
        Ok(())
    }
}

impl ActuatorGateway for Actuators {
    fn move_up(&mut self, speed_percent: u8) -> Result<(), LiftError> {
        self.run(Direction::Up, speed_percent)
    }

    fn move_down(&mut self, speed_percent: u8) -> Result<(), LiftError> {
        self.run(Direction::Down, speed_percent)
    }

    fn stop(&mut self) -> Result<(), LiftError> {
        if let Err(e) = self.motor.stop() {
            let err = map_hw_error(&*e);
            error!(error = %err, "motor stop failed");
            return Err(err);
        }
        self.motor_state = MotorState::Stopped;
        debug!("motor stopped");
        Ok(())
    }

    fn door_open(&mut self) -> Result<(), LiftError> {
        self.door.open()
    }

    fn door_close(&mut self) -> Result<(), LiftError> {
        self.door.close()
    }

    fn motor_state(&self) -> MotorState {
        self.motor_state
    }

    fn door_state(&self) -> DoorState {
        self.door.state()
    }
}
