//! Elevator, door and motor states.

use serde::{Deserialize, Serialize};

/// State of the elevator controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElevatorState {
    Idle,
    MovingUp,
    MovingDown,
    DoorOpening,
    DoorOpen,
    DoorClosing,
    EmergencyStop,
    Error,
}

impl ElevatorState {
    pub fn is_moving(self) -> bool {
        matches!(self, Self::MovingUp | Self::MovingDown)
    }

    /// States in which the car must stand still with the door in use.
    pub fn is_door_state(self) -> bool {
        matches!(self, Self::DoorOpening | Self::DoorOpen | Self::DoorClosing)
    }
}

impl core::fmt::Display for ElevatorState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::MovingUp => "moving-up",
            Self::MovingDown => "moving-down",
            Self::DoorOpening => "door-opening",
            Self::DoorOpen => "door-open",
            Self::DoorClosing => "door-closing",
            Self::EmergencyStop => "emergency-stop",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Last commanded door position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoorState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl DoorState {
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Last commanded hoist motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotorState {
    #[default]
    Stopped,
    Up,
    Down,
}

impl MotorState {
    pub fn is_running(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}
