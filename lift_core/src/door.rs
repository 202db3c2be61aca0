//! Door sequencing on top of a positional actuator.

use std::sync::Arc;

use lift_traits::{Clock, DoorActuator};
use tracing::{debug, error};

use crate::config::DoorCfg;
use crate::error::LiftError;
use crate::hw_error::map_hw_error;
use crate::state::DoorState;

/// Drives the actuator to fixed open/closed angles and blocks for the
/// settle time so the position is reached before the caller proceeds.
pub struct Door {
    actuator: Box<dyn DoorActuator + Send>,
    cfg: DoorCfg,
    clock: Arc<dyn Clock + Send + Sync>,
    state: DoorState,
}

impl Door {
    pub fn new(
        actuator: Box<dyn DoorActuator + Send>,
        cfg: DoorCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            actuator,
            cfg,
            clock,
            state: DoorState::Closed,
        }
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == DoorState::Closed
    }

    pub fn open(&mut self) -> Result<(), LiftError> {
        self.state = DoorState::Opening;
        self.move_to(self.cfg.open_angle)?;
        self.state = DoorState::Open;
        debug!(angle = self.cfg.open_angle, "door open");
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), LiftError> {
        self.state = DoorState::Closing;
        self.move_to(self.cfg.close_angle)?;
        self.state = DoorState::Closed;
        debug!(angle = self.cfg.close_angle, "door closed");
        Ok(())
    }

    fn move_to(&mut self, angle: u8) -> Result<(), LiftError> {
        if let Err(e) = self.actuator.set_angle(angle) {
            let err = map_hw_error(&*e);
            error!(error = %err, angle, "door actuator command failed");
            return Err(err);
        }
        self.clock.sleep(self.cfg.settle());
        Ok(())
    }
}
