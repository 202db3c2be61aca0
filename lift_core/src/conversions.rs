//! `From` implementations bridging `lift_config` types to `lift_core` types.

use crate::calibration::Calibration;
use crate::config::{ButtonCfg, DoorCfg, LoadCfg, LoopCfg, MonitorCfg, ShaftCfg};

// ── ShaftCfg ─────────────────────────────────────────────────────────────────

impl From<&lift_config::Config> for ShaftCfg {
    fn from(c: &lift_config::Config) -> Self {
        Self {
            floors: c.elevator.floors,
            ground_floor: c.elevator.ground_floor,
            speed_percent: c.motor.speed_percent,
        }
    }
}

// ── DoorCfg ──────────────────────────────────────────────────────────────────

impl From<&lift_config::DoorCfg> for DoorCfg {
    fn from(c: &lift_config::DoorCfg) -> Self {
        Self {
            hold_ms: c.hold_ms,
            max_open_ms: c.max_open_ms,
            settle_ms: c.settle_ms,
            open_angle: c.open_angle,
            close_angle: c.close_angle,
        }
    }
}

// ── LoadCfg / Calibration ────────────────────────────────────────────────────

impl From<&lift_config::LoadCellCfg> for LoadCfg {
    fn from(c: &lift_config::LoadCellCfg) -> Self {
        Self {
            overload_threshold_kg: c.overload_threshold_kg,
            window: c.window.max(1),
            read_timeout_ms: c.ready_timeout_ms,
            tare_samples: c.tare_samples.max(1),
        }
    }
}

impl From<&lift_config::LoadCellCfg> for Calibration {
    fn from(c: &lift_config::LoadCellCfg) -> Self {
        Self {
            scale: c.scale,
            offset: c.offset,
        }
    }
}

// ── ButtonCfg / MonitorCfg / LoopCfg ─────────────────────────────────────────

impl From<&lift_config::ButtonsCfg> for ButtonCfg {
    fn from(c: &lift_config::ButtonsCfg) -> Self {
        Self {
            debounce_ms: c.debounce_ms,
        }
    }
}

impl From<&lift_config::MonitorCfg> for MonitorCfg {
    fn from(c: &lift_config::MonitorCfg) -> Self {
        Self {
            auto_mode: c.auto_mode,
            stable_delta_kg: c.stable_delta_kg,
            stable_window_ms: c.stable_window_ms,
        }
    }
}

impl From<&lift_config::ElevatorCfg> for LoopCfg {
    fn from(c: &lift_config::ElevatorCfg) -> Self {
        Self { tick_ms: c.tick_ms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_over() {
        let cfg = lift_config::Config::default();
        let shaft = ShaftCfg::from(&cfg);
        assert_eq!(shaft.floors, 4);
        assert_eq!(shaft.speed_percent, 68);
        let door = DoorCfg::from(&cfg.door);
        assert_eq!(door.hold_ms, 3000);
        assert_eq!(door.max_open_ms, 30_000);
        let cal = Calibration::from(&cfg.load_cell);
        assert_eq!(cal.offset, 0);
        assert_eq!(LoopCfg::from(&cfg.elevator).tick_ms, 100);
    }
}
