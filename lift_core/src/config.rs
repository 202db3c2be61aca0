//! Runtime configuration for the controller.
//!
//! Separate from the TOML-deserialized config in `lift_config`; see
//! `conversions` for the mapping.

use std::time::Duration;

/// Shaft geometry and travel parameters.
#[derive(Debug, Clone)]
pub struct ShaftCfg {
    pub floors: usize,
    /// Assumed position when no floor sensor is active at startup.
    pub ground_floor: usize,
    /// Travel speed as a percentage of full scale.
    pub speed_percent: u8,
}

impl Default for ShaftCfg {
    fn default() -> Self {
        Self {
            floors: 4,
            ground_floor: 0,
            speed_percent: 68,
        }
    }
}

/// Door timing and actuator positions.
#[derive(Debug, Clone)]
pub struct DoorCfg {
    /// Minimum time the door stays open after opening.
    pub hold_ms: u64,
    /// Absolute limit for a continuous DoorOpen, measured from the first opening.
    pub max_open_ms: u64,
    /// Blocking settle time after each open/close command.
    pub settle_ms: u64,
    pub open_angle: u8,
    pub close_angle: u8,
}

impl Default for DoorCfg {
    fn default() -> Self {
        Self {
            hold_ms: 3000,
            max_open_ms: 30_000,
            settle_ms: 500,
            open_angle: 90,
            close_angle: 0,
        }
    }
}

impl DoorCfg {
    #[inline]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Load-cell sampling and overload detection.
#[derive(Debug, Clone)]
pub struct LoadCfg {
    pub overload_threshold_kg: f32,
    /// Rolling average length (samples).
    pub window: usize,
    /// Longest a single sample may block the tick, retries included.
    /// A missing amplifier stalls each tick by this much.
    pub read_timeout_ms: u64,
    pub tare_samples: usize,
}

impl Default for LoadCfg {
    fn default() -> Self {
        Self {
            overload_threshold_kg: 500.0,
            window: 5,
            read_timeout_ms: 1000,
            tare_samples: 10,
        }
    }
}

impl LoadCfg {
    #[inline]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Call button press filtering.
#[derive(Debug, Clone)]
pub struct ButtonCfg {
    /// Presses closer than this to the previous accepted press are ignored.
    pub debounce_ms: u64,
}

impl Default for ButtonCfg {
    fn default() -> Self {
        Self { debounce_ms: 50 }
    }
}

/// Monitor-facing runtime knobs.
#[derive(Debug, Clone)]
pub struct MonitorCfg {
    pub auto_mode: bool,
    pub stable_delta_kg: f32,
    pub stable_window_ms: u64,
}

impl Default for MonitorCfg {
    fn default() -> Self {
        Self {
            auto_mode: true,
            stable_delta_kg: 0.13,
            stable_window_ms: 5000,
        }
    }
}

/// Control loop timing.
#[derive(Debug, Clone)]
pub struct LoopCfg {
    pub tick_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self { tick_ms: 100 }
    }
}

impl LoopCfg {
    #[inline]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
