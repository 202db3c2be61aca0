//! Maps `Box<dyn Error>` from trait boundaries to typed `LiftError`.
//!
//! The traits in `lift_traits` use `Box<dyn Error + Send + Sync>`; this module
//! converts those to our typed error enum, with an optional feature-gated path
//! for `lift_hardware::HwError` downcasting.

use crate::error::LiftError;

/// Map a trait-boundary error to a typed `LiftError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> LiftError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<lift_hardware::error::HwError>() {
            return match hw {
                lift_hardware::error::HwError::Timeout
                | lift_hardware::error::HwError::DataReadyTimeout => LiftError::Timeout,
                other => LiftError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        LiftError::Timeout
    } else {
        LiftError::Hardware(s)
    }
}

