//! Linear load-cell model: `kg = (raw_average - offset) / scale`.

/// Raw counts per kilogram and the zero-load baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub scale: f32,
    pub offset: i32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0,
        }
    }
}

impl Calibration {
    pub fn new(scale: f32, offset: i32) -> Self {
        Self { scale, offset }
    }

    /// Convert an (averaged) raw reading to kilograms.
    ///
    /// A zero or non-finite scale yields 0.0 instead of infinities.
    pub fn to_kg(&self, raw_average: f32) -> f32 {
        if !self.scale.is_finite() || self.scale == 0.0 {
            return 0.0;
        }
        (raw_average - self.offset as f32) / self.scale
    }

    /// Mean of `samples` as the new zero baseline. Returns `None` when empty.
    pub fn offset_from_samples(samples: &[i32]) -> Option<i32> {
        if samples.is_empty() {
            return None;
        }
        let sum: i64 = samples.iter().map(|&s| i64::from(s)).sum();
        let n = samples.len() as i64;
        Some((sum as f64 / n as f64).round() as i32)
    }
}
