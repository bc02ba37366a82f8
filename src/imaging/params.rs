//! Codec-level parameter types.
//!
//! [`Quality`] is the integer scale the JPEG encoder consumes. The pipeline
//! speaks in `0.0..=1.0` compression factors (see
//! [`ImageQuality::factor`](crate::types::ImageQuality::factor)); this is where
//! the two meet.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// From a `0.0..=1.0` compression factor. Out-of-range and NaN factors
    /// clamp to the nearest end of the scale.
    pub fn from_factor(factor: f64) -> Self {
        let scaled = (factor * 100.0).round();
        if scaled.is_nan() {
            return Self::new(1);
        }
        Self::new(scaled.clamp(1.0, 100.0) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}
