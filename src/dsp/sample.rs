//! # Sample Formats
//!
//! The cascade runs the same arithmetic on every sample format a host can
//! hand us. nih-plug delivers `f32` buffers; offline renders and tests use
//! `f64`. Both go through [`Sample`], so the algorithm is written once.

use std::ops::{Add, AddAssign, Mul};

/// A numeric audio sample the cascade can store, sum and scale.
///
/// Control values (gains, attenuation) are always `f32`; they are lifted
/// into the sample format once per block with [`Sample::from_f32`].
pub trait Sample:
    Copy + PartialEq + Add<Output = Self> + AddAssign + Mul<Output = Self> + Send + 'static
{
    /// Silence.
    const ZERO: Self;

    /// Convert a control value into this sample format.
    fn from_f32(value: f32) -> Self;
}

impl Sample for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f32(value: f32) -> Self {
        f64::from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f64_lifts_control_values_exactly() {
        // Every f32 is representable as an f64.
        assert_eq!(f64::from_f32(0.6), f64::from(0.6_f32));
        assert_eq!(<f64 as Sample>::ZERO, 0.0);
    }
}
