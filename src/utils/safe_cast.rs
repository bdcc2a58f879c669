//! Safe casting utilities for turning smoothed angles into wire integers

use crate::{Error, Result};

/// Safely convert f64 to i32 with bounds checking
///
/// # Errors
///
/// Returns an error if the value is not finite or outside i32 range
#[allow(clippy::cast_possible_truncation)] // Truncation after bounds check is safe
pub fn f64_to_i32(value: f64) -> Result<i32> {
    if value.is_finite() && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        Ok(value as i32)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} cannot be safely converted to i32"
        )))
    }
}

/// Truncate f64 toward zero into i32, saturating at the i32 bounds
///
/// NaN maps to 0, infinities map to the matching bound.
#[must_use]
pub fn f64_to_i32_saturating(value: f64) -> i32 {
    match f64_to_i32(value) {
        Ok(v) => v,
        Err(_) if value.is_nan() => 0,
        Err(_) if value.is_sign_negative() => i32::MIN,
        Err(_) => i32::MAX,
    }
}

/// Convert a sample count to f64 for averaging
#[must_use]
#[allow(clippy::cast_precision_loss)] // Window sizes are far below 2^52
pub fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_f64_to_i32() {
        assert_eq!(f64_to_i32(42.0).unwrap(), 42);
        assert_eq!(f64_to_i32(-42.0).unwrap(), -42);
        assert_eq!(f64_to_i32(0.0).unwrap(), 0);
        assert_eq!(f64_to_i32(2147483647.0).unwrap(), i32::MAX);
        assert_eq!(f64_to_i32(-2147483648.0).unwrap(), i32::MIN);

        assert!(f64_to_i32(f64::INFINITY).is_err());
        assert!(f64_to_i32(f64::NEG_INFINITY).is_err());
        assert!(f64_to_i32(f64::NAN).is_err());
        assert!(f64_to_i32(2147483648.0).is_err());
        assert!(f64_to_i32(-2147483649.0).is_err());
    }

    #[test]
    fn test_truncation_toward_zero() {
        assert_eq!(f64_to_i32(0.9999).unwrap(), 0);
        assert_eq!(f64_to_i32(-0.9999).unwrap(), 0);
        assert_eq!(f64_to_i32(-2.5).unwrap(), -2);
        assert_eq!(f64_to_i32(2.5).unwrap(), 2);
        assert_eq!(f64_to_i32(2147483646.99).unwrap(), 2147483646);
    }

    #[test]
    fn test_f64_to_i32_saturating() {
        assert_eq!(f64_to_i32_saturating(-7.9), -7);
        assert_eq!(f64_to_i32_saturating(f64::NAN), 0);
        assert_eq!(f64_to_i32_saturating(f64::INFINITY), i32::MAX);
        assert_eq!(f64_to_i32_saturating(f64::NEG_INFINITY), i32::MIN);
        assert_eq!(f64_to_i32_saturating(1e12), i32::MAX);
        assert_eq!(f64_to_i32_saturating(-1e12), i32::MIN);
    }

    #[test]
    fn test_usize_to_f64() {
        assert_eq!(usize_to_f64(0), 0.0);
        assert_eq!(usize_to_f64(8), 8.0);
    }

    proptest! {
        #[test]
        fn prop_f64_to_i32_finite_within_bounds(value in i32::MIN..=i32::MAX) {
            let f_value = f64::from(value);
            let result = f64_to_i32(f_value);
            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap(), value);
        }

        #[test]
        fn prop_saturating_matches_checked_in_range(value in -1.0e9f64..1.0e9f64) {
            prop_assert_eq!(f64_to_i32_saturating(value), f64_to_i32(value).unwrap());
            prop_assert!(f64::from(f64_to_i32_saturating(value)).abs() <= value.abs());
        }
    }
}
