//! Rescales raw measurements onto a 0–100 score.

use crate::error::ScoreError;
use crate::scoring::types::MetricRange;
use crate::scoring::utility::round_half_up;

/// Scores `value` against `[min, max]`.
///
/// Out-of-range values are clamped to the nearest bound. With `invert`, the
/// top of the range scores 0 instead of 100.
///
/// # Errors
///
/// Returns a [`ScoreError`] if the range is empty, inverted or non-finite,
/// or if `value` is NaN.
pub fn normalize(value: f64, min: f64, max: f64, invert: bool) -> Result<u8, ScoreError> {
    MetricRange::new(min, max, invert).normalize(value)
}

impl MetricRange {
    pub fn validate(&self) -> Result<(), ScoreError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ScoreError::NonFiniteRange {
                min: self.min,
                max: self.max,
            });
        }
        if self.min == self.max {
            return Err(ScoreError::ZeroWidthRange { min: self.min });
        }
        if self.min > self.max {
            return Err(ScoreError::InvertedRange {
                min: self.min,
                max: self.max,
            });
        }
        if !(self.max - self.min).is_finite() {
            return Err(ScoreError::NonFiniteRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// See [`normalize`].
    pub fn normalize(&self, value: f64) -> Result<u8, ScoreError> {
        self.validate()?;
        if value.is_nan() {
            return Err(ScoreError::NonFiniteValue);
        }

        let clamped = value.clamp(self.min, self.max);
        let fraction = (clamped - self.min) / (self.max - self.min);

        // Rounded before inverting so both directions round the same way.
        let score = round_half_up(fraction * 100.0).clamp(0.0, 100.0) as u8;

        Ok(if self.invert { 100 - score } else { score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_co2_reading() {
        // 420 ppm sits 60% into 300..500, inverted to 40.
        assert_eq!(normalize(420.0, 300.0, 500.0, true), Ok(40));
    }

    #[test]
    fn test_clamps_below_and_above() {
        assert_eq!(normalize(-1000.0, 0.0, 100.0, false), Ok(0));
        assert_eq!(normalize(0.0, 0.0, 100.0, false), Ok(0));
        assert_eq!(normalize(1100.0, 0.0, 100.0, false), Ok(100));
        assert_eq!(normalize(f64::INFINITY, 1e9, 5e12, false), Ok(100));
        assert_eq!(normalize(f64::NEG_INFINITY, 50.0, 200.0, true), Ok(100));
    }

    #[test]
    fn test_midpoint_is_fifty() {
        assert_eq!(normalize(1750.0, 1500.0, 2000.0, false), Ok(50));
        assert_eq!(normalize(275.0, 50.0, 500.0, false), Ok(50));
    }

    #[test]
    fn test_inversion_symmetry() {
        let (min, max) = (0.0, 200.0);
        for step in 0..=400 {
            let v = min + step as f64 * 0.5;
            let plain = normalize(v, min, max, false).unwrap();
            let inverted = normalize(v, min, max, true).unwrap();
            assert_eq!(inverted, 100 - plain, "value {v}");
        }
    }

    #[test]
    fn test_output_always_in_range() {
        let ranges = [(0.0, 20.0), (300.0, 500.0), (1e9, 5e12), (-5.0, 5.0)];
        let values = [-1e15, -3.3, 0.0, 4.5, 17.25, 420.0, 1e11, 9e99];
        for (min, max) in ranges {
            for v in values {
                for invert in [false, true] {
                    let score = normalize(v, min, max, invert).unwrap();
                    assert!(score <= 100);
                }
            }
        }
    }

    #[test]
    fn test_rounds_half_up() {
        // 0.5% of the range.
        assert_eq!(normalize(1.0, 0.0, 200.0, false), Ok(1));
        assert_eq!(normalize(0.9, 0.0, 200.0, false), Ok(0));
    }

    #[test]
    fn test_range_wider_than_f64_is_rejected() {
        assert_eq!(
            normalize(1e308, -1e308, 1e308, false),
            Err(ScoreError::NonFiniteRange {
                min: -1e308,
                max: 1e308
            })
        );
        assert_eq!(normalize(1e308, 0.0, 1e308, false), Ok(100));
    }

    #[test]
    fn test_zero_width_range_is_rejected() {
        assert_eq!(
            normalize(5.0, 10.0, 10.0, false),
            Err(ScoreError::ZeroWidthRange { min: 10.0 })
        );
    }

    #[test]
    fn test_inverted_and_non_finite_ranges_are_rejected() {
        assert!(matches!(
            normalize(5.0, 10.0, 0.0, false),
            Err(ScoreError::InvertedRange { .. })
        ));
        assert!(matches!(
            normalize(5.0, 0.0, f64::INFINITY, false),
            Err(ScoreError::NonFiniteRange { .. })
        ));
    }

    #[test]
    fn test_nan_value_is_rejected() {
        assert_eq!(
            normalize(f64::NAN, 0.0, 100.0, false),
            Err(ScoreError::NonFiniteValue)
        );
    }

    #[test]
    fn test_idempotent() {
        let range = MetricRange::new(50.0, 200.0, true);
        assert_eq!(range.normalize(133.7), range.normalize(133.7));
    }
}
