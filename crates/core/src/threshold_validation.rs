//! Shared numeric validation helpers.
//!
//! Provides reusable range-checking functions used by the ingestion step,
//! the stores and the annotator.

use crate::error::CoreError;

/// Validate that an hour figure is finite and non-negative.
///
/// Returns a `CoreError::Validation` naming the field if it is not.
pub fn validate_hours(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    if value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a multiplier or coefficient is finite and strictly positive.
pub fn validate_positive(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a percentage lies within `[0.0, 100.0]`.
pub fn validate_percentage(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Divide `numerator` by `denominator`, returning `0.0` when the denominator
/// is not strictly positive.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Round a non-negative or negative ratio to the nearest whole percent.
pub fn round_percent(ratio: f64) -> i64 {
    (ratio * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_accepts_zero_and_positive() {
        assert!(validate_hours(0.0, "hours").is_ok());
        assert!(validate_hours(1645.0, "hours").is_ok());
    }

    #[test]
    fn hours_rejects_negative() {
        let err = validate_hours(-1.0, "budgeted_hours").unwrap_err();
        assert!(err.to_string().contains("budgeted_hours"));
    }

    #[test]
    fn hours_rejects_nan_and_infinity() {
        assert!(validate_hours(f64::NAN, "hours").is_err());
        assert!(validate_hours(f64::INFINITY, "hours").is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(validate_positive(0.0, "coefficient").is_err());
        assert!(validate_positive(0.5, "coefficient").is_ok());
    }

    #[test]
    fn percentage_bounds() {
        assert!(validate_percentage(0.0, "pct").is_ok());
        assert!(validate_percentage(100.0, "pct").is_ok());
        assert!(validate_percentage(100.5, "pct").is_err());
        assert!(validate_percentage(-0.1, "pct").is_err());
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio_or_zero(10.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(10.0, -5.0), 0.0);
        assert_eq!(ratio_or_zero(10.0, 4.0), 2.5);
    }

    #[test]
    fn round_percent_rounds_half_up() {
        assert_eq!(round_percent(1280.0 / 1645.0), 78);
        assert_eq!(round_percent(0.125), 13);
        assert_eq!(round_percent(1.2), 120);
    }
}
