//! Precondition checks shared by every builder.

use crate::error::BuildError;

/// Safety margin used to oversize cutting tools so cuts go cleanly through.
pub fn through_margin(dimension: f64) -> f64 {
    (dimension * 0.1).max(0.5)
}

pub fn require_positive(primitive: &'static str, label: &str, value: f64) -> Result<f64, BuildError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(BuildError::invalid(
            primitive,
            format!("{label} must be positive, got {value}"),
        ))
    }
}

pub fn require_non_negative(
    primitive: &'static str,
    label: &str,
    value: f64,
) -> Result<f64, BuildError> {
    if value < 0.0 {
        Err(BuildError::invalid(
            primitive,
            format!("{label} must be non-negative, got {value}"),
        ))
    } else {
        Ok(value)
    }
}

/// Requires `smaller < larger`, naming both sides in the failure.
pub fn require_less(
    primitive: &'static str,
    smaller: (&str, f64),
    larger: (&str, f64),
) -> Result<(), BuildError> {
    if smaller.1 < larger.1 {
        Ok(())
    } else {
        Err(BuildError::invalid(
            primitive,
            format!(
                "{} ({}) must be smaller than {} ({})",
                smaller.0, smaller.1, larger.0, larger.1
            ),
        ))
    }
}

/// Fails with `message` unless `condition` holds.
pub fn ensure(primitive: &'static str, condition: bool, message: impl FnOnce() -> String) -> Result<(), BuildError> {
    if condition {
        Ok(())
    } else {
        Err(BuildError::invalid(primitive, message()))
    }
}
