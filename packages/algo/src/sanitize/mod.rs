//! Data Sanitization
//!
//! Numerical guards for knowledge values read back from storage.

use crate::types::MAX_KNOWLEDGE;

/// Replace NaN and infinities with 0
pub fn sanitize_knowledge(value: f64) -> f64 {
    if value.is_nan() || value.is_infinite() {
        0.0
    } else {
        value
    }
}

/// Sanitize and clamp into the [0, 100] percentage range
pub fn clamp_percentage(value: f64) -> f64 {
    sanitize_knowledge(value).clamp(0.0, MAX_KNOWLEDGE)
}

/// Mean of the finite values, 0 when there are none
pub fn finite_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Share of `part` in `total` as a percentage, 0 for an empty total
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
