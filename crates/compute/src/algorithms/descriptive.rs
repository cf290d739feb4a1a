//! Descriptive statistics over plain float slices.
//!
//! Every function returns `None` when the statistic has no defined value
//! for the input (empty slice, non-finite result) so callers decide the
//! neutral substitute explicitly.

/// Arithmetic mean. Constant input returns its value exactly.
pub fn mean(values: &[f64]) -> Option<f64> {
    let first = *values.first()?;
    if all_identical(values) {
        return first.is_finite().then_some(first);
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    m.is_finite().then_some(m)
}

/// Population standard deviation (divides by `n`). Constant input is 0.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if all_identical(values) {
        return Some(0.0);
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    let std = variance.sqrt();
    std.is_finite().then_some(std)
}

/// `max - min`.
pub fn range(values: &[f64]) -> Option<f64> {
    let (min, max) = values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(*v), hi.max(*v))
    });
    let r = max - min;
    r.is_finite().then_some(r)
}

/// True when every value is bit-for-bit equal to the first (exact, no tolerance).
pub fn all_identical(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}

/// Map NaN and ±∞ to 0.0 so values stay serializable.
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Euclidean norm.
pub fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}
