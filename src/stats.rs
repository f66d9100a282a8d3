//! Central tendency, dispersion and threshold rates over clean score slices.
//!
//! Every function returns `None` for empty input rather than zero. Computed
//! outputs are rounded with [`round2`]; `min` and `max` are observed values
//! and are returned as-is.

use crate::models::{valid_scores, BasicStatistics, ScoreObservation, StatisticsSummary};
use crate::thresholds::{GradeScale, EXCELLENT_THRESHOLD, PASS_THRESHOLD, PERCENT_SCALE};

/// `round(x * 100) / 100`, with halves rounded away from zero. Never
/// returns negative zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

pub(crate) fn raw_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub(crate) fn raw_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation (divides by N). Needs at least two values.
pub(crate) fn raw_standard_deviation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = raw_mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

pub fn mean(values: &[f64]) -> Option<f64> {
    raw_mean(values).map(round2)
}

/// Median of a sorted copy; the caller's slice is left untouched.
///
/// Rounded, but kept inside the observed `[min, max]`.
pub fn median(values: &[f64]) -> Option<f64> {
    let rounded = round2(raw_median(values)?);
    Some(rounded.max(min(values)?).min(max(values)?))
}

pub fn standard_deviation(values: &[f64]) -> Option<f64> {
    raw_standard_deviation(values).map(round2)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn basic_statistics(values: &[f64]) -> BasicStatistics {
    BasicStatistics {
        count: values.len(),
        mean: mean(values),
        median: median(values),
        standard_deviation: standard_deviation(values),
        min: min(values),
        max: max(values),
    }
}

/// Percentage of values at or above `threshold`.
pub fn threshold_rate(values: &[f64], threshold: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let hits = values.iter().filter(|&&v| v >= threshold).count();
    Some(round2(hits as f64 / values.len() as f64 * 100.0))
}

pub fn pass_rate(values: &[f64]) -> Option<f64> {
    threshold_rate(values, PASS_THRESHOLD)
}

pub fn excellent_rate(values: &[f64]) -> Option<f64> {
    threshold_rate(values, EXCELLENT_THRESHOLD)
}

/// Summary of the valid scores among raw observations.
pub fn summarize(observations: &[ScoreObservation]) -> StatisticsSummary {
    summarize_values(&valid_scores(observations))
}

pub fn summarize_values(values: &[f64]) -> StatisticsSummary {
    summarize_on_scale(values, PERCENT_SCALE)
}

/// Like [`summarize_values`], with pass and excellent rates taken against
/// `scale` instead of the 0-100 cuts.
pub fn summarize_on_scale(values: &[f64], scale: GradeScale) -> StatisticsSummary {
    let basic = basic_statistics(values);
    StatisticsSummary {
        count: basic.count,
        average: basic.mean,
        median: basic.median,
        standard_deviation: basic.standard_deviation,
        min: basic.min,
        max: basic.max,
        pass_rate: threshold_rate(values, scale.pass),
        excellent_rate: threshold_rate(values, scale.excellent),
    }
}
