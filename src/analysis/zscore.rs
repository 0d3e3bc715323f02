//! Inverted z-score of the latest month.
//!
//! The latest month is compared against the population distribution of all
//! earlier months. The sign is flipped relative to the usual `(x - mean) /
//! stddev`, so a drop below the historical mean gives a positive score.

use crate::error::AnalysisError;
use crate::models::{MonthlyValues, ZScoreResult};
use tracing::debug;

/// Arithmetic mean. Returns `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Score the latest month of `monthly` against every earlier month.
pub fn compute_z_score(monthly: &MonthlyValues) -> Result<ZScoreResult, AnalysisError> {
    let ((latest_month, current_value), historical) =
        monthly.split_latest().ok_or(AnalysisError::NoData)?;

    let historical_mean = mean(&historical).ok_or(AnalysisError::InsufficientHistory)?;
    let historical_std_dev = population_std_dev(&historical, historical_mean);

    debug!(
        "Latest {} = {}, history: n={} mean={:.4} sd={:.4}",
        latest_month,
        current_value,
        historical.len(),
        historical_mean,
        historical_std_dev
    );

    if historical_std_dev == 0.0 {
        return Err(AnalysisError::ZeroVariance);
    }

    Ok(ZScoreResult {
        latest_month: latest_month.to_string(),
        current_value,
        historical_mean,
        historical_std_dev,
        history_len: historical.len(),
        z_score: (historical_mean - current_value) / historical_std_dev,
    })
}
