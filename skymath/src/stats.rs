//! Statistical helpers for distribution testing and analysis.

use thiserror::Error;

/// Error type for statistics over empty or degenerate samples.
#[derive(Debug, Error)]
pub enum StatsError {
    /// No finite values remained after filtering.
    #[error("insufficient data to compute statistic: {total} values, 0 valid")]
    NoValidValues {
        /// Number of values supplied, including NaNs.
        total: usize,
    },
}

/// Calculate the median of a slice of f64 values.
///
/// NaN values are filtered out; infinite values participate in ordering.
/// For even-length data the two middle values are averaged.
pub fn median(values: &[f64]) -> Result<f64, StatsError> {
    let mut valid: Vec<f64> = values.iter().filter(|v| !v.is_nan()).copied().collect();

    if valid.is_empty() {
        return Err(StatsError::NoValidValues {
            total: values.len(),
        });
    }

    valid.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mid = valid.len() / 2;
    let median_value = if valid.len() % 2 == 0 {
        (valid[mid - 1] + valid[mid]) / 2.0
    } else {
        valid[mid]
    };

    Ok(median_value)
}

/// Kolmogorov-Smirnov statistic of a sample against an analytic CDF.
///
/// Returns the maximum distance between the empirical CDF of the sample and
/// the supplied theoretical CDF. Smaller values indicate a better fit.
pub fn empirical_cdf_distance<F>(samples: &[f64], cdf: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = samples.len();
    if n == 0 {
        return 1.0;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut max_diff: f64 = 0.0;
    for (i, &value) in sorted.iter().enumerate() {
        let theoretical = cdf(value);

        let empirical_before = i as f64 / n as f64;
        let empirical_after = (i + 1) as f64 / n as f64;

        max_diff = max_diff
            .max((empirical_before - theoretical).abs())
            .max((empirical_after - theoretical).abs());
    }

    max_diff
}

/// Critical value for the KS statistic at the given significance level.
///
/// Uses the asymptotic approximation, valid for large n.
pub fn ks_critical_value(n: usize, alpha: f64) -> f64 {
    let c_alpha = match alpha {
        a if (a - 0.10).abs() < 1e-6 => 1.22,
        a if (a - 0.05).abs() < 1e-6 => 1.36,
        a if (a - 0.01).abs() < 1e-6 => 1.63,
        _ => 1.36,
    };

    c_alpha / (n as f64).sqrt()
}
