use crate::LatencyStats;
use polars::prelude::*;

/// Compute latency statistics over raw samples.
///
/// Percentiles use linear interpolation between the closest ranks, `rank = q * (n - 1)`.
/// An empty sample set gives [LatencyStats::default], with every statistic absent.
pub fn latency_stats(samples: &[f64]) -> PolarsResult<LatencyStats> {
    if samples.is_empty() {
        return Ok(LatencyStats::default());
    }

    let series = Series::new("value".into(), samples);
    let values = series.f64()?;

    Ok(LatencyStats {
        min: values.min(),
        max: values.max(),
        mean: values.mean(),
        median: values.median(),
        p90: values.quantile(0.9, QuantileMethod::Linear)?,
        p99: values.quantile(0.99, QuantileMethod::Linear)?,
    })
}
