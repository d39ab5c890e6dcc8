//! # Series Metrics
//!
//! Fixed-range percentage histograms and the per-series statistics drawn on
//! top of them (mean markers, box-plot medians).
//!
//! Histograms partition `[0, range_max)` into equal-width bins. Samples at or
//! beyond `range_max` land in the last bin and samples below zero in the
//! first, so every sample is counted and the percentages of a non-empty series
//! always add up to 100.

use crate::error::AnalysisError;
use crate::utils::{calculate_percentiles, calculate_stats};
use serde::{Deserialize, Serialize};

/// One histogram bin with its share of the total sample count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower_edge: f64,
    pub upper_edge: f64,
    pub percentage: f64,
}

/// Percentage histogram of one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageHistogram {
    /// Empty only when the input series was empty
    pub bins: Vec<HistogramBin>,
    /// Arithmetic mean of the raw samples; undefined for an empty series
    pub mean: Option<f64>,
    pub total_samples: usize,
}

impl PercentageHistogram {
    pub fn is_empty(&self) -> bool {
        self.total_samples == 0
    }

    /// Tallest bin, used to place the mean annotation
    pub fn max_percentage(&self) -> f64 {
        self.bins.iter().map(|b| b.percentage).fold(0.0, f64::max)
    }
}

fn bin_edge(range_max: f64, i: usize, bin_count: usize) -> f64 {
    range_max * i as f64 / bin_count as f64
}

/// Index of the bin holding `value`, checked against the reported edges
fn bin_index(value: f64, range_max: f64, bin_count: usize) -> usize {
    let last = bin_count - 1;
    if value.is_nan() || value < 0.0 {
        return 0;
    }
    if value >= range_max {
        return last;
    }
    let candidate = (value / (range_max / bin_count as f64)).floor();
    let mut index = if candidate >= last as f64 {
        last
    } else {
        candidate as usize
    };
    // Division and the edge product can round differently near an edge
    while index > 0 && value < bin_edge(range_max, index, bin_count) {
        index -= 1;
    }
    while index < last && value >= bin_edge(range_max, index + 1, bin_count) {
        index += 1;
    }
    index
}

/// Bin `values` into `bin_count` equal-width bins over `[0, range_max)`
///
/// Counts are converted to `100 * count / total`. The mean is taken over the
/// raw values, not reconstructed from bins.
pub fn compute_percentage_histogram(
    values: &[f64],
    bin_count: usize,
    range_max: f64,
) -> Result<PercentageHistogram, AnalysisError> {
    crate::utils::validate_bin_count(bin_count)?;
    crate::utils::validate_axis_limit(range_max)?;

    if values.is_empty() {
        return Ok(PercentageHistogram {
            bins: Vec::new(),
            mean: None,
            total_samples: 0,
        });
    }

    let mut counts = vec![0usize; bin_count];
    for &value in values {
        counts[bin_index(value, range_max, bin_count)] += 1;
    }

    let total = values.len() as f64;
    let bins = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBin {
            lower_edge: bin_edge(range_max, i, bin_count),
            upper_edge: bin_edge(range_max, i + 1, bin_count),
            percentage: 100.0 * count as f64 / total,
        })
        .collect();

    let (mean, _, _, _) = calculate_stats(values);

    Ok(PercentageHistogram {
        bins,
        mean: Some(mean),
        total_samples: values.len(),
    })
}

/// Descriptive statistics of one series, as annotated on box plots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStatistics {
    /// `None` for an empty series
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let (mean, min, max, _) = calculate_stats(values);
        let median = calculate_percentiles(values, &[50.0])
            .first()
            .map(|&(_, v)| v)
            .unwrap_or(mean);

        Some(Self {
            count: values.len(),
            mean,
            median,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percentage_sum(h: &PercentageHistogram) -> f64 {
        h.bins.iter().map(|b| b.percentage).sum()
    }

    #[test]
    fn test_histogram_percentages_sum_to_100() {
        let values = vec![0.3, 1.2, 1.9, 2.5, 7.7, 9.99, 0.0, 4.2, 4.3];
        let h = compute_percentage_histogram(&values, 30, 10.0).unwrap();
        assert_eq!(h.bins.len(), 30);
        assert!((percentage_sum(&h) - 100.0).abs() < 1e-6);
        assert_eq!(h.total_samples, 9);
    }

    #[test]
    fn test_histogram_mean_uses_raw_values() {
        let values = vec![1.0, 1.1, 5.9];
        let h = compute_percentage_histogram(&values, 2, 10.0).unwrap();
        let expected = (1.0 + 1.1 + 5.9) / 3.0;
        assert!((h.mean.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_bin_edges() {
        let h = compute_percentage_histogram(&[1.0], 4, 60.0).unwrap();
        let edges: Vec<(f64, f64)> = h.bins.iter().map(|b| (b.lower_edge, b.upper_edge)).collect();
        assert_eq!(
            edges,
            vec![(0.0, 15.0), (15.0, 30.0), (30.0, 45.0), (45.0, 60.0)]
        );
    }

    #[test]
    fn test_histogram_counts_per_bin() {
        let values = vec![0.5, 1.5, 1.6, 3.0];
        let h = compute_percentage_histogram(&values, 4, 4.0).unwrap();
        let pct: Vec<f64> = h.bins.iter().map(|b| b.percentage).collect();
        assert_eq!(pct, vec![25.0, 50.0, 0.0, 25.0]);
    }

    #[test]
    fn test_value_on_interior_edge() {
        for (value, expected_bin) in [(0.3, 3), (0.6, 6), (0.7, 7)] {
            let h = compute_percentage_histogram(&[value], 10, 1.0).unwrap();
            assert_eq!(h.bins[expected_bin].percentage, 100.0, "value {}", value);
            assert_eq!(h.bins[expected_bin].lower_edge, value);
        }

        for (bins, range) in [(10, 1.0), (30, 10.0), (30, 40.0), (120, 60.0)] {
            let edges = compute_percentage_histogram(&[0.0], bins, range).unwrap().bins;
            for (i, bin) in edges.iter().enumerate() {
                let h = compute_percentage_histogram(&[bin.lower_edge], bins, range).unwrap();
                assert_eq!(h.bins[i].percentage, 100.0, "bins {} range {} edge {}", bins, range, i);
            }
        }
    }

    #[test]
    fn test_out_of_range_values_are_not_dropped() {
        let values = vec![-1.0, 0.5, 10.0, 250.0];
        let h = compute_percentage_histogram(&values, 10, 10.0).unwrap();
        assert_eq!(h.bins[0].percentage, 50.0);
        assert_eq!(h.bins[9].percentage, 50.0);
        assert!((percentage_sum(&h) - 100.0).abs() < 1e-6);
        assert_eq!(h.max_percentage(), 50.0);
    }

    #[test]
    fn test_empty_series_is_degenerate_not_an_error() {
        let h = compute_percentage_histogram(&[], 120, 60.0).unwrap();
        assert!(h.bins.is_empty());
        assert!(h.mean.is_none());
        assert!(h.is_empty());
    }

    #[test]
    fn test_histogram_is_deterministic() {
        let values: Vec<f64> = (0..500).map(|i| (i % 37) as f64 * 0.31).collect();
        let a = compute_percentage_histogram(&values, 120, 60.0).unwrap();
        let b = compute_percentage_histogram(&values, 120, 60.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_histogram_parameters() {
        assert!(compute_percentage_histogram(&[1.0], 0, 10.0).is_err());
        assert!(compute_percentage_histogram(&[1.0], 10, 0.0).is_err());
        assert!(compute_percentage_histogram(&[1.0], 10, f64::NAN).is_err());
    }

    #[test]
    fn test_series_statistics() {
        let stats = SeriesStatistics::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);

        assert!(SeriesStatistics::from_values(&[]).is_none());
    }
}
