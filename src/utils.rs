//! # Utility Functions and Helper Module
//!
//! Shared helpers for the analysis pipeline: basic statistics over
//! millisecond series, parameter validation, label formatting and console
//! table output.
//!
//! ## Usage Examples
//!
//! ```rust
//! use frame_metrics::utils::*;
//!
//! let (mean, min, max, _std_dev) = calculate_stats(&[1.0, 2.0, 3.0]);
//! assert_eq!((mean, min, max), (2.0, 1.0, 3.0));
//!
//! assert_eq!(format_millis(1.5), "1.500 ms");
//! assert!(validate_bin_count(0).is_err());
//! ```

use crate::error::AnalysisError;
use crate::units::AudioDuration;

/// Calculate statistics from a slice of values
///
/// Returns `(mean, min, max, standard_deviation)`. The standard deviation is
/// the population form, `sqrt(sum((x - mean)^2) / N)`, which is also how
/// jitter is reported in summary logs.
///
/// An empty slice yields `(0.0, 0.0, 0.0, 0.0)`; callers that need to tell
/// "no data" apart from zero check for emptiness first.
///
/// ## Examples
///
/// ```rust
/// # use frame_metrics::utils::calculate_stats;
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let (mean, min, max, std_dev) = calculate_stats(&values);
/// assert_eq!(mean, 3.0);
/// assert_eq!(min, 1.0);
/// assert_eq!(max, 5.0);
/// assert!((std_dev - 1.4142).abs() < 0.001);
/// ```
pub fn calculate_stats(values: &[f64]) -> (f64, f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0, 0.0);
    }

    let sum: f64 = values.iter().sum();
    let count = values.len() as f64;
    let mean = sum / count;

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count;
    let std_dev = variance.sqrt();

    (mean, min, max, std_dev)
}

/// Calculate percentiles from a slice of values
///
/// Uses linear interpolation between the two nearest ranks:
/// for percentile P the fractional index is `(P/100) * (N-1)`. The 50th
/// percentile is therefore the conventional median (mean of the two middle
/// values for even N).
///
/// An empty slice pairs every requested percentile with 0.0.
///
/// ## Examples
///
/// ```rust
/// # use frame_metrics::utils::calculate_percentiles;
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let percentiles = calculate_percentiles(&values, &[50.0, 95.0]);
/// assert_eq!(percentiles[0], (50.0, 3.0));
/// ```
pub fn calculate_percentiles(values: &[f64], percentiles: &[f64]) -> Vec<(f64, f64)> {
    if values.is_empty() {
        return percentiles.iter().map(|&p| (p, 0.0)).collect();
    }

    let mut sorted_values = values.to_vec();
    sorted_values.sort_by(|a, b| a.total_cmp(b));

    percentiles
        .iter()
        .map(|&p| {
            let index = (p / 100.0) * (sorted_values.len() - 1) as f64;
            let lower_index = index.floor() as usize;
            let upper_index = index.ceil() as usize;

            if lower_index == upper_index {
                (p, sorted_values[lower_index])
            } else {
                let lower_value = sorted_values[lower_index];
                let upper_value = sorted_values[upper_index];
                let weight = index - lower_index as f64;
                (p, lower_value + weight * (upper_value - lower_value))
            }
        })
        .collect()
}

/// Validate a histogram bin count
pub fn validate_bin_count(bin_count: usize) -> Result<(), AnalysisError> {
    if bin_count == 0 {
        return Err(AnalysisError::InvalidParameter(
            "bin count cannot be zero".to_string(),
        ));
    }
    if bin_count > 100_000 {
        return Err(AnalysisError::InvalidParameter(format!(
            "bin count {} is too high (maximum 100000)",
            bin_count
        )));
    }
    Ok(())
}

/// Validate an axis limit in milliseconds
///
/// Limits must be finite and strictly positive: the histogram range is
/// `[0, limit)` and box plots clip their y-axis at `limit`.
pub fn validate_axis_limit(limit: f64) -> Result<(), AnalysisError> {
    if !limit.is_finite() || limit <= 0.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "axis limit {} must be a finite value greater than zero",
            limit
        )));
    }
    Ok(())
}

/// Validate the list of frame sizes (in samples) that make up a comparison
pub fn validate_frame_sizes(frame_sizes: &[u32]) -> Result<(), AnalysisError> {
    if frame_sizes.is_empty() {
        return Err(AnalysisError::InvalidParameter(
            "at least one frame size is required".to_string(),
        ));
    }
    if let Some(&zero) = frame_sizes.iter().find(|&&f| f == 0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "frame size {} is not a valid sample count",
            zero
        )));
    }
    for (i, size) in frame_sizes.iter().enumerate() {
        if frame_sizes[..i].contains(size) {
            return Err(AnalysisError::InvalidParameter(format!(
                "frame size {} is listed more than once",
                size
            )));
        }
    }
    Ok(())
}

/// Format a millisecond value for log output
pub fn format_millis(ms: f64) -> String {
    format!("{:.3} ms", ms)
}

/// Legend label for one configuration, e.g. `"Frame size: 1.25 ms"`
pub fn frame_size_label(duration: AudioDuration) -> String {
    format!("Frame size: {} ms", duration)
}

/// Print a formatted table row
///
/// ```rust
/// # use frame_metrics::utils::{print_table_row, print_table_separator};
/// let widths = [12, 10];
/// print_table_separator(&widths);
/// print_table_row(&["Frame [ms]", "RTT [ms]"], &widths);
/// print_table_separator(&widths);
/// ```
pub fn print_table_row(columns: &[&str], widths: &[usize]) {
    print!("|");
    for (i, column) in columns.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(10);
        print!(" {:width$} |", column, width = width);
    }
    println!();
}

/// Print a table separator matching `print_table_row` widths
pub fn print_table_separator(widths: &[usize]) {
    print!("+");
    for &width in widths {
        print!("{}", "-".repeat(width + 2));
        print!("+");
    }
    println!();
}
