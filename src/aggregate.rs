//! # Multi-Configuration Aggregation
//!
//! Loads one (inter-arrival log, packet metrics log) pair per frame-size
//! configuration and lines the resulting millisecond series up per metric, so
//! that series `i` of every metric belongs to configuration `i`.
//!
//! Loading is all-or-nothing: a missing or corrupt log in any configuration
//! fails the whole load. Comparative charts built from a partial set would
//! silently attach labels to the wrong series.

use crate::error::{AnalysisError, LineError};
use crate::records::{parse_inter_arrival_log, parse_packet_log, PacketLogFormat, PacketRecord};
use crate::summary::ConfigurationSummary;
use crate::units::micros_to_millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Something that yields the full set of lines of one log
pub trait LineSource {
    /// Read every line; a source that cannot be read is `MissingSource`
    /// and a line that is not UTF-8 is `MalformedLine`
    fn read_lines(&self) -> Result<Vec<String>, AnalysisError>;

    /// Name used in errors and log output
    fn describe(&self) -> String;
}

impl LineSource for Path {
    fn read_lines(&self) -> Result<Vec<String>, AnalysisError> {
        let source_name = self.display().to_string();
        let bytes = std::fs::read(self).map_err(|error| AnalysisError::MissingSource {
            source_name: source_name.clone(),
            error,
        })?;
        decode_lines(&bytes, &source_name)
    }

    fn describe(&self) -> String {
        self.display().to_string()
    }
}

/// Split raw file contents the way `str::lines` does, decoding each line on
/// its own so a bad byte is reported with its line number
fn decode_lines(bytes: &[u8], source_name: &str) -> Result<Vec<String>, AnalysisError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let terminated = body.len() < bytes.len();
    let segments: Vec<&[u8]> = body.split(|&b| b == b'\n').collect();
    let last = segments.len() - 1;

    segments
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let line = if i < last || terminated {
                line.strip_suffix(b"\r").unwrap_or(line)
            } else {
                line
            };
            std::str::from_utf8(line).map(str::to_string).map_err(|_| {
                AnalysisError::malformed(source_name, i + 1, LineError::InvalidUtf8)
            })
        })
        .collect()
}

impl LineSource for PathBuf {
    fn read_lines(&self) -> Result<Vec<String>, AnalysisError> {
        self.as_path().read_lines()
    }

    fn describe(&self) -> String {
        self.as_path().describe()
    }
}

/// Log contents already held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryLog {
    name: String,
    lines: Vec<String>,
}

impl InMemoryLog {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Split a text blob into lines
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, text.lines().map(str::to_string).collect())
    }
}

impl LineSource for InMemoryLog {
    fn read_lines(&self) -> Result<Vec<String>, AnalysisError> {
        Ok(self.lines.clone())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl LineSource for Vec<String> {
    fn read_lines(&self) -> Result<Vec<String>, AnalysisError> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        "in-memory log".to_string()
    }
}

impl<T: LineSource + ?Sized> LineSource for &T {
    fn read_lines(&self) -> Result<Vec<String>, AnalysisError> {
        (**self).read_lines()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// The two logs of one configuration plus its display label
#[derive(Debug, Clone)]
pub struct ConfigurationSources<S> {
    pub label: String,
    pub inter_arrival: S,
    pub metrics: S,
}

impl<S> ConfigurationSources<S> {
    pub fn new(label: impl Into<String>, inter_arrival: S, metrics: S) -> Self {
        Self {
            label: label.into(),
            inter_arrival,
            metrics,
        }
    }
}

/// Metrics that are compared across configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    EndToEnd,
    RoundTripTime,
    InterArrival,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [
        MetricKind::EndToEnd,
        MetricKind::RoundTripTime,
        MetricKind::InterArrival,
    ];

    /// Chart title
    pub fn title(self) -> &'static str {
        match self {
            MetricKind::EndToEnd => "End to End Latency",
            MetricKind::RoundTripTime => "Round Trip Time",
            MetricKind::InterArrival => "Inter-Arrivals",
        }
    }

    /// Axis label, always in milliseconds
    pub fn axis_label(self) -> &'static str {
        match self {
            MetricKind::EndToEnd => "End To End Latency [millisecond]",
            MetricKind::RoundTripTime => "Round Trip Time [millisecond]",
            MetricKind::InterArrival => "Packet Inter-Arrivals [millisecond]",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricKind::EndToEnd => write!(f, "end-to-end"),
            MetricKind::RoundTripTime => write!(f, "RTT"),
            MetricKind::InterArrival => write!(f, "inter-arrival"),
        }
    }
}

/// Parsed, unnormalized logs of one configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationData {
    pub label: String,
    pub records: Vec<PacketRecord>,
    pub inter_arrivals_us: Vec<i64>,
}

impl ConfigurationData {
    /// Read and parse both logs of one configuration
    pub fn load<S: LineSource>(
        sources: &ConfigurationSources<S>,
        format: PacketLogFormat,
    ) -> Result<Self, AnalysisError> {
        let metrics_name = sources.metrics.describe();
        let metrics_lines = sources.metrics.read_lines()?;
        let records = parse_packet_log(&metrics_lines, format, &metrics_name)?;

        let inter_arrival_name = sources.inter_arrival.describe();
        let inter_arrival_lines = sources.inter_arrival.read_lines()?;
        let inter_arrivals_us = parse_inter_arrival_log(&inter_arrival_lines, &inter_arrival_name)?;

        debug!(
            "Loaded {}: {} packets from {}, {} inter-arrivals from {}",
            sources.label,
            records.len(),
            metrics_name,
            inter_arrivals_us.len(),
            inter_arrival_name
        );

        Ok(Self {
            label: sources.label.clone(),
            records,
            inter_arrivals_us,
        })
    }

    pub fn end_to_end_ms(&self) -> Vec<f64> {
        let micros: Vec<i64> = self
            .records
            .iter()
            .filter_map(|r| r.end_to_end_micros)
            .collect();
        micros_to_millis(&micros)
    }

    pub fn rtt_ms(&self) -> Vec<f64> {
        let micros: Vec<i64> = self.records.iter().map(|r| r.rtt_micros).collect();
        micros_to_millis(&micros)
    }

    pub fn inter_arrival_ms(&self) -> Vec<f64> {
        micros_to_millis(&self.inter_arrivals_us)
    }

    /// Summary row computed from the raw logs
    pub fn summarize(&self, frame_size_ms: f64) -> Option<ConfigurationSummary> {
        ConfigurationSummary::from_measurements(frame_size_ms, &self.records, &self.inter_arrivals_us)
    }
}

/// Millisecond series per metric, one inner series per configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetricSet {
    labels: Vec<String>,
    series: BTreeMap<MetricKind, Vec<Vec<f64>>>,
}

impl AggregatedMetricSet {
    fn new(has_end_to_end: bool) -> Self {
        let mut series = BTreeMap::new();
        for metric in MetricKind::ALL {
            if metric != MetricKind::EndToEnd || has_end_to_end {
                series.insert(metric, Vec::new());
            }
        }
        Self {
            labels: Vec::new(),
            series,
        }
    }

    fn push(&mut self, data: &ConfigurationData) {
        self.labels.push(data.label.clone());
        for (metric, per_configuration) in self.series.iter_mut() {
            let values = match metric {
                MetricKind::EndToEnd => data.end_to_end_ms(),
                MetricKind::RoundTripTime => data.rtt_ms(),
                MetricKind::InterArrival => data.inter_arrival_ms(),
            };
            per_configuration.push(values);
        }
    }

    /// Configuration labels in load order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn configuration_count(&self) -> usize {
        self.labels.len()
    }

    /// Series of one metric, one per configuration; `None` if the logs lack it
    pub fn get(&self, metric: MetricKind) -> Option<&[Vec<f64>]> {
        self.series.get(&metric).map(Vec::as_slice)
    }

    /// Metrics present in this set, in a fixed order
    pub fn metrics(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.series.keys().copied()
    }
}

/// Load every configuration in order, failing on the first bad source
///
/// Returns the aggregated series and the parsed per-configuration data, both
/// in input order.
pub fn load_configurations_with_data<S: LineSource>(
    configurations: &[ConfigurationSources<S>],
    format: PacketLogFormat,
) -> Result<(AggregatedMetricSet, Vec<ConfigurationData>), AnalysisError> {
    if configurations.is_empty() {
        return Err(AnalysisError::EmptyConfigurationSet);
    }

    let loaded = configurations
        .iter()
        .map(|sources| ConfigurationData::load(sources, format))
        .collect::<Result<Vec<_>, _>>()?;

    let mut set = AggregatedMetricSet::new(format.has_end_to_end());
    for data in &loaded {
        set.push(data);
    }

    info!(
        "Aggregated {} configurations ({} log format)",
        set.configuration_count(),
        format
    );
    Ok((set, loaded))
}

/// Load every configuration and assemble per-metric series
pub fn load_configurations<S: LineSource>(
    configurations: &[ConfigurationSources<S>],
    format: PacketLogFormat,
) -> Result<AggregatedMetricSet, AnalysisError> {
    load_configurations_with_data(configurations, format).map(|(set, _)| set)
}
