use crate::aggregate::MetricKind;
use crate::analysis::MetricPlotSettings;
use crate::metrics::{compute_percentage_histogram, PercentageHistogram, SeriesStatistics};
use crate::records::PacketLogFormat;
use crate::summary::{ConfigurationSummary, SummarySchema};
use crate::units::AudioFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Y-axis label shared by every percentage histogram
pub const PERCENTAGE_AXIS_LABEL: &str = "Percentage [%]";

/// X-axis label shared by every box plot
pub const FRAME_SIZE_AXIS_LABEL: &str = "Frame Size [millisecond]";

const SUMMARY_TABLE_TITLE: &str = "End-to-End, RTT, Inter-Arrival, Jitter, Unordered Packets,\nand Lost Packets Metrics for Various Frame Sizes";

/// Everything the chart renderer needs, in configuration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub metadata: DatasetMetadata,
    pub histograms: Vec<HistogramChart>,
    pub box_plots: Vec<BoxPlotChart>,
    pub summary_table: Option<SummaryTableChart>,
    pub computed_summaries: Vec<LabelledSummary>,
}

/// Dataset metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// `"<setup> [<connection type>]"`, drawn under every chart title
    pub subtitle: String,
    pub configuration_labels: Vec<String>,
    pub packet_format: PacketLogFormat,
    pub audio_format: AudioFormat,
}

impl DatasetMetadata {
    pub fn new(
        subtitle: String,
        configuration_labels: Vec<String>,
        packet_format: PacketLogFormat,
        audio_format: AudioFormat,
    ) -> Self {
        Self {
            version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            subtitle,
            configuration_labels,
            packet_format,
            audio_format,
        }
    }
}

/// Overlaid percentage histograms of one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramChart {
    pub metric: MetricKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bin_count: usize,
    pub x_limit: f64,
    pub series: Vec<HistogramSeries>,
}

/// One configuration's histogram within a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSeries {
    pub label: String,
    pub histogram: PercentageHistogram,
}

impl HistogramChart {
    /// Bin every configuration's series with the metric's settings
    pub fn build(
        metric: MetricKind,
        settings: &MetricPlotSettings,
        labels: &[String],
        series: &[Vec<f64>],
    ) -> Result<Self> {
        let series = labels
            .iter()
            .zip(series)
            .map(|(label, values)| {
                let histogram =
                    compute_percentage_histogram(values, settings.bin_count, settings.x_limit)
                        .with_context(|| format!("Failed to bin {} series '{}'", metric, label))?;
                if histogram.is_empty() {
                    debug!("{} series '{}' is empty", metric, label);
                }
                Ok(HistogramSeries {
                    label: label.clone(),
                    histogram,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            metric,
            title: metric.title().to_string(),
            x_label: metric.axis_label().to_string(),
            y_label: PERCENTAGE_AXIS_LABEL.to_string(),
            bin_count: settings.bin_count,
            x_limit: settings.x_limit,
            series,
        })
    }
}

/// Side-by-side box plots of one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotChart {
    pub metric: MetricKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_limit: f64,
    pub groups: Vec<BoxGroup>,
}

/// Raw values of one box plus the median and mean annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxGroup {
    /// Tick label, the frame duration alone (e.g. "1.25")
    pub tick_label: String,
    pub values: Vec<f64>,
    pub statistics: Option<SeriesStatistics>,
}

impl BoxPlotChart {
    pub fn build(
        metric: MetricKind,
        settings: &MetricPlotSettings,
        tick_labels: &[String],
        series: &[Vec<f64>],
    ) -> Self {
        let groups = tick_labels
            .iter()
            .zip(series)
            .map(|(tick_label, values)| BoxGroup {
                tick_label: tick_label.clone(),
                statistics: SeriesStatistics::from_values(values),
                values: values.clone(),
            })
            .collect();

        Self {
            metric,
            title: metric.title().to_string(),
            x_label: FRAME_SIZE_AXIS_LABEL.to_string(),
            y_label: metric.axis_label().to_string(),
            y_limit: settings.y_limit,
            groups,
        }
    }
}

/// Summary rows laid out for the table renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTableChart {
    pub title: String,
    pub subtitle: String,
    pub schema: SummarySchema,
    pub column_labels: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl SummaryTableChart {
    pub fn build(schema: SummarySchema, subtitle: &str, rows: &[ConfigurationSummary]) -> Self {
        Self {
            title: SUMMARY_TABLE_TITLE.to_string(),
            subtitle: format!("Setup: {}", subtitle),
            schema,
            column_labels: schema
                .column_labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
            rows: rows.iter().map(|row| row.table_row(schema)).collect(),
        }
    }
}

/// Summary computed from one configuration's raw logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledSummary {
    pub label: String,
    /// `None` when the configuration logged no packets or no inter-arrival times
    pub summary: Option<ConfigurationSummary>,
}

/// Subtitle shown under every chart title
pub fn chart_subtitle(setup: &str, connection_type: &str) -> String {
    let setup = setup.trim();
    let connection_type = connection_type.trim();
    match (setup.is_empty(), connection_type.is_empty()) {
        (true, true) => String::new(),
        (false, true) => setup.to_string(),
        (true, false) => format!("[{}]", connection_type),
        (false, false) => format!("{} [{}]", setup, connection_type),
    }
}

/// Writes the chart dataset handed to the renderer
pub struct ResultsManager {
    output_file: PathBuf,
}

impl ResultsManager {
    /// Create a new results manager
    pub fn new(output_file: &Path) -> Result<Self> {
        Ok(Self {
            output_file: output_file.to_path_buf(),
        })
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Write the dataset as pretty-printed JSON, creating parent directories
    pub fn write(&self, dataset: &ChartDataset) -> Result<()> {
        if let Some(parent) = self.output_file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory {:?}", parent)
                })?;
            }
        }

        let json = serde_json::to_string_pretty(dataset)?;
        std::fs::write(&self.output_file, json)
            .with_context(|| format!("Failed to write {:?}", self.output_file))?;

        info!(
            "Chart data for {} configurations written to: {:?}",
            dataset.metadata.configuration_labels.len(),
            self.output_file
        );
        Ok(())
    }

    /// Read back a dataset previously written by [`ResultsManager::write`]
    pub fn read(&self) -> Result<ChartDataset> {
        let json = std::fs::read_to_string(&self.output_file)
            .with_context(|| format!("Failed to read {:?}", self.output_file))?;
        let dataset = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {:?}", self.output_file))?;
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    fn settings(bin_count: usize, limit: f64) -> MetricPlotSettings {
        MetricPlotSettings {
            bin_count,
            x_limit: limit,
            y_limit: limit,
        }
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_chart_subtitle() {
        assert_eq!(chart_subtitle("LAN", "UDP"), "LAN [UDP]");
        assert_eq!(chart_subtitle(" LAN ", ""), "LAN");
        assert_eq!(chart_subtitle("", "TCP"), "[TCP]");
        assert_eq!(chart_subtitle("", ""), "");
    }

    #[test]
    fn test_histogram_chart_keeps_configuration_order() {
        let series = vec![vec![1.0, 2.0], vec![9.5], vec![]];
        let chart = HistogramChart::build(
            MetricKind::RoundTripTime,
            &settings(10, 10.0),
            &labels(&["a", "b", "c"]),
            &series,
        )
        .unwrap();

        assert_eq!(chart.title, "Round Trip Time");
        assert_eq!(chart.y_label, PERCENTAGE_AXIS_LABEL);
        let names: Vec<&str> = chart.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(chart.series[0].histogram.mean, Some(1.5));
        assert_eq!(chart.series[1].histogram.bins[9].percentage, 100.0);
        assert!(chart.series[2].histogram.is_empty());
    }

    #[test]
    fn test_histogram_chart_rejects_bad_settings() {
        let result = HistogramChart::build(
            MetricKind::EndToEnd,
            &settings(0, 60.0),
            &labels(&["a"]),
            &[vec![1.0]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_box_plot_chart() {
        let chart = BoxPlotChart::build(
            MetricKind::InterArrival,
            &settings(120, 60.0),
            &labels(&["1.25", "2.5"]),
            &[vec![1.0, 3.0, 2.0], vec![]],
        );
        assert_eq!(chart.x_label, FRAME_SIZE_AXIS_LABEL);
        assert_eq!(chart.y_label, "Packet Inter-Arrivals [millisecond]");
        assert_eq!(chart.y_limit, 60.0);
        assert_eq!(chart.groups[0].statistics.unwrap().median, 2.0);
        assert!(chart.groups[1].statistics.is_none());
    }

    #[test]
    fn test_summary_table_chart() {
        let row = ConfigurationSummary {
            frame_size_ms: 1.25,
            avg_end_to_end_ms: None,
            avg_rtt_ms: 3.0,
            avg_inter_arrival_ms: 1.25,
            jitter_ms: 0.5,
            unordered_pct: None,
            lost_pct: None,
        };
        let table = SummaryTableChart::build(SummarySchema::RttOnly, "LAN [UDP]", &[row]);
        assert_eq!(table.subtitle, "Setup: LAN [UDP]");
        assert_eq!(table.column_labels.len(), 4);
        assert_eq!(table.rows, vec![vec![1.25, 3.0, 1.25, 0.5]]);
    }

    #[test]
    fn test_results_manager_creation() {
        let temp_file = NamedTempFile::new().unwrap();
        let manager = ResultsManager::new(temp_file.path()).unwrap();
        assert_eq!(manager.output_file(), temp_file.path());
    }

    #[test]
    fn test_results_manager_writes_and_reads_dataset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Plots").join("chart_data.json");
        let manager = ResultsManager::new(&path).unwrap();

        let chart_labels = labels(&["Frame size: 10 ms"]);
        let dataset = ChartDataset {
            metadata: DatasetMetadata::new(
                chart_subtitle("LAN", "UDP"),
                chart_labels.clone(),
                PacketLogFormat::LegacyRttOnly,
                AudioFormat::default(),
            ),
            histograms: vec![HistogramChart::build(
                MetricKind::RoundTripTime,
                &settings(30, 10.0),
                &chart_labels,
                &[vec![1.0, 2.0, 3.0]],
            )
            .unwrap()],
            box_plots: Vec::new(),
            summary_table: None,
            computed_summaries: Vec::new(),
        };

        manager.write(&dataset).unwrap();
        assert!(path.exists());
        let read_back = manager.read().unwrap();
        assert_eq!(read_back.metadata, dataset.metadata);
        assert_eq!(read_back.histograms.len(), 1);
        assert_eq!(read_back.histograms[0].series[0].label, "Frame size: 10 ms");
        assert_eq!(read_back.histograms[0].series[0].histogram.mean, Some(2.0));
    }
}
