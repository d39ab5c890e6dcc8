//! # Analysis Pipeline
//!
//! Drives one comparative analysis from parsed arguments to a finished
//! [`ChartDataset`]:
//!
//! 1. **Resolve sources**: one (inter-arrival, metrics) log pair per frame size,
//!    named from the configured patterns inside the stats directory
//! 2. **Aggregate**: load every pair, all or nothing, in frame-size order
//! 3. **Bin and summarize**: a percentage histogram and box-plot statistics per
//!    metric and configuration
//! 4. **Summary table**: parse the summary log in file order, then check the
//!    ordering and sort it only on request
//!
//! Frame-size labels come from the configured audio format, so every chart
//! legend and box-plot tick stays aligned with the series it describes.

use crate::aggregate::{
    load_configurations_with_data, ConfigurationSources, LineSource, MetricKind,
};
use crate::cli::{expand_pattern, Args};
use crate::records::PacketLogFormat;
use crate::results::{
    chart_subtitle, BoxPlotChart, ChartDataset, DatasetMetadata, HistogramChart, LabelledSummary,
    SummaryTableChart,
};
use crate::summary::{
    build_summary_table, is_ascending_by_frame_size, sort_by_frame_size, SummarySchema,
};
use crate::units::{frame_size_to_audio_duration_ms, AudioDuration, AudioFormat};
use crate::utils::{frame_size_label, validate_axis_limit, validate_bin_count, validate_frame_sizes};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Histogram and box-plot parameters of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPlotSettings {
    /// Equal-width histogram bins over `[0, x_limit)`
    pub bin_count: usize,
    /// Histogram range upper bound [ms]
    pub x_limit: f64,
    /// Box plot y-axis upper bound [ms]
    pub y_limit: f64,
}

impl MetricPlotSettings {
    pub fn validate(&self) -> Result<()> {
        validate_bin_count(self.bin_count)?;
        validate_axis_limit(self.x_limit)?;
        validate_axis_limit(self.y_limit)?;
        Ok(())
    }
}

/// Configuration for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub stats_dir: PathBuf,

    /// Frame sizes in samples; their order is the display order of every chart
    pub frame_sizes: Vec<u32>,

    pub inter_arrival_pattern: String,
    pub metrics_pattern: String,

    /// `None` skips the summary table
    pub summary_file: Option<PathBuf>,

    pub packet_format: PacketLogFormat,
    pub summary_schema: SummarySchema,
    pub sort_summary: bool,
    pub audio_format: AudioFormat,

    pub end_to_end: MetricPlotSettings,
    pub rtt: MetricPlotSettings,
    pub inter_arrival: MetricPlotSettings,

    pub setup: String,
    pub connection_type: String,
}

impl AnalysisConfig {
    /// Build and validate a configuration from command-line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        validate_frame_sizes(&args.frame_sizes)?;
        let audio_format = AudioFormat::new(args.sample_rate, args.channels)?;

        let config = Self {
            stats_dir: args.stats_dir.clone(),
            frame_sizes: args.frame_sizes.clone(),
            inter_arrival_pattern: args.inter_arrival_pattern.clone(),
            metrics_pattern: args.metrics_pattern.clone(),
            summary_file: if args.no_summary {
                None
            } else {
                Some(args.stats_dir.join(&args.summary_file))
            },
            packet_format: args.packet_format,
            summary_schema: args.summary_schema,
            sort_summary: args.sort_summary,
            audio_format,
            end_to_end: MetricPlotSettings {
                bin_count: args.end_to_end_bins,
                x_limit: args.end_to_end_x_limit,
                y_limit: args.end_to_end_y_limit,
            },
            rtt: MetricPlotSettings {
                bin_count: args.rtt_bins,
                x_limit: args.rtt_x_limit,
                y_limit: args.rtt_y_limit,
            },
            inter_arrival: MetricPlotSettings {
                bin_count: args.inter_arrival_bins,
                x_limit: args.inter_arrival_x_limit,
                y_limit: args.inter_arrival_y_limit,
            },
            setup: args.setup.clone(),
            connection_type: args.connection_type.clone(),
        };

        for metric in MetricKind::ALL {
            config
                .plot_settings(metric)
                .validate()
                .with_context(|| format!("Invalid {} chart settings", metric))?;
        }

        Ok(config)
    }

    pub fn plot_settings(&self, metric: MetricKind) -> MetricPlotSettings {
        match metric {
            MetricKind::EndToEnd => self.end_to_end,
            MetricKind::RoundTripTime => self.rtt,
            MetricKind::InterArrival => self.inter_arrival,
        }
    }

    /// Audio duration of every configured frame size, in order
    pub fn frame_durations(&self) -> Vec<AudioDuration> {
        self.frame_sizes
            .iter()
            .map(|&size| frame_size_to_audio_duration_ms(size, &self.audio_format))
            .collect()
    }

    /// Log file pair of every configured frame size, in order
    pub fn configuration_sources(&self) -> Vec<ConfigurationSources<PathBuf>> {
        self.frame_sizes
            .iter()
            .zip(self.frame_durations())
            .map(|(&size, duration)| {
                ConfigurationSources::new(
                    frame_size_label(duration),
                    self.stats_dir
                        .join(expand_pattern(&self.inter_arrival_pattern, size)),
                    self.stats_dir.join(expand_pattern(&self.metrics_pattern, size)),
                )
            })
            .collect()
    }
}

struct AnalysisConfigDisplay<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> std::fmt::Display for AnalysisConfigDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let durations: Vec<String> = self
            .config
            .frame_durations()
            .iter()
            .map(|d| d.to_string())
            .collect();

        writeln!(
            f,
            "-----------------------------------------------------------------"
        )?;
        writeln!(f, "Frame Metrics Analysis")?;
        writeln!(f, "  Stats Directory:    {:?}", self.config.stats_dir)?;
        writeln!(f, "  Frame Sizes:        {:?} samples", self.config.frame_sizes)?;
        writeln!(f, "  Frame Durations:    {} ms", durations.join(", "))?;
        writeln!(
            f,
            "  Audio Format:       {} Hz, {} channel(s)",
            self.config.audio_format.sample_rate_hz(),
            self.config.audio_format.channel_count()
        )?;
        writeln!(f, "  Packet Log Format:  {}", self.config.packet_format)?;
        match &self.config.summary_file {
            Some(path) => writeln!(f, "  Summary Log:        {:?}", path)?,
            None => writeln!(f, "  Summary Log:        Skipped")?,
        }
        write!(
            f,
            "-----------------------------------------------------------------"
        )
    }
}

/// Runs the analysis pipeline for one configuration set
pub struct AnalysisRunner {
    config: AnalysisConfig,
}

impl AnalysisRunner {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load, bin and summarize every configuration
    pub fn run(&self) -> Result<ChartDataset> {
        info!(
            "{}",
            AnalysisConfigDisplay {
                config: &self.config
            }
        );

        let sources = self.config.configuration_sources();
        let (set, data) = load_configurations_with_data(&sources, self.config.packet_format)
            .context("Failed to load configuration logs")?;

        let durations = self.config.frame_durations();
        let tick_labels: Vec<String> = durations.iter().map(|d| d.to_string()).collect();

        let mut histograms = Vec::new();
        let mut box_plots = Vec::new();
        for metric in set.metrics() {
            let Some(series) = set.get(metric) else {
                continue;
            };
            let settings = self.config.plot_settings(metric);
            histograms.push(HistogramChart::build(metric, &settings, set.labels(), series)?);
            box_plots.push(BoxPlotChart::build(metric, &settings, &tick_labels, series));
        }
        info!(
            "Prepared {} histogram and {} box plot charts",
            histograms.len(),
            box_plots.len()
        );

        let subtitle = chart_subtitle(&self.config.setup, &self.config.connection_type);
        let summary_table = match &self.config.summary_file {
            Some(path) => Some(self.load_summary_table(path, &subtitle)?),
            None => None,
        };

        let computed_summaries = data
            .iter()
            .zip(&durations)
            .map(|(configuration, duration)| LabelledSummary {
                label: configuration.label.clone(),
                summary: configuration.summarize(duration.as_f64()),
            })
            .collect();

        Ok(ChartDataset {
            metadata: DatasetMetadata::new(
                subtitle,
                set.labels().to_vec(),
                self.config.packet_format,
                self.config.audio_format,
            ),
            histograms,
            box_plots,
            summary_table,
            computed_summaries,
        })
    }

    fn load_summary_table(&self, path: &Path, subtitle: &str) -> Result<SummaryTableChart> {
        let source_name = path.describe();
        let lines = path
            .read_lines()
            .with_context(|| format!("Failed to open summary log {}", source_name))?;
        let mut rows = build_summary_table(&lines, self.config.summary_schema, &source_name)?;

        if rows.is_empty() {
            warn!("No summary rows matched the expected layout in {}", source_name);
        } else if !is_ascending_by_frame_size(&rows) {
            if self.config.sort_summary {
                sort_by_frame_size(&mut rows);
                info!("Sorted {} summary rows by frame size", rows.len());
            } else {
                warn!(
                    "Summary rows in {} are not in ascending frame-size order; pass --sort-summary to sort them",
                    source_name
                );
            }
        }

        Ok(SummaryTableChart::build(
            self.config.summary_schema,
            subtitle,
            &rows,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_args_defaults() {
        let args = Args::parse_from(["frame-metrics", "LAN", "UDP"]);
        let config = AnalysisConfig::from_args(&args).unwrap();

        assert_eq!(config.frame_sizes, vec![120, 240, 480, 960, 1920]);
        assert_eq!(
            config.summary_file,
            Some(PathBuf::from("./Stats").join("SummarizedStats.txt"))
        );
        assert_eq!(
            config.plot_settings(MetricKind::RoundTripTime),
            MetricPlotSettings {
                bin_count: 30,
                x_limit: 10.0,
                y_limit: 10.0,
            }
        );
        assert_eq!(config.plot_settings(MetricKind::EndToEnd).bin_count, 120);
        assert_eq!(config.plot_settings(MetricKind::InterArrival).x_limit, 60.0);
    }

    #[test]
    fn test_from_args_rejects_invalid_values() {
        for bad in [
            vec!["frame-metrics", "--rtt-bins", "0"],
            vec!["frame-metrics", "--end-to-end-x-limit", "0"],
            vec!["frame-metrics", "--inter-arrival-y-limit=-1"],
            vec!["frame-metrics", "--frame-sizes", "120,120"],
            vec!["frame-metrics", "--sample-rate", "0"],
            vec!["frame-metrics", "--channels", "0"],
        ] {
            let args = Args::parse_from(bad.clone());
            assert!(AnalysisConfig::from_args(&args).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_configuration_sources_follow_frame_size_order() {
        let args = Args::parse_from([
            "frame-metrics",
            "--stats-dir",
            "/data",
            "--frame-sizes",
            "1920,120",
            "--no-summary",
        ]);
        let config = AnalysisConfig::from_args(&args).unwrap();
        assert!(config.summary_file.is_none());

        let sources = config.configuration_sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].label, "Frame size: 20 ms");
        assert_eq!(
            sources[0].metrics,
            PathBuf::from("/data/StatisticsLog 1920.txt")
        );
        assert_eq!(sources[1].label, "Frame size: 1.25 ms");
        assert_eq!(
            sources[1].inter_arrival,
            PathBuf::from("/data/interArrivalLog 120.txt")
        );
    }

    #[test]
    fn test_run_fails_when_logs_are_missing() {
        let args = Args::parse_from([
            "frame-metrics",
            "--stats-dir",
            "/nonexistent/frame-metrics",
            "--no-summary",
        ]);
        let runner = AnalysisRunner::new(AnalysisConfig::from_args(&args).unwrap());
        let err = runner.run().unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load configuration logs"));
    }
}
