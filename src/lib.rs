//! # Frame Metrics Library
//!
//! Turns per-packet network measurement logs, captured once per audio
//! frame-size configuration, into normalized millisecond series and
//! chart-ready statistics for comparing those configurations side by side.
//!
//! ## Inputs
//!
//! For every configuration (frame size in samples) the stats directory holds:
//!
//! - **Packet metrics log** (`StatisticsLog <frame size>.txt`): one packet per
//!   line, whitespace-separated, index at token 1 and RTT or end-to-end latency
//!   in microseconds at tokens 6 and 12
//! - **Inter-arrival log** (`interArrivalLog <frame size>.txt`): one
//!   microsecond delay per line
//!
//! plus one **summary log** (`SummarizedStats.txt`) with a pipe-delimited row
//! per configuration.
//!
//! ## Architecture Overview
//!
//! - `records`: packet and inter-arrival line parsing
//! - `units`: microsecond to millisecond conversion, frame-size durations
//! - `metrics`: fixed-range percentage histograms and series statistics
//! - `summary`: summary log parsing and writing
//! - `aggregate`: all-or-nothing loading of N configurations
//! - `analysis`: configuration and the end-to-end pipeline
//! - `results`: the dataset handed to the chart renderer
//!
//! ## Usage Example
//!
//! ```rust
//! use frame_metrics::aggregate::{load_configurations, ConfigurationSources, InMemoryLog, MetricKind};
//! use frame_metrics::metrics::compute_percentage_histogram;
//! use frame_metrics::records::PacketLogFormat;
//!
//! let configs = vec![ConfigurationSources::new(
//!     "Frame size: 10 ms",
//!     InMemoryLog::from_text("interArrivalLog 960.txt", "10000\n9500\n"),
//!     InMemoryLog::from_text("StatisticsLog 960.txt", "pkt 0 x x x x 2500\npkt 1 x x x x 3500\n"),
//! )];
//!
//! let set = load_configurations(&configs, PacketLogFormat::LegacyRttOnly).unwrap();
//! let rtt = &set.get(MetricKind::RoundTripTime).unwrap()[0];
//! assert_eq!(rtt, &vec![2.5, 3.5]);
//!
//! let histogram = compute_percentage_histogram(rtt, 10, 10.0).unwrap();
//! assert_eq!(histogram.mean, Some(3.0));
//! ```

/// Multi-configuration loading
///
/// Reads one log pair per configuration through the `LineSource` trait and
/// assembles per-metric series in configuration order. A single missing or
/// corrupt source fails the whole load.
pub mod aggregate;

/// Analysis pipeline orchestration
///
/// `AnalysisConfig` is built from command-line arguments with validation;
/// `AnalysisRunner` produces the complete chart dataset.
pub mod analysis;

/// Command-line interface
pub mod cli;

/// Typed errors of the parsing and aggregation core
pub mod error;

/// Console log formatting
pub mod logging;

/// Percentage histograms and per-series statistics
pub mod metrics;

/// Packet metrics and inter-arrival log records
pub mod records;

/// Chart dataset output
///
/// Histogram, box-plot and table descriptions serialized to JSON for the
/// external renderer, plus the `ResultsManager` that writes them.
pub mod results;

/// Summary log rows: parsing, computation and formatting
pub mod summary;

/// Unit normalization
pub mod units;

pub mod utils;

pub use aggregate::{
    load_configurations, AggregatedMetricSet, ConfigurationSources, LineSource, MetricKind,
};
pub use analysis::{AnalysisConfig, AnalysisRunner};
pub use cli::Args;
pub use error::{AnalysisError, LineError};
pub use metrics::{compute_percentage_histogram, PercentageHistogram};
pub use records::{parse_inter_arrival_line, parse_packet_line, PacketLogFormat, PacketRecord};
pub use results::{ChartDataset, ResultsManager};
pub use summary::{build_summary_table, parse_summary_line, ConfigurationSummary, SummarySchema};
pub use units::{frame_size_to_audio_duration_ms, micros_to_millis, AudioDuration, AudioFormat};

/// The current version of the crate
///
/// Recorded in every chart dataset.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
///
/// These reproduce the measurement campaign the logs were recorded in:
/// 48 kHz stereo audio and five frame sizes from 1.25 ms to 20 ms.
pub mod defaults {
    /// Default sample rate in Hz
    pub const SAMPLE_RATE_HZ: u32 = 48000;

    /// Default channel count
    pub const CHANNEL_COUNT: u32 = 2;

    /// Default frame sizes in samples
    ///
    /// At 48 kHz stereo these are 1.25, 2.5, 5, 10 and 20 ms of audio.
    pub const FRAME_SIZES: [u32; 5] = [120, 240, 480, 960, 1920];

    /// Directory holding all logs
    pub const STATS_DIR: &str = "./Stats";

    /// Summary log file name
    pub const SUMMARY_FILE: &str = "SummarizedStats.txt";

    /// Inter-arrival log name, `{}` is the frame size in samples
    pub const INTER_ARRIVAL_PATTERN: &str = "interArrivalLog {}.txt";

    /// Packet metrics log name, `{}` is the frame size in samples
    pub const METRICS_PATTERN: &str = "StatisticsLog {}.txt";

    /// Default output file name
    pub const OUTPUT_FILE: &str = "chart_data.json";

    pub const END_TO_END_BINS: usize = 120;
    pub const END_TO_END_X_LIMIT: f64 = 60.0;
    pub const END_TO_END_Y_LIMIT: f64 = 60.0;

    /// RTTs sit well below end-to-end latency, so their charts use a narrower range
    pub const RTT_BINS: usize = 30;
    pub const RTT_X_LIMIT: f64 = 10.0;
    pub const RTT_Y_LIMIT: f64 = 10.0;

    pub const INTER_ARRIVAL_BINS: usize = 120;
    pub const INTER_ARRIVAL_X_LIMIT: f64 = 60.0;
    pub const INTER_ARRIVAL_Y_LIMIT: f64 = 60.0;
}
