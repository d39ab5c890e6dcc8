use crate::records::PacketLogFormat;
use crate::summary::SummarySchema;
use clap::Parser;
use std::path::PathBuf;

/// Frame Metrics - Comparative latency analysis across audio frame sizes
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// Test setup shown in chart subtitles (e.g. "Wi-Fi to Ethernet")
    #[clap(default_value = "")]
    pub setup: String,

    /// Connection type shown in brackets after the setup (e.g. "UDP")
    #[clap(default_value = "")]
    pub connection_type: String,

    /// Directory holding the per-configuration logs and the summary log
    #[clap(short = 'd', long, default_value = crate::defaults::STATS_DIR, help_heading = "Input")]
    pub stats_dir: PathBuf,

    /// Frame sizes in samples, one configuration each, in display order
    #[clap(short = 'f', long, value_delimiter = ',', num_args = 1.., default_values_t = crate::defaults::FRAME_SIZES.to_vec(), help_heading = "Input")]
    pub frame_sizes: Vec<u32>,

    /// Inter-arrival log name; `{}` is replaced by the frame size
    #[clap(long, default_value = crate::defaults::INTER_ARRIVAL_PATTERN, help_heading = "Input")]
    pub inter_arrival_pattern: String,

    /// Packet metrics log name; `{}` is replaced by the frame size
    #[clap(long, default_value = crate::defaults::METRICS_PATTERN, help_heading = "Input")]
    pub metrics_pattern: String,

    /// Summary log name inside the stats directory
    #[clap(long, default_value = crate::defaults::SUMMARY_FILE, help_heading = "Input")]
    pub summary_file: String,

    /// Skip the summary table
    #[clap(long, default_value_t = false, help_heading = "Input")]
    pub no_summary: bool,

    /// Packet metrics log layout
    #[clap(long, value_enum, default_value_t = PacketLogFormat::ExtendedEndToEndRtt, help_heading = "Input")]
    pub packet_format: PacketLogFormat,

    /// Summary log layout
    #[clap(long, value_enum, default_value_t = SummarySchema::EndToEndExtended, help_heading = "Input")]
    pub summary_schema: SummarySchema,

    /// Sort summary rows by frame size instead of keeping file order
    #[clap(long, default_value_t = false, help_heading = "Input")]
    pub sort_summary: bool,

    /// Sample rate used to convert frame sizes to milliseconds
    #[clap(long, default_value_t = crate::defaults::SAMPLE_RATE_HZ, help_heading = "Audio")]
    pub sample_rate: u32,

    /// Channel count used to convert frame sizes to milliseconds
    #[clap(long, default_value_t = crate::defaults::CHANNEL_COUNT, help_heading = "Audio")]
    pub channels: u32,

    /// Histogram bins for end-to-end latency
    #[clap(long, default_value_t = crate::defaults::END_TO_END_BINS, help_heading = "Charts")]
    pub end_to_end_bins: usize,

    /// Histogram x-axis limit for end-to-end latency [ms]
    #[clap(long, default_value_t = crate::defaults::END_TO_END_X_LIMIT, help_heading = "Charts")]
    pub end_to_end_x_limit: f64,

    /// Box plot y-axis limit for end-to-end latency [ms]
    #[clap(long, default_value_t = crate::defaults::END_TO_END_Y_LIMIT, help_heading = "Charts")]
    pub end_to_end_y_limit: f64,

    /// Histogram bins for round trip time
    #[clap(long, default_value_t = crate::defaults::RTT_BINS, help_heading = "Charts")]
    pub rtt_bins: usize,

    /// Histogram x-axis limit for round trip time [ms]
    #[clap(long, default_value_t = crate::defaults::RTT_X_LIMIT, help_heading = "Charts")]
    pub rtt_x_limit: f64,

    /// Box plot y-axis limit for round trip time [ms]
    #[clap(long, default_value_t = crate::defaults::RTT_Y_LIMIT, help_heading = "Charts")]
    pub rtt_y_limit: f64,

    /// Histogram bins for inter-arrivals
    #[clap(long, default_value_t = crate::defaults::INTER_ARRIVAL_BINS, help_heading = "Charts")]
    pub inter_arrival_bins: usize,

    /// Histogram x-axis limit for inter-arrivals [ms]
    #[clap(long, default_value_t = crate::defaults::INTER_ARRIVAL_X_LIMIT, help_heading = "Charts")]
    pub inter_arrival_x_limit: f64,

    /// Box plot y-axis limit for inter-arrivals [ms]
    #[clap(long, default_value_t = crate::defaults::INTER_ARRIVAL_Y_LIMIT, help_heading = "Charts")]
    pub inter_arrival_y_limit: f64,

    /// Output file for the chart dataset (JSON format)
    #[clap(short = 'o', long, default_value = crate::defaults::OUTPUT_FILE)]
    pub output_file: PathBuf,

    /// Verbose output
    #[clap(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

/// Substitute a frame size into a file name pattern
pub fn expand_pattern(pattern: &str, frame_size: u32) -> String {
    pattern.replace("{}", &frame_size.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["frame-metrics"]);
        assert_eq!(args.frame_sizes, vec![120, 240, 480, 960, 1920]);
        assert_eq!(args.stats_dir, PathBuf::from("./Stats"));
        assert_eq!(args.packet_format, PacketLogFormat::ExtendedEndToEndRtt);
        assert_eq!(args.summary_schema, SummarySchema::EndToEndExtended);
        assert_eq!(args.rtt_bins, 30);
        assert_eq!(args.end_to_end_x_limit, 60.0);
        assert!(!args.sort_summary);
        assert!(args.setup.is_empty());
    }

    #[test]
    fn test_positional_setup_and_options() {
        let args = Args::parse_from([
            "frame-metrics",
            "LAN",
            "UDP",
            "--frame-sizes",
            "960,480",
            "--packet-format",
            "legacy",
            "--summary-schema",
            "rtt-only",
            "--sort-summary",
        ]);
        assert_eq!(args.setup, "LAN");
        assert_eq!(args.connection_type, "UDP");
        assert_eq!(args.frame_sizes, vec![960, 480]);
        assert_eq!(args.packet_format, PacketLogFormat::LegacyRttOnly);
        assert_eq!(args.summary_schema, SummarySchema::RttOnly);
        assert!(args.sort_summary);
    }

    #[test]
    fn test_expand_pattern() {
        assert_eq!(
            expand_pattern(crate::defaults::INTER_ARRIVAL_PATTERN, 120),
            "interArrivalLog 120.txt"
        );
        assert_eq!(
            expand_pattern(crate::defaults::METRICS_PATTERN, 1920),
            "StatisticsLog 1920.txt"
        );
    }
}
