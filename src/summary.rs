//! # Configuration Summary Log
//!
//! `SummarizedStats.txt` holds one pipe-delimited row per frame-size
//! configuration. Two layouts exist:
//!
//! ```text
//! Frame size: 120 | Average RTT: 45 | Average Inter-Arrival: 10 | Jitter: 2
//! Frame size: 1.25 | Average End to End:  18.250 | Average RTT:   3.125 | Average Inter-Arrival:   1.250 | Jitter:   0.210 | Unordered Packets: 0.00% | Lost Packets: 0.10%
//! ```
//!
//! Lines that do not match the selected layout (headers, blank lines, rows of
//! the other layout) are skipped. A line that matches the layout but carries a
//! value that is not a number is corrupt and fails the whole table.
//!
//! The writer side ([`ConfigurationSummary::from_measurements`],
//! [`format_summary_line`], [`upsert_summary_line`]) produces rows in the
//! same fixed layout from raw packet and inter-arrival logs.

use crate::error::{AnalysisError, LineError};
use crate::records::PacketRecord;
use crate::units::micros_to_millis;
use crate::utils::calculate_stats;
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

const RTT_ONLY_PATTERN: &str = r"^\s*Frame size:\s*([\d.]+)\s*\|\s*Average RTT:\s*([\d.]+)\s*\|\s*Average Inter-Arrival:\s*([\d.]+)\s*\|\s*Jitter:\s*([\d.]+)";

const EXTENDED_PATTERN: &str = r"^\s*Frame size:\s*([\d.]+)\s*\|\s*Average End to End:\s*([\d.]+)\s*\|\s*Average RTT:\s*([\d.]+)\s*\|\s*Average Inter-Arrival:\s*([\d.]+)\s*\|\s*Jitter:\s*([\d.]+)\s*\|\s*Unordered Packets:\s*([\d.]+)%\s*\|\s*Lost Packets:\s*([\d.]+)%";

/// Layout of the summary log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SummarySchema {
    /// Frame size, RTT, inter-arrival, jitter
    #[clap(name = "rtt-only")]
    RttOnly,

    /// Adds end-to-end latency and unordered/lost packet percentages
    #[clap(name = "extended")]
    EndToEndExtended,
}

impl SummarySchema {
    fn pattern(self) -> &'static str {
        match self {
            SummarySchema::RttOnly => RTT_ONLY_PATTERN,
            SummarySchema::EndToEndExtended => EXTENDED_PATTERN,
        }
    }

    /// Column headers for the summary table, in row order
    pub fn column_labels(self) -> Vec<&'static str> {
        match self {
            SummarySchema::RttOnly => vec![
                "Frame Size [milliseconds]",
                "RTT [milliseconds]",
                "Inter-Arrival [milliseconds]",
                "Jitter [milliseconds]",
            ],
            SummarySchema::EndToEndExtended => vec![
                "Frame Size [milliseconds]",
                "End to End [milliseconds]",
                "RTT [milliseconds]",
                "Jitter [milliseconds]",
                "Inter-Arrival [milliseconds]",
                "Unordered Packets [%]",
                "Lost Packets [%]",
            ],
        }
    }
}

/// One row of the summary log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSummary {
    pub frame_size_ms: f64,
    pub avg_end_to_end_ms: Option<f64>,
    pub avg_rtt_ms: f64,
    pub avg_inter_arrival_ms: f64,
    pub jitter_ms: f64,
    pub unordered_pct: Option<f64>,
    pub lost_pct: Option<f64>,
}

impl ConfigurationSummary {
    /// Compute a summary row from one configuration's raw logs
    ///
    /// Jitter is the population standard deviation of the inter-arrival
    /// series. Unordered packets are index discontinuities relative to the
    /// packets received; lost packets are missing indices relative to the
    /// highest index seen plus one. Returns `None` when no packet or no
    /// inter-arrival time was logged, since the averages would be undefined.
    pub fn from_measurements(
        frame_size_ms: f64,
        records: &[PacketRecord],
        inter_arrivals_us: &[i64],
    ) -> Option<Self> {
        if records.is_empty() || inter_arrivals_us.is_empty() {
            return None;
        }

        let rtts: Vec<i64> = records.iter().map(|r| r.rtt_micros).collect();
        let end_to_ends: Vec<i64> = records.iter().filter_map(|r| r.end_to_end_micros).collect();
        let indexes: Vec<u64> = records.iter().map(|r| r.index).collect();

        let (avg_rtt_ms, _, _, _) = calculate_stats(&micros_to_millis(&rtts));
        let avg_end_to_end_ms = if end_to_ends.is_empty() {
            None
        } else {
            Some(calculate_stats(&micros_to_millis(&end_to_ends)).0)
        };
        let (avg_inter_arrival_ms, _, _, jitter_ms) =
            calculate_stats(&micros_to_millis(inter_arrivals_us));

        let received = records.len() as f64;
        let unordered_pct = 100.0 * count_unordered(&indexes) as f64 / received;
        let expected = indexes.iter().max().map_or(0, |&m| m + 1);
        let lost = expected.saturating_sub(records.len() as u64);
        let lost_pct = 100.0 * lost as f64 / expected as f64;

        Some(Self {
            frame_size_ms,
            avg_end_to_end_ms,
            avg_rtt_ms,
            avg_inter_arrival_ms,
            jitter_ms,
            unordered_pct: Some(unordered_pct),
            lost_pct: Some(lost_pct),
        })
    }

    /// Values in the column order of [`SummarySchema::column_labels`]
    ///
    /// Optional fields the row lacks are reported as 0.
    pub fn table_row(&self, schema: SummarySchema) -> Vec<f64> {
        match schema {
            SummarySchema::RttOnly => vec![
                self.frame_size_ms,
                self.avg_rtt_ms,
                self.avg_inter_arrival_ms,
                self.jitter_ms,
            ],
            SummarySchema::EndToEndExtended => vec![
                self.frame_size_ms,
                self.avg_end_to_end_ms.unwrap_or(0.0),
                self.avg_rtt_ms,
                self.jitter_ms,
                self.avg_inter_arrival_ms,
                self.unordered_pct.unwrap_or(0.0),
                self.lost_pct.unwrap_or(0.0),
            ],
        }
    }
}

/// Number of positions where an index does not follow its predecessor by one
pub fn count_unordered(indexes: &[u64]) -> usize {
    indexes
        .windows(2)
        .filter(|pair| pair[1] != pair[0].wrapping_add(1))
        .count()
}

/// Compiled matcher for one summary layout
pub struct SummaryParser {
    schema: SummarySchema,
    pattern: Regex,
}

impl SummaryParser {
    pub fn new(schema: SummarySchema) -> Result<Self, AnalysisError> {
        Ok(Self {
            schema,
            pattern: Regex::new(schema.pattern())?,
        })
    }

    pub fn schema(&self) -> SummarySchema {
        self.schema
    }

    /// Parse one line; `Ok(None)` when the line does not match the layout
    pub fn parse(&self, line: &str) -> Result<Option<ConfigurationSummary>, LineError> {
        let Some(caps) = self.pattern.captures(line) else {
            return Ok(None);
        };

        let number = |group: usize, field: &'static str| -> Result<f64, LineError> {
            let token = caps.get(group).map_or("", |m| m.as_str());
            token.parse::<f64>().map_err(|_| LineError::InvalidNumber {
                field,
                token: token.to_string(),
            })
        };

        let summary = match self.schema {
            SummarySchema::RttOnly => ConfigurationSummary {
                frame_size_ms: number(1, "Frame size")?,
                avg_end_to_end_ms: None,
                avg_rtt_ms: number(2, "Average RTT")?,
                avg_inter_arrival_ms: number(3, "Average Inter-Arrival")?,
                jitter_ms: number(4, "Jitter")?,
                unordered_pct: None,
                lost_pct: None,
            },
            SummarySchema::EndToEndExtended => ConfigurationSummary {
                frame_size_ms: number(1, "Frame size")?,
                avg_end_to_end_ms: Some(number(2, "Average End to End")?),
                avg_rtt_ms: number(3, "Average RTT")?,
                avg_inter_arrival_ms: number(4, "Average Inter-Arrival")?,
                jitter_ms: number(5, "Jitter")?,
                unordered_pct: Some(number(6, "Unordered Packets")?),
                lost_pct: Some(number(7, "Lost Packets")?),
            },
        };

        Ok(Some(summary))
    }
}

/// Parse a single summary line against `schema`
///
/// Compiles the layout pattern on every call; use [`SummaryParser`] or
/// [`build_summary_table`] for more than a handful of lines.
pub fn parse_summary_line(
    line: &str,
    schema: SummarySchema,
) -> Result<Option<ConfigurationSummary>, AnalysisError> {
    let parser = SummaryParser::new(schema)?;
    parser
        .parse(line)
        .map_err(|e| AnalysisError::malformed("summary line", 1, e))
}

/// Parse every line of a summary log, keeping matching rows in file order
///
/// Rows are neither sorted nor deduplicated.
pub fn build_summary_table<S: AsRef<str>>(
    lines: &[S],
    schema: SummarySchema,
    source_name: &str,
) -> Result<Vec<ConfigurationSummary>, AnalysisError> {
    let parser = SummaryParser::new(schema)?;
    let mut rows = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        match parser
            .parse(line.as_ref())
            .map_err(|e| AnalysisError::malformed(source_name, i + 1, e))?
        {
            Some(row) => rows.push(row),
            None => tracing::trace!("Skipping summary line {} of {}", i + 1, source_name),
        }
    }

    tracing::debug!("Parsed {} summary rows from {}", rows.len(), source_name);
    Ok(rows)
}

/// Whether rows are strictly ascending by frame size
pub fn is_ascending_by_frame_size(rows: &[ConfigurationSummary]) -> bool {
    rows.windows(2)
        .all(|pair| pair[0].frame_size_ms < pair[1].frame_size_ms)
}

/// Stable sort by frame size
pub fn sort_by_frame_size(rows: &mut [ConfigurationSummary]) {
    rows.sort_by(|a, b| a.frame_size_ms.total_cmp(&b.frame_size_ms));
}

fn frame_size_field(frame_size_ms: f64) -> String {
    if frame_size_ms.fract() == 0.0 {
        format!("Frame size: {:4}", frame_size_ms as i64)
    } else {
        format!("Frame size:{:5.2}", frame_size_ms)
    }
}

/// Render a row in the fixed summary layout
pub fn format_summary_line(summary: &ConfigurationSummary, schema: SummarySchema) -> String {
    let frame = frame_size_field(summary.frame_size_ms);
    match schema {
        SummarySchema::RttOnly => format!(
            "{} | Average RTT:{:8.3} | Average Inter-Arrival:{:8.3} | Jitter:{:8.3}",
            frame, summary.avg_rtt_ms, summary.avg_inter_arrival_ms, summary.jitter_ms
        ),
        SummarySchema::EndToEndExtended => format!(
            "{} | Average End to End:{:8.3} | Average RTT:{:8.3} | Average Inter-Arrival:{:8.3} | Jitter:{:8.3} | Unordered Packets:{:5.2}% | Lost Packets:{:5.2}%",
            frame,
            summary.avg_end_to_end_ms.unwrap_or(0.0),
            summary.avg_rtt_ms,
            summary.avg_inter_arrival_ms,
            summary.jitter_ms,
            summary.unordered_pct.unwrap_or(0.0),
            summary.lost_pct.unwrap_or(0.0)
        ),
    }
}

/// Replace the row for `summary.frame_size_ms` or append it
///
/// Rows are matched by their rendered frame-size field and returned ordered
/// by frame size. Lines that are not rows of `schema` are kept, ahead of the
/// rows, in their original order. No I/O happens here.
pub fn upsert_summary_line<S: AsRef<str>>(
    lines: &[S],
    summary: &ConfigurationSummary,
    schema: SummarySchema,
) -> Result<Vec<String>, AnalysisError> {
    let parser = SummaryParser::new(schema)?;
    let target = frame_size_field(summary.frame_size_ms);
    let mut others = Vec::new();
    let mut rows: Vec<(f64, String)> = Vec::new();
    let mut replaced = false;

    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        match parser
            .parse(line)
            .map_err(|e| AnalysisError::malformed("summary log", i + 1, e))?
        {
            Some(row) if frame_size_field(row.frame_size_ms) == target => {
                rows.push((summary.frame_size_ms, format_summary_line(summary, schema)));
                replaced = true;
            }
            Some(row) => rows.push((row.frame_size_ms, line.to_string())),
            None if line.trim().is_empty() => {}
            None => others.push(line.to_string()),
        }
    }

    if !replaced {
        rows.push((summary.frame_size_ms, format_summary_line(summary, schema)));
    }

    rows.sort_by(|a, b| a.0.total_cmp(&b.0));
    others.extend(rows.into_iter().map(|(_, line)| line));
    Ok(others)
}
