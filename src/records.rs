//! # Packet and Inter-Arrival Log Records
//!
//! Turns raw log lines into typed measurements. Two historical packet-log
//! layouts exist; both separate fields by runs of whitespace and carry the
//! packet index at token 1:
//!
//! - **Legacy RTT-only**: RTT (microseconds) at token 6
//! - **Extended**: end-to-end latency at token 6, RTT at token 12
//!
//! A packet log ends at its first blank or short line (footer text, trailing
//! newlines). Inter-arrival logs hold one integer per line with blank lines
//! ignored.

use crate::error::{AnalysisError, LineError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const INDEX_TOKEN: usize = 1;
const PRIMARY_TOKEN: usize = 6;
const EXTENDED_RTT_TOKEN: usize = 12;

/// Layout of a packet metrics log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum PacketLogFormat {
    /// Index at token 1, RTT at token 6
    #[clap(name = "legacy")]
    LegacyRttOnly,

    /// Index at token 1, end-to-end at token 6, RTT at token 12
    #[clap(name = "extended")]
    ExtendedEndToEndRtt,
}

impl PacketLogFormat {
    /// Fewest tokens a line needs to carry a complete record
    pub fn min_token_count(self) -> usize {
        match self {
            PacketLogFormat::LegacyRttOnly => PRIMARY_TOKEN + 1,
            PacketLogFormat::ExtendedEndToEndRtt => EXTENDED_RTT_TOKEN + 1,
        }
    }

    /// Whether records in this layout carry an end-to-end measurement
    pub fn has_end_to_end(self) -> bool {
        matches!(self, PacketLogFormat::ExtendedEndToEndRtt)
    }
}

impl std::fmt::Display for PacketLogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PacketLogFormat::LegacyRttOnly => write!(f, "legacy RTT-only"),
            PacketLogFormat::ExtendedEndToEndRtt => write!(f, "extended end-to-end/RTT"),
        }
    }
}

/// One measured packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRecord {
    pub index: u64,
    pub end_to_end_micros: Option<i64>,
    pub rtt_micros: i64,
}

/// Outcome of parsing one inter-arrival line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterArrivalLine {
    /// Delay since the previous arrival, in microseconds
    Sample(i64),
    /// Blank line, excluded from the series
    Skip,
}

fn parse_token<T: std::str::FromStr>(tokens: &[&str], position: usize) -> Result<T, LineError> {
    let token = tokens[position];
    token.parse().map_err(|_| LineError::InvalidInteger {
        position,
        token: token.to_string(),
    })
}

/// Parse one packet-log line
///
/// Returns `Ok(None)` for an empty, whitespace-only or short line: the caller
/// must stop scanning at that point. A line long enough to hold a record but
/// with a non-integer in a required position is corruption and yields an error.
pub fn parse_packet_line(
    line: &str,
    format: PacketLogFormat,
) -> Result<Option<PacketRecord>, LineError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < format.min_token_count() {
        return Ok(None);
    }

    let index = parse_token(&tokens, INDEX_TOKEN)?;
    let record = match format {
        PacketLogFormat::LegacyRttOnly => PacketRecord {
            index,
            end_to_end_micros: None,
            rtt_micros: parse_token(&tokens, PRIMARY_TOKEN)?,
        },
        PacketLogFormat::ExtendedEndToEndRtt => PacketRecord {
            index,
            end_to_end_micros: Some(parse_token(&tokens, PRIMARY_TOKEN)?),
            rtt_micros: parse_token(&tokens, EXTENDED_RTT_TOKEN)?,
        },
    };

    Ok(Some(record))
}

/// Parse one inter-arrival line
pub fn parse_inter_arrival_line(line: &str) -> Result<InterArrivalLine, LineError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(InterArrivalLine::Skip);
    }

    trimmed
        .parse()
        .map(InterArrivalLine::Sample)
        .map_err(|_| LineError::InvalidInteger {
            position: 0,
            token: trimmed.to_string(),
        })
}

/// Parse a whole packet log, stopping at the first blank or short line
pub fn parse_packet_log<S: AsRef<str>>(
    lines: &[S],
    format: PacketLogFormat,
    source_name: &str,
) -> Result<Vec<PacketRecord>, AnalysisError> {
    let mut records = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        match parse_packet_line(line.as_ref(), format)
            .map_err(|e| AnalysisError::malformed(source_name, i + 1, e))?
        {
            Some(record) => records.push(record),
            None => {
                tracing::debug!(
                    "End of packet data in {} at line {} ({} records)",
                    source_name,
                    i + 1,
                    records.len()
                );
                break;
            }
        }
    }

    Ok(records)
}

/// Parse a whole inter-arrival log, skipping blank lines
pub fn parse_inter_arrival_log<S: AsRef<str>>(
    lines: &[S],
    source_name: &str,
) -> Result<Vec<i64>, AnalysisError> {
    let mut samples = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        match parse_inter_arrival_line(line.as_ref())
            .map_err(|e| AnalysisError::malformed(source_name, i + 1, e))?
        {
            InterArrivalLine::Sample(value) => samples.push(value),
            InterArrivalLine::Skip => {}
        }
    }

    Ok(samples)
}
