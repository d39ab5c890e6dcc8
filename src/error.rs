//! # Error Taxonomy
//!
//! Typed errors for the parsing and aggregation core. Two conditions that look
//! like errors are deliberately absent from this module:
//!
//! - **End of valid data**: a blank or short line in a packet log. The record
//!   parser returns `Ok(None)` and the scan stops.
//! - **Skipped line**: a blank inter-arrival line or a summary line that does not
//!   match the schema. These are dropped silently.
//!
//! Everything here is a hard failure that must reach the caller.

use std::io;
use thiserror::Error;

/// Why a single non-blank line could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// A required whitespace-separated token is not an integer
    #[error("token {position} ({token:?}) is not an integer")]
    InvalidInteger { position: usize, token: String },

    /// A named field matched the layout but its value is not a number
    #[error("field '{field}' has non-numeric value {token:?}")]
    InvalidNumber { field: &'static str, token: String },

    /// The line's bytes are not valid UTF-8
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// Failures surfaced by the analysis pipeline
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A non-blank line failed its expected shape
    #[error("malformed line {line_number} in {source_name}: {error}")]
    MalformedLine {
        source_name: String,
        line_number: usize,
        #[source]
        error: LineError,
    },

    /// A required input could not be opened or read; content that is
    /// readable but not text is `MalformedLine` instead
    #[error("cannot read {source_name}: {error}")]
    MissingSource {
        source_name: String,
        #[source]
        error: io::Error,
    },

    /// A caller-supplied parameter is out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A summary layout pattern failed to compile
    #[error("invalid summary pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// `load_configurations` was called without any configuration
    #[error("no configurations supplied")]
    EmptyConfigurationSet,
}

impl AnalysisError {
    /// Attach the source name and 1-based line number to a line-level failure
    pub fn malformed(source_name: &str, line_number: usize, error: LineError) -> Self {
        Self::MalformedLine {
            source_name: source_name.to_string(),
            line_number,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_message() {
        let err = AnalysisError::malformed(
            "StatisticsLog 120.txt",
            7,
            LineError::InvalidInteger {
                position: 6,
                token: "abc".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "malformed line 7 in StatisticsLog 120.txt: token 6 (\"abc\") is not an integer"
        );
    }

    #[test]
    fn test_missing_source_keeps_io_cause() {
        let err = AnalysisError::MissingSource {
            source_name: "interArrivalLog 240.txt".to_string(),
            error: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert!(err.to_string().starts_with("cannot read interArrivalLog 240.txt"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
