use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod points;
mod stats;
mod summary;

pub use points::parse_point_stream;
pub use stats::latency_stats;
pub use summary::parse_summary_report;

/// The shape of a load-test report file.
///
/// The format is tied to the tool that produced the report, so it is chosen by the profile that
/// discovered the file rather than sniffed from the content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// A single pre-aggregated JSON object, as written by `artillery run --output`.
    Summary,
    /// Newline-delimited JSON metric observations, as written by `k6 run --out json=...`.
    PointStream,
}

/// Latency statistics for a single report, in milliseconds.
///
/// Any statistic can be absent. For summary reports that means the tool did not write it, for
/// point streams it means there were no duration samples to compute it from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LatencyStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub p90: Option<f64>,
    pub p99: Option<f64>,
}

impl LatencyStats {
    /// True when no statistic is present.
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
            && self.max.is_none()
            && self.mean.is_none()
            && self.median.is_none()
            && self.p90.is_none()
            && self.p99.is_none()
    }
}

/// Request outcome counters for a single report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counters {
    /// Number of duration samples seen in a point stream
    pub request_count: Option<u64>,
    /// Requests that completed successfully (`http.codes.200` or `http_req_failed == 0`)
    pub success: Option<u64>,
    /// Requests that failed (`http_req_failed != 0`)
    pub failure: Option<u64>,
    /// Total responses reported by a summary (`http.responses`)
    pub responses: Option<u64>,
}

/// The result of parsing one report file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedReport {
    pub stats: LatencyStats,
    pub counters: Counters,
    /// The raw per-request latencies, only present when the report was a point stream.
    pub samples: Option<Vec<f64>>,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON document: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Report has no `aggregate` object")]
    MissingAggregate,
    #[error("Malformed JSON on line {line}: {source}")]
    MalformedLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Point on line {line} for metric `{metric}` has no numeric value")]
    InvalidPointValue { line: usize, metric: String },
    #[error("Failed to compute latency statistics: {0}")]
    Stats(#[from] polars::error::PolarsError),
}

/// A [ParseError] for a specific report file.
#[derive(Error, Debug)]
#[error("Failed to parse report {}: {source}", .path.display())]
pub struct ReportError {
    pub path: PathBuf,
    #[source]
    pub source: ParseError,
}

/// Open and parse the report at `path` using the given format.
pub fn parse_report(path: &Path, format: ReportFormat) -> Result<ParsedReport, ReportError> {
    log::debug!("Parsing {:?} report {}", format, path.display());

    let result = File::open(path)
        .map_err(ParseError::from)
        .and_then(|file| {
            let reader = BufReader::new(file);
            match format {
                ReportFormat::Summary => parse_summary_report(reader),
                ReportFormat::PointStream => parse_point_stream(reader),
            }
        });

    result.map_err(|source| ReportError {
        path: path.to_path_buf(),
        source,
    })
}
