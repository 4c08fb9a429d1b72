use crate::metadata::ReportMetadata;
use loadtest_report_model::ParsedReport;
use polars::frame::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One parsed report with its labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRow {
    pub metadata: ReportMetadata,
    /// Path of the report relative to the root, `/` separated
    pub file: String,
    pub report: ParsedReport,
}

/// A report that was skipped because it could not be labelled or parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Everything a summary run produced.
#[derive(Debug, Clone)]
pub struct SummaryOutput {
    /// One row per report with the group averages joined on
    pub results: DataFrame,
    /// One row per group
    pub averages: DataFrame,
    pub failures: Vec<ReportFailure>,
    pub spreadsheet: PathBuf,
    pub samples: Option<PathBuf>,
    pub charts: Vec<PathBuf>,
}
