//! Turn a directory of load test reports into a results spreadsheet and latency charts.
//!
//! Reports are found by [discover::discover_report_files], labelled from their path by a
//! [metadata::PathTemplate] and parsed by [loadtest_report_model]. A [profile::Profile] ties
//! these together for one load testing tool and directory layout.

mod aggregate;
pub mod chart;
pub mod discover;
mod frame;
pub mod metadata;
pub mod model;
mod partition;
mod pipeline;
pub mod profile;
pub mod spreadsheet;

pub use aggregate::{average_by_group, join_averages, RUNS_COLUMN};
pub use frame::*;
pub use partition::sanitize_file_stem;
pub use pipeline::{summarise, SummariseOptions};
