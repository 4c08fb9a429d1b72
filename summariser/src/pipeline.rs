use crate::aggregate::{average_by_group, join_averages};
use crate::chart::render_charts;
use crate::discover::discover_report_files;
use crate::frame::build_results_frame;
use crate::metadata::PathTemplate;
use crate::model::{ReportFailure, ResultRow, SummaryOutput};
use crate::profile::Profile;
use crate::spreadsheet::{write_samples_sidecar, write_spreadsheet, SAMPLES_FILE, SPREADSHEET_FILE};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use loadtest_report_model::{parse_report, ReportFormat};
use std::path::{Component, Path, PathBuf};

/// Settings for a single summary run.
#[derive(Debug, Clone)]
pub struct SummariseOptions {
    /// Directory that is searched for reports
    pub root: PathBuf,
    /// Directory the spreadsheet and charts are written to
    pub out_dir: PathBuf,
    pub profile: Profile,
    pub charts: bool,
    /// Skip reports that fail to parse instead of aborting the run
    pub ignore_errors: bool,
    pub progress: bool,
}

impl SummariseOptions {
    pub fn new(root: impl Into<PathBuf>, profile: Profile) -> Self {
        let root = root.into();
        Self {
            out_dir: root.clone(),
            root,
            profile,
            charts: true,
            ignore_errors: false,
            progress: true,
        }
    }
}

/// Discover, parse and aggregate every report under the root, then write the outputs.
pub fn summarise(options: &SummariseOptions) -> anyhow::Result<SummaryOutput> {
    let profile = &options.profile;
    profile.validate()?;
    let template = profile.template()?;

    let root = options
        .root
        .canonicalize()
        .with_context(|| format!("Cannot read report directory {}", options.root.display()))?;
    let files = discover_report_files(&root, &profile.discovery)?;
    log::info!(
        "Found {} reports for profile {} under {}",
        files.len(),
        profile.name,
        root.display()
    );

    let progress = if options.progress {
        progress_bar(files.len() as u64)?
    } else {
        ProgressBar::hidden()
    };

    let mut rows = Vec::with_capacity(files.len());
    let mut failures = Vec::new();
    for path in &files {
        match read_row(&root, path, &template, profile) {
            Ok(row) => rows.push(row),
            Err(e) if options.ignore_errors => {
                log::warn!("Skipping report {}: {e:#}", path.display());
                failures.push(ReportFailure {
                    path: path.clone(),
                    error: format!("{e:#}"),
                });
            }
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if !failures.is_empty() {
        log::warn!("{} out of {} reports failed", failures.len(), files.len());
    }

    let results = build_results_frame(&rows, profile)?;
    let averages = average_by_group(&results, profile)?;
    let joined = join_averages(&results, &averages, profile)?;

    std::fs::create_dir_all(&options.out_dir).with_context(|| {
        format!("Cannot create output directory {}", options.out_dir.display())
    })?;

    let spreadsheet = options.out_dir.join(SPREADSHEET_FILE);
    write_spreadsheet(&joined, &spreadsheet)
        .with_context(|| format!("Failed to write {}", spreadsheet.display()))?;

    let samples = if profile.format == ReportFormat::PointStream {
        let path = options.out_dir.join(SAMPLES_FILE);
        write_samples_sidecar(&joined, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    let charts = if options.charts {
        render_charts(&results, &averages, profile, &options.out_dir)?
    } else {
        log::debug!("Chart rendering disabled");
        Vec::new()
    };

    Ok(SummaryOutput {
        results: joined,
        averages,
        failures,
        spreadsheet,
        samples,
        charts,
    })
}

fn read_row(
    root: &Path,
    path: &Path,
    template: &PathTemplate,
    profile: &Profile,
) -> anyhow::Result<ResultRow> {
    let metadata = template.extract(path, &profile.load)?;
    let report = parse_report(path, profile.format)?;
    log::debug!("Parsed {} as {:?}", path.display(), metadata);

    Ok(ResultRow {
        metadata,
        file: relative_file(root, path),
        report,
    })
}

/// The path of `path` below `root`, `/` separated on every platform.
fn relative_file(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .join("/")
}

fn progress_bar(len: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} reports")
            .context("Failed to set progress style")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_file_uses_forward_slashes() {
        let root = Path::new("/data/runs");
        let path = root.join("io").join("prod").join("report-50rps.json");
        assert_eq!("io/prod/report-50rps.json", relative_file(root, &path));
    }

    #[test]
    fn relative_file_outside_root() {
        assert_eq!(
            "other/report-50rps.json",
            relative_file(Path::new("/data"), Path::new("/other/report-50rps.json"))
        );
    }

    #[test]
    fn missing_root_is_an_error() {
        let options = SummariseOptions::new("/does/not/exist/anywhere", Profile::artillery());
        let err = summarise(&options).unwrap_err();
        assert!(err.to_string().contains("Cannot read report directory"));
    }
}
