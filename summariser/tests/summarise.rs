use anyhow::Context;
use loadtest_summariser::profile::Profile;
use loadtest_summariser::{
    summarise, SummariseOptions, FILE_COLUMN, MEAN_RESPONSE_TIME, RUNS_COLUMN,
};
use polars::prelude::DataFrame;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn test_data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data").join(name)
}

fn options(name: &str, profile: Profile, out_dir: &Path) -> SummariseOptions {
    env_logger::try_init().ok();

    let mut options = SummariseOptions::new(test_data(name), profile);
    options.out_dir = out_dir.to_path_buf();
    options.charts = false;
    options.progress = false;
    options
}

fn strings(frame: &DataFrame, column: &str) -> anyhow::Result<Vec<Option<String>>> {
    Ok(frame
        .column(column)?
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

fn floats(frame: &DataFrame, column: &str) -> anyhow::Result<Vec<Option<f64>>> {
    Ok(frame.column(column)?.f64()?.into_iter().collect())
}

fn output_files(dir: &Path) -> Vec<String> {
    let mut files = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    files.sort();
    files
}

#[test]
fn artillery_reports() -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let profile = Profile::artillery();
    let output = summarise(&options("artillery", profile.clone(), out.path()))?;

    assert_eq!(
        vec![
            Some("encode/encode/lambda/dev/2024-01-01/report-50rps.json".to_string()),
            Some("encode/encode/lambda/prod/2024-01-01/report-100rps.json".to_string()),
            Some("encode/encode/lambda/prod/2024-01-01/report-50rps.json".to_string()),
            Some("encode/encode/lambda/prod/2024-01-02/report-50rps.json".to_string()),
        ],
        strings(&output.results, FILE_COLUMN)?
    );
    assert_eq!(
        vec![Some("encode/encode".to_string()); 4],
        strings(&output.results, "Scenario")?
    );
    assert_eq!(
        vec![None, Some(30.0), Some(20.0), Some(10.0)],
        floats(&output.results, MEAN_RESPONSE_TIME)?
    );
    assert_eq!(
        vec![None, Some(30.0), Some(15.0), Some(15.0)],
        floats(&output.results, &profile.mean_average_column())?
    );
    assert_eq!(
        vec![None, Some(70.0), Some(36.0), Some(36.0)],
        floats(&output.results, &profile.p99_average_column())?
    );

    let names = output
        .results
        .get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        vec![
            "Scenario",
            "Environment",
            "Test Run",
            "File",
            "RPS (Requests Per Second)",
            "Min Response Time",
            "Max Response Time",
            "Mean Response Time",
            "Median Response Time",
            "P90 Response Time",
            "P99 Response Time",
            "HTTP Codes 200",
            "HTTP Responses",
            "Mean Response Time (Average per scenario + environment + RPS)",
            "P99 Response Time (Average per scenario + environment + RPS)",
        ],
        names
    );

    assert_eq!(3, output.averages.height());
    let runs = output
        .averages
        .column(RUNS_COLUMN)?
        .u32()?
        .into_iter()
        .collect::<Vec<_>>();
    assert_eq!(vec![Some(1), Some(2), Some(1)], runs);

    assert!(output.failures.is_empty());
    assert_eq!(None, output.samples);
    assert_eq!(vec!["results.xlsx"], output_files(out.path()));
    Ok(())
}

#[test]
fn excluded_directory_can_be_included() -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let mut profile = Profile::artillery();
    profile.discovery.exclude_dir_marker = None;

    let output = summarise(&options("artillery", profile.clone(), out.path()))?;

    assert_eq!(5, output.results.height());
    assert!(strings(&output.results, FILE_COLUMN)?
        .iter()
        .flatten()
        .any(|f| f.contains("m5.large")));
    // The m5.large run shares its group with the two lambda runs at 50 RPS
    let averages = floats(&output.results, &profile.mean_average_column())?;
    assert!(averages.contains(&Some((20.0 + 10.0 + 999.0) / 3.0)));
    Ok(())
}

#[test]
fn k6_point_streams() -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let profile = Profile::k6();
    let output = summarise(&options("k6", profile.clone(), out.path()))?;

    // The warmup report is never picked up
    assert_eq!(
        vec![
            Some("io/io/lambda/prod/2024-01-01/k6-report-io-10vu.json".to_string()),
            Some("io/io/lambda/prod/2024-01-01/k6-report-io-50vu.json".to_string()),
            Some("io/io/lambda/prod/2024-01-02/k6-report-io-10vu.json".to_string()),
        ],
        strings(&output.results, FILE_COLUMN)?
    );

    let requests = output
        .results
        .column("Request Count")?
        .u64()?
        .into_iter()
        .collect::<Vec<_>>();
    assert_eq!(vec![Some(10), Some(2), None], requests);

    let failures = output
        .results
        .column("HTTP Codes Fail")?
        .u64()?
        .into_iter()
        .collect::<Vec<_>>();
    assert_eq!(vec![Some(1), Some(1), None], failures);

    assert_eq!(
        vec![Some(5.5), Some(30.0), None],
        floats(&output.results, MEAN_RESPONSE_TIME)?
    );
    let p99 = floats(&output.results, "P99 Response Time")?;
    assert!((p99[0].context("p99")? - 9.91).abs() < 1e-9);

    // The stream without samples is left out of the 10 VU average
    assert_eq!(
        vec![Some(5.5), Some(30.0), Some(5.5)],
        floats(&output.results, &profile.mean_average_column())?
    );

    assert_eq!(Some(out.path().join("response_times.json")), output.samples);
    assert_eq!(
        vec!["response_times.json", "results.xlsx"],
        output_files(out.path())
    );

    let sidecar: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(
        out.path().join("response_times.json"),
    )?)?;
    let entries = sidecar.as_array().context("sidecar is an array")?;
    assert_eq!(3, entries.len());
    let samples = entries[1]["Response Times"]
        .as_array()
        .context("samples are an array")?
        .iter()
        .map(serde_json::Value::as_f64)
        .collect::<Vec<_>>();
    assert_eq!(vec![Some(20.0), Some(40.0)], samples);
    Ok(())
}

#[test]
fn k6_architecture_comparison() -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let profile = Profile::k6_architecture();
    let output = summarise(&options("k6_architecture", profile.clone(), out.path()))?;

    assert_eq!(
        vec![
            Some("lambda".to_string()),
            Some("lambda".to_string()),
            Some("monolithic".to_string()),
            Some("monolithic".to_string()),
        ],
        strings(&output.results, "Architecture")?
    );
    assert_eq!(
        vec![Some(30.0), Some(30.0), Some(10.0), Some(5.0)],
        floats(&output.results, &profile.mean_average_column())?
    );
    assert_eq!(
        vec![
            Some("lambda".to_string()),
            Some("monolithic".to_string()),
            Some("monolithic".to_string()),
        ],
        strings(&output.averages, "Architecture")?
    );
    Ok(())
}

#[test]
fn artillery_charts_per_scenario_and_environment() -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let mut options = options("artillery", Profile::artillery(), out.path());
    options.charts = true;

    let output = summarise(&options)?;

    assert_eq!(4, output.charts.len());
    assert!(output.charts.iter().all(|p| p.starts_with(out.path())));
    assert_eq!(
        vec![
            "encode_encode_dev_average_mean_plot.png",
            "encode_encode_dev_p99_plot.png",
            "encode_encode_prod_average_mean_plot.png",
            "encode_encode_prod_p99_plot.png",
            "results.xlsx",
        ],
        output_files(out.path())
    );
    Ok(())
}

#[test]
fn k6_architecture_charts() -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let mut options = options("k6_architecture", Profile::k6_architecture(), out.path());
    options.charts = true;

    let output = summarise(&options)?;

    assert_eq!(7, output.charts.len());
    assert_eq!(
        Some(out.path().join("architecture_comparison_plot.png")),
        output.charts.last().cloned()
    );
    assert_eq!(
        vec![
            "architecture_comparison_plot.png",
            "lambda_all_latency_plot.png",
            "lambda_average_mean_plot.png",
            "lambda_p99_plot.png",
            "monolithic_all_latency_plot.png",
            "monolithic_average_mean_plot.png",
            "monolithic_p99_plot.png",
            "response_times.json",
            "results.xlsx",
        ],
        output_files(out.path())
    );
    for chart in &output.charts {
        assert!(std::fs::metadata(chart)?.len() > 0, "{}", chart.display());
    }
    Ok(())
}

#[test]
fn malformed_report_aborts_by_default() -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let err = summarise(&options("broken", Profile::artillery(), out.path()))
        .err()
        .context("expected the run to fail")?;

    assert!(format!("{err:#}").contains("report-50rps.json"));
    assert!(!out.path().join("results.xlsx").exists());
    Ok(())
}

#[test]
fn malformed_report_skipped_when_ignoring_errors() -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let mut options = options("broken", Profile::artillery(), out.path());
    options.ignore_errors = true;

    let output = summarise(&options)?;

    assert_eq!(1, output.results.height());
    assert_eq!(1, output.failures.len());
    assert!(output.failures[0].path.ends_with("report-50rps.json"));
    assert!(out.path().join("results.xlsx").exists());
    Ok(())
}

#[test]
fn empty_root_writes_empty_spreadsheet() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    let mut options = options("artillery", Profile::artillery(), out.path());
    options.root = root.path().to_path_buf();

    let output = summarise(&options)?;

    assert_eq!(0, output.results.height());
    assert_eq!(15, output.results.width());
    assert!(out.path().join("results.xlsx").exists());
    Ok(())
}
