use crate::frame::RESPONSE_TIMES_COLUMN;
use crate::partition::{partition_by_columns, Partition, PartitionKey};
use crate::profile::{Dimension, Profile};
use anyhow::Context;
use loadtest_report_model::ReportFormat;
use plotters::prelude::{SegmentValue, BLUE, RED};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

mod bar;
mod line;
mod order;
mod scatter;

pub use bar::{BarGroup, ComparisonChart};
pub use line::{LineChart, Marker};
pub use order::{load_label_key, LoadLabelKey};
pub use scatter::ScatterChart;

const CHART_SIZE: (u32, u32) = (1000, 1000);
const FONT: &str = "sans-serif";

/// Render every chart for the profile into `out_dir` and return the written paths.
pub fn render_charts(
    results: &DataFrame,
    averages: &DataFrame,
    profile: &Profile,
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let chart_columns = profile.chart_columns();

    for (key, partition) in partitions(averages, &chart_columns)? {
        log::debug!("Charting partition {}", key.label());
        let stem = key.file_stem();

        let mean = level_values(&partition, profile, &profile.mean_average_column())?;
        let path = out_dir.join(format!("{stem}_average_mean_plot.png"));
        line::draw_line_chart(
            &path,
            &line_chart(&key, profile, mean, "Mean Response Time", Marker::Circle, BLUE),
        )
        .with_context(|| format!("Mean response time chart for {}", key.label()))?;
        written.push(path);

        let p99 = level_values(&partition, profile, &profile.p99_average_column())?;
        let path = out_dir.join(format!("{stem}_p99_plot.png"));
        line::draw_line_chart(
            &path,
            &line_chart(&key, profile, p99, "P99 Response Time", Marker::Cross, RED),
        )
        .with_context(|| format!("P99 response time chart for {}", key.label()))?;
        written.push(path);
    }

    if profile.format == ReportFormat::PointStream {
        for (key, partition) in partitions(results, &chart_columns)? {
            let chart = scatter_chart(&key, &partition, profile)?;
            if chart.is_empty() {
                log::debug!("No samples to plot for {}", key.label());
                continue;
            }

            let path = out_dir.join(format!("{}_all_latency_plot.png", key.file_stem()));
            scatter::draw_scatter_chart(&path, &chart)
                .with_context(|| format!("Latency scatter chart for {}", key.label()))?;
            written.push(path);
        }
    }

    if profile.compares_architectures() {
        let chart = comparison_chart(averages, profile)?;
        if !chart.groups.is_empty() {
            let path = out_dir.join("architecture_comparison_plot.png");
            bar::draw_comparison_chart(&path, &chart).context("Architecture comparison chart")?;
            written.push(path);
        }
    }

    for path in &written {
        log::info!("Wrote chart {}", path.display());
    }

    Ok(written)
}

fn partitions(
    frame: &DataFrame,
    columns: &[&str],
) -> anyhow::Result<Vec<(PartitionKey, DataFrame)>> {
    if frame.height() == 0 {
        return Ok(Vec::new());
    }

    Ok(match partition_by_columns(frame, columns)? {
        Partition::Unpartitioned => vec![(PartitionKey(vec!["all".to_string()]), frame.clone())],
        Partition::Partitioned(partitioned) => partitioned.into_iter().collect(),
    })
}

fn line_chart(
    key: &PartitionKey,
    profile: &Profile,
    values: Vec<(String, Option<f64>)>,
    metric: &str,
    marker: Marker,
    color: plotters::style::RGBColor,
) -> LineChart {
    let (labels, values) = values.into_iter().unzip();
    LineChart {
        title: format!("{metric} vs {} ({})", profile.load.label_unit, key.label()),
        legend: key.label(),
        x_desc: profile.column_name(Dimension::LoadLevel).to_string(),
        y_desc: format!("{metric} in ms {}", profile.average_suffix),
        labels,
        values,
        marker,
        color,
    }
}

/// One value of `column` per load label in the partition, in load label order.
///
/// Rows sharing a label are averaged, which only happens when the group keys are finer than the
/// chart partition.
fn level_values(
    partition: &DataFrame,
    profile: &Profile,
    column: &str,
) -> anyhow::Result<Vec<(String, Option<f64>)>> {
    let levels = partition.column(&profile.load.column)?.u32()?;
    let values = partition.column(column)?.f64()?;

    let mut by_label: BTreeMap<LoadLabelKey, (String, Vec<f64>)> = BTreeMap::new();
    for (level, value) in levels.into_iter().zip(values.into_iter()) {
        let Some(level) = level else {
            continue;
        };
        let label = profile.load.label(level);
        let entry = by_label
            .entry(load_label_key(&label, profile.load.max_label.as_deref()))
            .or_insert_with(|| (label, Vec::new()));
        entry.1.extend(value);
    }

    Ok(by_label
        .into_values()
        .map(|(label, values)| {
            let mean =
                (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);
            (label, mean)
        })
        .collect())
}

fn scatter_chart(
    key: &PartitionKey,
    partition: &DataFrame,
    profile: &Profile,
) -> anyhow::Result<ScatterChart> {
    let levels = partition.column(&profile.load.column)?.u32()?;
    let samples = partition.column(RESPONSE_TIMES_COLUMN)?.list()?;

    let mut by_label: BTreeMap<LoadLabelKey, (String, Vec<f64>)> = BTreeMap::new();
    for (level, row_samples) in levels.into_iter().zip(samples.into_iter()) {
        let Some(level) = level else {
            continue;
        };
        let label = profile.load.label(level);
        let entry = by_label
            .entry(load_label_key(&label, profile.load.max_label.as_deref()))
            .or_insert_with(|| (label, Vec::new()));
        if let Some(row_samples) = row_samples {
            entry.1.extend(row_samples.f64()?.into_iter().flatten());
        }
    }

    let (labels, samples) = by_label.into_values().unzip();
    Ok(ScatterChart {
        title: key.label(),
        x_desc: profile.column_name(Dimension::LoadLevel).to_string(),
        labels,
        samples,
    })
}

fn comparison_chart(averages: &DataFrame, profile: &Profile) -> anyhow::Result<ComparisonChart> {
    let architecture_column = profile.column_name(Dimension::Architecture);
    let architectures = averages.column(architecture_column)?.str()?;
    let levels = averages.column(&profile.load.column)?.u32()?;
    let means = averages.column(&profile.mean_average_column())?.f64()?;

    let mut names = architectures
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect::<Vec<_>>();
    names.sort();
    names.dedup();

    let mut groups: BTreeMap<LoadLabelKey, BarGroup> = BTreeMap::new();
    for ((architecture, level), mean) in architectures
        .into_iter()
        .zip(levels.into_iter())
        .zip(means.into_iter())
    {
        let (Some(architecture), Some(level)) = (architecture, level) else {
            continue;
        };
        let Some(position) = names.iter().position(|n| n == architecture) else {
            continue;
        };

        let label = profile.load.label(level);
        let group = groups
            .entry(load_label_key(&label, profile.load.max_label.as_deref()))
            .or_insert_with(|| BarGroup {
                load_label: label,
                values: vec![None; names.len()],
            });
        group.values[position] = mean;
    }

    Ok(ComparisonChart {
        title: format!("Mean Response Time by Architecture {}", profile.average_suffix),
        x_desc: "Mean Response Time in ms".to_string(),
        architectures: names,
        groups: groups.into_values().collect(),
    })
}

fn segment_label(value: &SegmentValue<usize>, labels: &[String]) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

/// Upper bound of the value axis with headroom for the annotations.
fn y_upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0f64, f64::max);
    if max > 0.0 {
        max * 1.15
    } else {
        1.0
    }
}
