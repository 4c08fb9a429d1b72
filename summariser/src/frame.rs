use crate::model::ResultRow;
use crate::profile::{Dimension, Profile};
use loadtest_report_model::ReportFormat;
use polars::prelude::*;

pub const FILE_COLUMN: &str = "File";
pub const REQUEST_COUNT_COLUMN: &str = "Request Count";
pub const MIN_RESPONSE_TIME: &str = "Min Response Time";
pub const MAX_RESPONSE_TIME: &str = "Max Response Time";
pub const MEAN_RESPONSE_TIME: &str = "Mean Response Time";
pub const MEDIAN_RESPONSE_TIME: &str = "Median Response Time";
pub const P90_RESPONSE_TIME: &str = "P90 Response Time";
pub const P99_RESPONSE_TIME: &str = "P99 Response Time";
pub const HTTP_CODES_200: &str = "HTTP Codes 200";
pub const HTTP_RESPONSES: &str = "HTTP Responses";
pub const HTTP_CODES_FAIL: &str = "HTTP Codes Fail";
pub const RESPONSE_TIMES_COLUMN: &str = "Response Times";

/// Label dimensions that get their own column, in column order.
const LABEL_DIMENSIONS: [Dimension; 3] = [
    Dimension::Scenario,
    Dimension::Environment,
    Dimension::Architecture,
];

/// The columns of the results frame before the group averages are joined on.
pub fn result_columns(profile: &Profile) -> anyhow::Result<Vec<String>> {
    let template = profile.template()?;

    let mut columns = LABEL_DIMENSIONS
        .iter()
        .filter(|d| template.provides(**d))
        .map(|d| profile.column_name(*d).to_string())
        .collect::<Vec<_>>();
    columns.push(profile.column_name(Dimension::TestRun).to_string());
    columns.push(FILE_COLUMN.to_string());
    columns.push(profile.load.column.clone());

    if profile.format == ReportFormat::PointStream {
        columns.push(REQUEST_COUNT_COLUMN.to_string());
    }
    columns.extend(
        [
            MIN_RESPONSE_TIME,
            MAX_RESPONSE_TIME,
            MEAN_RESPONSE_TIME,
            MEDIAN_RESPONSE_TIME,
            P90_RESPONSE_TIME,
            P99_RESPONSE_TIME,
            HTTP_CODES_200,
        ]
        .map(String::from),
    );
    match profile.format {
        ReportFormat::Summary => columns.push(HTTP_RESPONSES.to_string()),
        ReportFormat::PointStream => {
            columns.push(HTTP_CODES_FAIL.to_string());
            columns.push(RESPONSE_TIMES_COLUMN.to_string());
        }
    }

    Ok(columns)
}

/// Build the results frame in one pass over the collected rows.
pub fn build_results_frame(rows: &[ResultRow], profile: &Profile) -> anyhow::Result<DataFrame> {
    let template = profile.template()?;
    let mut columns: Vec<Column> = Vec::new();

    for dimension in LABEL_DIMENSIONS
        .iter()
        .chain([Dimension::TestRun].iter())
        .filter(|d| template.provides(**d))
    {
        let values = rows
            .iter()
            .map(|r| r.metadata.label(*dimension))
            .collect::<Vec<_>>();
        columns.push(Column::new(profile.column_name(*dimension).into(), values));
    }
    if !template.provides(Dimension::TestRun) {
        columns.push(Column::full_null(
            profile.column_name(Dimension::TestRun).into(),
            rows.len(),
            &DataType::String,
        ));
    }

    let files = rows.iter().map(|r| r.file.clone()).collect::<Vec<_>>();
    columns.push(Column::new(FILE_COLUMN.into(), files));
    let load_levels = rows
        .iter()
        .map(|r| r.metadata.load_level)
        .collect::<Vec<_>>();
    columns.push(Column::new(profile.load.column.as_str().into(), load_levels));

    let counter = |f: fn(&ResultRow) -> Option<u64>| rows.iter().map(f).collect::<Vec<_>>();
    let stat = |f: fn(&ResultRow) -> Option<f64>| rows.iter().map(f).collect::<Vec<_>>();

    if profile.format == ReportFormat::PointStream {
        columns.push(Column::new(
            REQUEST_COUNT_COLUMN.into(),
            counter(|r| r.report.counters.request_count),
        ));
    }
    columns.push(Column::new(MIN_RESPONSE_TIME.into(), stat(|r| r.report.stats.min)));
    columns.push(Column::new(MAX_RESPONSE_TIME.into(), stat(|r| r.report.stats.max)));
    columns.push(Column::new(MEAN_RESPONSE_TIME.into(), stat(|r| r.report.stats.mean)));
    columns.push(Column::new(MEDIAN_RESPONSE_TIME.into(), stat(|r| r.report.stats.median)));
    columns.push(Column::new(P90_RESPONSE_TIME.into(), stat(|r| r.report.stats.p90)));
    columns.push(Column::new(P99_RESPONSE_TIME.into(), stat(|r| r.report.stats.p99)));
    columns.push(Column::new(
        HTTP_CODES_200.into(),
        counter(|r| r.report.counters.success),
    ));

    match profile.format {
        ReportFormat::Summary => {
            columns.push(Column::new(
                HTTP_RESPONSES.into(),
                counter(|r| r.report.counters.responses),
            ));
        }
        ReportFormat::PointStream => {
            columns.push(Column::new(
                HTTP_CODES_FAIL.into(),
                counter(|r| r.report.counters.failure),
            ));
            columns.push(samples_column(rows)?);
        }
    }

    let frame = DataFrame::new(columns)?;
    log::trace!("Built results frame: {}", frame);

    Ok(frame)
}

fn samples_column(rows: &[ResultRow]) -> PolarsResult<Column> {
    let mut builder = ListPrimitiveChunkedBuilder::<Float64Type>::new(
        RESPONSE_TIMES_COLUMN.into(),
        rows.len(),
        rows.iter()
            .map(|r| r.report.samples.as_ref().map_or(0, Vec::len))
            .sum(),
        DataType::Float64,
    );
    for row in rows {
        builder.append_slice(row.report.samples.as_deref().unwrap_or(&[]));
    }

    Ok(builder.finish().into_series().into_column())
}
