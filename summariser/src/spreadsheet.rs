use crate::frame::{FILE_COLUMN, RESPONSE_TIMES_COLUMN};
use polars::io::json::JsonWriter;
use polars::io::SerWriter;
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs::File;
use std::path::Path;

pub const SPREADSHEET_FILE: &str = "results.xlsx";
pub const SAMPLES_FILE: &str = "response_times.json";

/// Write every row of the frame to a single worksheet.
///
/// The header is bold, null cells stay blank and list columns are left out.
pub fn write_spreadsheet(frame: &DataFrame, path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    let columns = frame
        .get_columns()
        .iter()
        .filter(|c| !matches!(c.dtype(), DataType::List(_)))
        .collect::<Vec<_>>();

    for (col_idx, column) in columns.iter().enumerate() {
        let col_idx = u16::try_from(col_idx)?;
        sheet.write_string_with_format(0, col_idx, column.name().as_str(), &header)?;

        for row_idx in 0..frame.height() {
            let xlsx_row = u32::try_from(row_idx + 1)?;
            write_cell(sheet, xlsx_row, col_idx, column.get(row_idx)?)?;
        }
    }

    workbook.save(path)?;
    log::info!("Wrote {} rows to {}", frame.height(), path.display());

    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: AnyValue) -> anyhow::Result<()> {
    match value {
        AnyValue::Null => {}
        AnyValue::String(s) => {
            sheet.write_string(row, col, s)?;
        }
        AnyValue::StringOwned(s) => {
            sheet.write_string(row, col, s.as_str())?;
        }
        AnyValue::Float64(v) => {
            sheet.write_number(row, col, v)?;
        }
        AnyValue::Float32(v) => {
            sheet.write_number(row, col, v)?;
        }
        AnyValue::UInt32(v) => {
            sheet.write_number(row, col, v)?;
        }
        AnyValue::UInt64(v) => {
            // Counts stay well inside the exactly representable range
            sheet.write_number(row, col, v as f64)?;
        }
        AnyValue::Int32(v) => {
            sheet.write_number(row, col, v)?;
        }
        AnyValue::Int64(v) => {
            sheet.write_number(row, col, v as f64)?;
        }
        other => {
            sheet.write_string(row, col, other.to_string())?;
        }
    }

    Ok(())
}

/// Write the raw response times of each report, keyed by file, as a JSON array.
pub fn write_samples_sidecar(frame: &DataFrame, path: &Path) -> anyhow::Result<()> {
    let mut samples = frame.select([FILE_COLUMN, RESPONSE_TIMES_COLUMN])?;

    let mut file = File::create(path)?;
    JsonWriter::new(&mut file)
        .with_json_format(JsonFormat::Json)
        .finish(&mut samples)?;
    log::info!("Wrote response times to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::build_results_frame;
    use crate::frame::tests::row;
    use crate::profile::Profile;
    use loadtest_report_model::ParsedReport;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_workbook() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(SPREADSHEET_FILE);
        let frame = build_results_frame(
            &[row("s/a", "prod", 50, Some(20.0)), row("s/a", "prod", 100, None)],
            &Profile::artillery(),
        )?;

        write_spreadsheet(&frame, &path)?;

        assert!(path.metadata()?.len() > 0);
        Ok(())
    }

    #[test]
    fn writes_samples_keyed_by_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(SAMPLES_FILE);

        let mut with_samples = row("s/a", "prod", 50, Some(2.0));
        with_samples.report = ParsedReport {
            samples: Some(vec![1.0, 3.0]),
            ..with_samples.report
        };
        let frame = build_results_frame(&[with_samples], &Profile::k6())?;

        write_samples_sidecar(&frame, &path)?;

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(
            Some("s/a/prod/report-50rps.json"),
            written[0]["File"].as_str()
        );
        let samples = written[0]["Response Times"]
            .as_array()
            .map(|values| values.iter().filter_map(|v| v.as_f64()).collect::<Vec<_>>());
        assert_eq!(Some(vec![1.0, 3.0]), samples);
        Ok(())
    }
}
