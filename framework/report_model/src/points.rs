use crate::stats::latency_stats;
use crate::{Counters, ParseError, ParsedReport};
use serde::Deserialize;
use serde_json::Value;
use std::io::BufRead;

const POINT_TYPE: &str = "Point";
const DURATION_METRIC: &str = "http_req_duration";
const FAILED_METRIC: &str = "http_req_failed";

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    metric: String,
    #[serde(default)]
    data: Option<EntryData>,
}

#[derive(Debug, Deserialize)]
struct EntryData {
    #[serde(default)]
    value: Option<Value>,
}

impl Entry {
    fn value(&self, line: usize) -> Result<f64, ParseError> {
        self.data
            .as_ref()
            .and_then(|d| d.value.as_ref())
            .and_then(Value::as_f64)
            .ok_or_else(|| ParseError::InvalidPointValue {
                line,
                metric: self.metric.clone(),
            })
    }
}

/// Parse a newline-delimited stream of metric observations.
///
/// Duration points are collected as samples and failure points are counted as a success when
/// their value is zero and as a failure otherwise. Everything else in the stream is skipped.
///
/// A stream without any duration points is valid and gives absent statistics and counters with
/// an empty sample list.
pub fn parse_point_stream<R: BufRead>(reader: R) -> Result<ParsedReport, ParseError> {
    let mut samples = Vec::new();
    let mut success = 0u64;
    let mut failure = 0u64;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let entry: Entry =
            serde_json::from_str(&line).map_err(|source| ParseError::MalformedLine {
                line: line_number,
                source,
            })?;
        if entry.kind != POINT_TYPE {
            continue;
        }

        match entry.metric.as_str() {
            DURATION_METRIC => samples.push(entry.value(line_number)?),
            FAILED_METRIC => {
                if entry.value(line_number)? == 0.0 {
                    success += 1;
                } else {
                    failure += 1;
                }
            }
            _ => {}
        }
    }

    if samples.is_empty() {
        log::trace!("Point stream has no {DURATION_METRIC} samples");
        return Ok(ParsedReport {
            samples: Some(samples),
            ..Default::default()
        });
    }

    Ok(ParsedReport {
        stats: latency_stats(&samples)?,
        counters: Counters {
            request_count: Some(samples.len() as u64),
            success: Some(success),
            failure: Some(failure),
            responses: None,
        },
        samples: Some(samples),
    })
}
