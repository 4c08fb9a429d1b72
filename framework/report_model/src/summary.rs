use crate::{Counters, LatencyStats, ParseError, ParsedReport};
use serde_json::Value;
use std::io::Read;

const RESPONSE_TIME_SUMMARY: &str = "http.response_time";
const SUCCESS_COUNTER: &str = "http.codes.200";
const RESPONSES_COUNTER: &str = "http.responses";

/// Parse a pre-aggregated summary report.
///
/// Statistics are read from `aggregate.summaries["http.response_time"]` and counters from
/// `aggregate.counters`. Missing summaries, metrics or keys are reported as absent values.
pub fn parse_summary_report<R: Read>(reader: R) -> Result<ParsedReport, ParseError> {
    let document: Value = serde_json::from_reader(reader).map_err(ParseError::InvalidJson)?;

    let aggregate = document
        .as_object()
        .and_then(|o| o.get("aggregate"))
        .and_then(|a| a.as_object())
        .ok_or(ParseError::MissingAggregate)?;

    let response_times = aggregate
        .get("summaries")
        .and_then(|s| s.get(RESPONSE_TIME_SUMMARY));
    let stat = |name: &str| response_times.and_then(|r| r.get(name)).and_then(Value::as_f64);

    let counters = aggregate.get("counters");
    let counter = |name: &str| counters.and_then(|c| c.get(name)).and_then(Value::as_u64);

    Ok(ParsedReport {
        stats: LatencyStats {
            min: stat("min"),
            max: stat("max"),
            mean: stat("mean"),
            median: stat("median"),
            p90: stat("p90"),
            p99: stat("p99"),
        },
        counters: Counters {
            request_count: None,
            success: counter(SUCCESS_COUNTER),
            failure: None,
            responses: counter(RESPONSES_COUNTER),
        },
        samples: None,
    })
}
