use crate::frame::{MEAN_RESPONSE_TIME, P99_RESPONSE_TIME};
use crate::profile::Profile;
use anyhow::Context;
use polars::prelude::*;

/// Number of reports that were averaged into a group.
pub const RUNS_COLUMN: &str = "Runs";
const ROW_INDEX: &str = "__row_index";

/// Average the mean and P99 response time of every report sharing a group key.
///
/// This is a mean of the per-report statistics, not a statistic over the pooled samples. Reports
/// without a statistic are left out of that statistic's average.
pub fn average_by_group(results: &DataFrame, profile: &Profile) -> anyhow::Result<DataFrame> {
    let keys = profile.group_columns();

    let averages = results
        .clone()
        .lazy()
        .group_by(keys.iter().map(|k| col(*k)).collect::<Vec<_>>())
        .agg([
            col(MEAN_RESPONSE_TIME)
                .mean()
                .alias(profile.mean_average_column()),
            col(P99_RESPONSE_TIME)
                .mean()
                .alias(profile.p99_average_column()),
            len().alias(RUNS_COLUMN),
        ])
        .sort(keys.clone(), SortMultipleOptions::default())
        .collect()
        .context("Group averages")?;

    log::debug!(
        "Averaged {} reports into {} groups by {:?}",
        results.height(),
        averages.height(),
        keys
    );
    log::trace!("Averages frame: {}", averages);

    Ok(averages)
}

/// Attach each report's group averages to its row.
///
/// Row order and row count of `results` are preserved.
pub fn join_averages(
    results: &DataFrame,
    averages: &DataFrame,
    profile: &Profile,
) -> anyhow::Result<DataFrame> {
    let keys = profile
        .group_columns()
        .into_iter()
        .map(col)
        .collect::<Vec<_>>();

    let mut selection = results
        .get_column_names()
        .into_iter()
        .map(|name| col(name.clone()))
        .collect::<Vec<_>>();
    selection.push(col(profile.mean_average_column()));
    selection.push(col(profile.p99_average_column()));

    let joined = results
        .clone()
        .lazy()
        .with_row_index(ROW_INDEX, None)
        .join(
            averages.clone().lazy(),
            keys.clone(),
            keys,
            JoinArgs::new(JoinType::Left),
        )
        .sort([ROW_INDEX], SortMultipleOptions::default())
        .select(selection)
        .collect()
        .context("Join group averages")?;

    Ok(joined)
}
