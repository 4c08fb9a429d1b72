use clap::Parser;
use cli::SummariserCli;

pub(crate) mod cli;

/// Environment variable that keeps the run going when individual reports fail
const IGNORE_REPORT_ERRORS_ENV: &str = "IGNORE_REPORT_ERRORS";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let ignore_errors = std::env::var(IGNORE_REPORT_ERRORS_ENV).is_ok();
    let options = SummariserCli::parse().into_options(ignore_errors)?;
    log::debug!("Running with {options:?}");

    let output = loadtest_summariser::summarise(&options)?;

    log::info!(
        "Summarised {} reports into {} groups",
        output.results.height(),
        output.averages.height()
    );
    for chart in &output.charts {
        log::debug!("Chart: {}", chart.display());
    }

    for failure in &output.failures {
        log::debug!("Failed report {}: {}", failure.path.display(), failure.error);
    }

    Ok(())
}
