use anyhow::Context;
use clap::Parser;
use loadtest_summariser::profile::Profile;
use loadtest_summariser::SummariseOptions;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(about, long_about = None)]
pub struct SummariserCli {
    /// The built-in profile to use, one of `artillery`, `k6` or `k6-architecture`
    #[clap(long, default_value = "artillery")]
    pub profile: String,

    /// Load the profile from a TOML file instead of using a built-in one
    #[clap(long, conflicts_with = "profile")]
    pub profile_file: Option<PathBuf>,

    /// Directory to search for reports, defaults to the current directory
    #[clap(long)]
    pub root: Option<PathBuf>,

    /// Directory to write the spreadsheet and charts to, defaults to the report directory
    #[clap(long)]
    pub out_dir: Option<PathBuf>,

    /// Skip directories whose name contains this marker, replacing the profile's marker
    #[clap(long)]
    pub exclude_dir: Option<String>,

    /// Do not skip any directories
    #[clap(long, default_value = "false", conflicts_with = "exclude_dir")]
    pub no_exclude_dir: bool,

    /// Only write the spreadsheet
    #[clap(long, default_value = "false")]
    pub no_charts: bool,

    /// Log reports that cannot be parsed and continue without them.
    ///
    /// Can also be enabled by setting `IGNORE_REPORT_ERRORS`.
    #[clap(long, default_value = "false")]
    pub ignore_errors: bool,

    /// Do not show a progress bar while parsing reports
    #[clap(long, default_value = "false")]
    pub no_progress: bool,
}

impl SummariserCli {
    pub fn load_profile(&self) -> anyhow::Result<Profile> {
        let mut profile = match &self.profile_file {
            Some(path) => Profile::from_toml_file(path)
                .with_context(|| format!("Failed to load profile from {}", path.display()))?,
            None => Profile::builtin(&self.profile)?,
        };

        if self.no_exclude_dir {
            profile.discovery.exclude_dir_marker = None;
        } else if let Some(marker) = &self.exclude_dir {
            profile.discovery.exclude_dir_marker = Some(marker.clone());
        }

        Ok(profile)
    }

    pub fn into_options(self, ignore_errors_env: bool) -> anyhow::Result<SummariseOptions> {
        let profile = self.load_profile()?;
        let root = match self.root {
            Some(root) => root,
            None => std::env::current_dir().context("Cannot read the current directory")?,
        };

        let mut options = SummariseOptions::new(root, profile);
        if let Some(out_dir) = self.out_dir {
            options.out_dir = out_dir;
        }
        options.charts = !self.no_charts;
        options.ignore_errors = self.ignore_errors || ignore_errors_env;
        options.progress = !self.no_progress;

        Ok(options)
    }
}
