use crate::discover::DiscoveryFilter;
use crate::metadata::{LoadSegment, PathTemplate, TemplateError};
use loadtest_report_model::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const SCENARIO_COLUMN: &str = "Scenario";
pub const ENVIRONMENT_COLUMN: &str = "Environment";
pub const ARCHITECTURE_COLUMN: &str = "Architecture";
pub const TEST_RUN_COLUMN: &str = "Test Run";

/// A labelling dimension of a report, derived from its path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Scenario,
    Environment,
    Architecture,
    TestRun,
    LoadLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadLevelFormat {
    /// Unit suffix in the file name, e.g. `rps` in `report-50rps.json`
    pub unit: String,
    /// Unit used in labels, e.g. `RPS` in `50 RPS`
    pub label_unit: String,
    /// Header of the load level column
    pub column: String,
    /// Which dash-separated segment of the file name carries the load level
    pub segment: LoadSegment,
    /// A label that is always ordered after every other label
    #[serde(default)]
    pub max_label: Option<String>,
}

impl LoadLevelFormat {
    pub fn label(&self, level: u32) -> String {
        format!("{} {}", level, self.label_unit)
    }
}

/// Everything that differs between one kind of load-test run and another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub name: String,
    pub format: ReportFormat,
    pub discovery: DiscoveryFilter,
    pub path_template: String,
    pub load: LoadLevelFormat,
    pub group_by: Vec<Dimension>,
    pub chart_by: Vec<Dimension>,
    /// Appended to the averaged column names, e.g. `(Average per scenario + environment + RPS)`
    pub average_suffix: String,
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Unknown profile `{0}`, expected one of: artillery, k6, k6-architecture")]
    Unknown(String),
    #[error("Failed to read profile file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse profile file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid path template: {0}")]
    Template(#[from] TemplateError),
    #[error("Profile `{profile}` is invalid: {reason}")]
    Invalid { profile: String, reason: String },
}

const DEFAULT_EXCLUDED_DIR: &str = "m5.large";
const SCENARIO_TEMPLATE: &str = "{scenario}/{scenario}/*/{environment}/{date}/{file}";
const ARCHITECTURE_TEMPLATE: &str = "{architecture}/*/{date}/{file}";

impl Profile {
    /// Artillery summary reports, `report-<n>rps.json`, grouped by scenario and environment.
    pub fn artillery() -> Self {
        Self {
            name: "artillery".to_string(),
            format: ReportFormat::Summary,
            discovery: DiscoveryFilter {
                prefix: "report".to_string(),
                suffix: ".json".to_string(),
                exclude_file_substring: None,
                exclude_dir_marker: Some(DEFAULT_EXCLUDED_DIR.to_string()),
            },
            path_template: SCENARIO_TEMPLATE.to_string(),
            load: LoadLevelFormat {
                unit: "rps".to_string(),
                label_unit: "RPS".to_string(),
                column: "RPS (Requests Per Second)".to_string(),
                segment: LoadSegment::Index(1),
                max_label: None,
            },
            group_by: vec![
                Dimension::Scenario,
                Dimension::Environment,
                Dimension::LoadLevel,
            ],
            chart_by: vec![Dimension::Scenario, Dimension::Environment],
            average_suffix: "(Average per scenario + environment + RPS)".to_string(),
        }
    }

    /// k6 point streams, `k6-report-...-<n>vu.json`, grouped by scenario and environment.
    pub fn k6() -> Self {
        Self {
            name: "k6".to_string(),
            format: ReportFormat::PointStream,
            discovery: DiscoveryFilter {
                prefix: "k6-report".to_string(),
                suffix: ".json".to_string(),
                exclude_file_substring: Some("warmup".to_string()),
                exclude_dir_marker: Some(DEFAULT_EXCLUDED_DIR.to_string()),
            },
            path_template: SCENARIO_TEMPLATE.to_string(),
            load: LoadLevelFormat {
                unit: "vu".to_string(),
                label_unit: "VU".to_string(),
                column: "VU (Virtual Users)".to_string(),
                segment: LoadSegment::Last,
                max_label: None,
            },
            group_by: vec![
                Dimension::Scenario,
                Dimension::Environment,
                Dimension::LoadLevel,
            ],
            chart_by: vec![Dimension::Scenario, Dimension::Environment],
            average_suffix: "(Average per scenario + environment + VU)".to_string(),
        }
    }

    /// k6 point streams, `k6-report-...-<n>rps.json`, compared across architectures.
    pub fn k6_architecture() -> Self {
        Self {
            name: "k6-architecture".to_string(),
            path_template: ARCHITECTURE_TEMPLATE.to_string(),
            load: LoadLevelFormat {
                unit: "rps".to_string(),
                label_unit: "RPS".to_string(),
                column: "RPS (Requests per Second)".to_string(),
                segment: LoadSegment::Last,
                max_label: None,
            },
            group_by: vec![Dimension::Architecture, Dimension::LoadLevel],
            chart_by: vec![Dimension::Architecture],
            average_suffix: "(Average per architecture + RPS)".to_string(),
            ..Self::k6()
        }
    }

    pub fn builtin(name: &str) -> Result<Self, ProfileError> {
        let profile = match name {
            "artillery" => Self::artillery(),
            "k6" => Self::k6(),
            "k6-architecture" => Self::k6_architecture(),
            _ => return Err(ProfileError::Unknown(name.to_string())),
        };
        Ok(profile)
    }

    /// Load a profile from a TOML file with the same shape as [Profile].
    pub fn from_toml_file(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        let profile: Profile = toml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check that the grouping and charting dimensions can actually be extracted from a path.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let template = self.template()?;
        let invalid = |reason: String| ProfileError::Invalid {
            profile: self.name.clone(),
            reason,
        };

        if !self.group_by.contains(&Dimension::LoadLevel) {
            return Err(invalid("group_by must include load-level".to_string()));
        }
        for dimension in &self.group_by {
            if *dimension != Dimension::LoadLevel && !template.provides(*dimension) {
                return Err(invalid(format!(
                    "group_by uses {dimension:?} but the path template `{}` does not provide it",
                    self.path_template
                )));
            }
        }
        for dimension in &self.chart_by {
            if *dimension == Dimension::LoadLevel || !self.group_by.contains(dimension) {
                return Err(invalid(format!(
                    "chart_by may only use grouping dimensions other than load-level, found {dimension:?}"
                )));
            }
        }

        Ok(())
    }

    pub fn template(&self) -> Result<PathTemplate, TemplateError> {
        self.path_template.parse()
    }

    pub fn column_name(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Scenario => SCENARIO_COLUMN,
            Dimension::Environment => ENVIRONMENT_COLUMN,
            Dimension::Architecture => ARCHITECTURE_COLUMN,
            Dimension::TestRun => TEST_RUN_COLUMN,
            Dimension::LoadLevel => &self.load.column,
        }
    }

    pub fn group_columns(&self) -> Vec<&str> {
        self.group_by.iter().map(|d| self.column_name(*d)).collect()
    }

    pub fn chart_columns(&self) -> Vec<&str> {
        self.chart_by.iter().map(|d| self.column_name(*d)).collect()
    }

    pub fn mean_average_column(&self) -> String {
        format!("Mean Response Time {}", self.average_suffix)
    }

    pub fn p99_average_column(&self) -> String {
        format!("P99 Response Time {}", self.average_suffix)
    }

    /// True when charts compare architectures against each other.
    pub fn compares_architectures(&self) -> bool {
        self.chart_by == [Dimension::Architecture]
    }
}
