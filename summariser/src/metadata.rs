use crate::profile::{Dimension, LoadLevelFormat};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Labels for a single report, derived from where it lives and what it's called.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportMetadata {
    pub scenario: Option<String>,
    pub environment: Option<String>,
    pub architecture: Option<String>,
    pub test_run: Option<String>,
    pub load_level: u32,
}

impl ReportMetadata {
    pub fn label(&self, dimension: Dimension) -> Option<String> {
        match dimension {
            Dimension::Scenario => self.scenario.clone(),
            Dimension::Environment => self.environment.clone(),
            Dimension::Architecture => self.architecture.clone(),
            Dimension::TestRun => self.test_run.clone(),
            Dimension::LoadLevel => Some(self.load_level.to_string()),
        }
    }
}

/// Which dash-separated segment of a file name carries the load level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoadSegment {
    Index(usize),
    Last,
}

impl Display for LoadSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadSegment::Index(index) => write!(f, "index {index}"),
            LoadSegment::Last => write!(f, "last"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Scenario,
    Environment,
    Architecture,
    Date,
    Any,
    File,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Path template is empty")]
    Empty,
    #[error("Unknown token `{0}` in path template")]
    UnknownToken(String),
    #[error("Path template must contain `{{file}}` exactly once, as its last component")]
    FileNotLast,
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Path {} has {found} components but template `{template}` needs at least {expected}", .path.display())]
    TooShallow {
        path: PathBuf,
        template: String,
        expected: usize,
        found: usize,
    },
    #[error("File name of {} has no dash-separated segment at {position}", .path.display())]
    MissingLoadSegment { path: PathBuf, position: LoadSegment },
    #[error("Segment `{segment}` of {} does not start with a load level in `{unit}`", .path.display())]
    InvalidLoadLevel {
        path: PathBuf,
        segment: String,
        unit: String,
    },
}

/// A validated description of where labels sit in a report's path.
///
/// Tokens are separated by `/` and match path components from the end of the path, so
/// `{environment}/{date}/{file}` applied to `/data/lambda/prod/2024-01-01/report-50rps.json`
/// reads `prod` as the environment and `2024-01-01` as the test run.
///
/// - `{scenario}` may repeat, its values are joined with `/`.
/// - `{environment}`, `{architecture}` and `{date}` label a single component.
/// - `*` matches any single component.
/// - `{file}` must come last and matches the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    tokens: Vec<Token>,
}

impl FromStr for PathTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(TemplateError::Empty);
        }

        let tokens = s
            .split('/')
            .map(|part| match part {
                "{scenario}" => Ok(Token::Scenario),
                "{environment}" => Ok(Token::Environment),
                "{architecture}" => Ok(Token::Architecture),
                "{date}" => Ok(Token::Date),
                "{file}" => Ok(Token::File),
                "*" => Ok(Token::Any),
                other => Err(TemplateError::UnknownToken(other.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let file_count = tokens.iter().filter(|t| **t == Token::File).count();
        if file_count != 1 || tokens.last() != Some(&Token::File) {
            return Err(TemplateError::FileNotLast);
        }

        Ok(Self {
            source: s.to_string(),
            tokens,
        })
    }
}

impl Display for PathTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl PathTemplate {
    /// Whether matching this template yields a value for the dimension.
    pub fn provides(&self, dimension: Dimension) -> bool {
        let token = match dimension {
            Dimension::Scenario => Token::Scenario,
            Dimension::Environment => Token::Environment,
            Dimension::Architecture => Token::Architecture,
            Dimension::TestRun => Token::Date,
            Dimension::LoadLevel => return true,
        };
        self.tokens.contains(&token)
    }

    /// Extract labels from `path` according to this template and the load level format.
    pub fn extract(
        &self,
        path: &Path,
        load: &LoadLevelFormat,
    ) -> Result<ReportMetadata, MetadataError> {
        let components = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>();

        if components.len() < self.tokens.len() {
            return Err(MetadataError::TooShallow {
                path: path.to_path_buf(),
                template: self.source.clone(),
                expected: self.tokens.len(),
                found: components.len(),
            });
        }

        let offset = components.len() - self.tokens.len();
        let mut metadata = ReportMetadata::default();
        let mut scenario_parts = Vec::new();

        for (token, component) in self.tokens.iter().zip(&components[offset..]) {
            match token {
                Token::Scenario => scenario_parts.push(component.as_str()),
                Token::Environment => metadata.environment = Some(component.clone()),
                Token::Architecture => metadata.architecture = Some(component.clone()),
                Token::Date => metadata.test_run = Some(component.clone()),
                Token::File => metadata.load_level = load_level(path, component, load)?,
                Token::Any => {}
            }
        }
        if !scenario_parts.is_empty() {
            metadata.scenario = Some(scenario_parts.join("/"));
        }

        Ok(metadata)
    }
}

/// Read the load level from a file name such as `report-50rps.json` or `k6-report-io-50vu.json`.
///
/// The selected dash-separated segment must start with digits immediately followed by the unit.
fn load_level(path: &Path, file_name: &str, load: &LoadLevelFormat) -> Result<u32, MetadataError> {
    let segments = file_name.split('-').collect::<Vec<_>>();
    let segment = match load.segment {
        LoadSegment::Index(index) => segments.get(index),
        LoadSegment::Last if segments.len() > 1 => segments.last(),
        LoadSegment::Last => None,
    }
    .ok_or_else(|| MetadataError::MissingLoadSegment {
        path: path.to_path_buf(),
        position: load.segment,
    })?;

    let invalid = || MetadataError::InvalidLoadLevel {
        path: path.to_path_buf(),
        segment: segment.to_string(),
        unit: load.unit.clone(),
    };

    let (level, _) = segment.split_once(load.unit.as_str()).ok_or_else(invalid)?;
    level.parse::<u32>().map_err(|_| invalid())
}
