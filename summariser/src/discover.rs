use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Which files under the root count as reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryFilter {
    pub prefix: String,
    pub suffix: String,
    /// Skip files whose name contains this, e.g. `warmup`
    pub exclude_file_substring: Option<String>,
    /// Skip whole directories whose name contains this, e.g. `m5.large`
    pub exclude_dir_marker: Option<String>,
}

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Failed to walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl DiscoveryFilter {
    fn matches_file(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
            && name.ends_with(&self.suffix)
            && !self
                .exclude_file_substring
                .as_ref()
                .is_some_and(|excluded| name.contains(excluded.as_str()))
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        // The root itself is never excluded
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self.exclude_dir_marker.as_ref().is_some_and(|marker| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.contains(marker.as_str()))
            })
    }
}

/// Find every report file under `root`, sorted by path.
pub fn discover_report_files(
    root: &Path,
    filter: &DiscoveryFilter,
) -> Result<Vec<PathBuf>, DiscoverError> {
    let mut found = Vec::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            let excluded = filter.is_excluded_dir(entry);
            if excluded {
                log::debug!("Skipping excluded directory {}", entry.path().display());
            }
            !excluded
        });

    for entry in walker {
        let entry = entry.map_err(|source| DiscoverError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            log::warn!("Ignoring file with a non UTF-8 name: {:?}", entry.path());
            continue;
        };
        if filter.matches_file(name) {
            log::debug!("Found report {}", entry.path().display());
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}
