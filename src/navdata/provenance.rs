//! Dataset root validation and data provenance.
//!
//! A dataset root is laid out like an X-Plane installation. Third-party data
//! lives in `Custom Data/` and takes precedence over the simulator's bundled
//! `Resources/default data/`. Which of the two supplied a category is reported
//! in the status snapshot and nothing else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::status::Category;
use crate::error::{DataError, DataResult};

pub mod subdirs {
    pub const CUSTOM_DATA: &str = "Custom Data";
    pub const RESOURCES: &str = "Resources";
    pub const DEFAULT_DATA: &str = "default data";
    pub const CIFP: &str = "CIFP";
    pub const CYCLE_FILE: &str = "cycle.json";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    Custom,
    Default,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub source: DataSource,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Provenance {
    pub categories: BTreeMap<Category, SourceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl Provenance {
    pub fn source_of(&self, category: Category) -> Option<&SourceInfo> {
        self.categories.get(&category)
    }
}

#[derive(Debug, Deserialize)]
struct CycleInfo {
    cycle: Option<String>,
    provider: Option<String>,
}

pub fn custom_data_dir(root: &Path) -> PathBuf {
    root.join(subdirs::CUSTOM_DATA)
}

pub fn default_data_dir(root: &Path) -> PathBuf {
    root.join(subdirs::RESOURCES).join(subdirs::DEFAULT_DATA)
}

/// Fails fast when the root cannot possibly hold a dataset
pub fn validate_root(root: &Path) -> DataResult<()> {
    if !root.is_dir() {
        return Err(DataError::InvalidRoot(root.to_path_buf()));
    }
    if !custom_data_dir(root).is_dir() && !default_data_dir(root).is_dir() {
        return Err(DataError::MissingDataDirectories(root.to_path_buf()));
    }
    Ok(())
}

/// Locate `relative` under the custom directory first, then the default one.
/// When neither has it, the default location is reported as missing.
pub fn locate(root: &Path, relative: &Path) -> SourceInfo {
    let custom = custom_data_dir(root).join(relative);
    if custom.is_file() {
        return SourceInfo { source: DataSource::Custom, path: custom };
    }

    let default = default_data_dir(root).join(relative);
    let source = if default.is_file() { DataSource::Default } else { DataSource::Missing };
    SourceInfo { source, path: default }
}

pub fn procedure_file(root: &Path, icao: &str) -> SourceInfo {
    let relative = Path::new(subdirs::CIFP).join(format!("{}.json", icao));
    locate(root, &relative)
}

/// Answers which vendor supplied each category
pub trait ProvenanceDetector: Send + Sync {
    fn detect(&self, root: &Path) -> Provenance;
}

/// Looks at which data directory holds each category file
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryProvenanceDetector;

impl ProvenanceDetector for DirectoryProvenanceDetector {
    fn detect(&self, root: &Path) -> Provenance {
        let categories = Category::all()
            .map(|c| (c, locate(root, Path::new(c.file_name()))))
            .collect();

        let cycle_path = custom_data_dir(root).join(subdirs::CYCLE_FILE);
        let cycle_info = fs::read_to_string(&cycle_path)
            .ok()
            .and_then(|contents| match serde_json::from_str::<CycleInfo>(&contents) {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::warn!("[PROVENANCE] Ignoring unreadable {}: {}", cycle_path.display(), e);
                    None
                }
            });

        let (cycle, provider) = cycle_info
            .map(|info| (info.cycle, info.provider))
            .unwrap_or((None, None));

        Provenance { categories, cycle, provider }
    }
}
