use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::provenance::Provenance;

/// A dataset category the manager loads as one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Airports,
    Navaids,
    Waypoints,
    Airspaces,
    Airways,
    Atc,
    Holds,
    AirportMetadata,
}

impl Category {
    pub const PRIMARY: [Category; 5] = [
        Category::Airports,
        Category::Navaids,
        Category::Waypoints,
        Category::Airspaces,
        Category::Airways,
    ];

    pub const OPTIONAL: [Category; 3] =
        [Category::Atc, Category::Holds, Category::AirportMetadata];

    pub fn all() -> impl Iterator<Item = Category> {
        Self::PRIMARY.into_iter().chain(Self::OPTIONAL)
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Airports => "airports.json",
            Category::Navaids => "navaids.json",
            Category::Waypoints => "waypoints.json",
            Category::Airspaces => "airspaces.json",
            Category::Airways => "airways.json",
            Category::Atc => "atc.json",
            Category::Holds => "holds.json",
            Category::AirportMetadata => "airport_meta.json",
        }
    }

    pub fn is_optional(&self) -> bool {
        Self::OPTIONAL.contains(self)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Airports => "airports",
            Category::Navaids => "navaids",
            Category::Waypoints => "waypoints",
            Category::Airspaces => "airspaces",
            Category::Airways => "airways",
            Category::Atc => "ATC",
            Category::Holds => "holding patterns",
            Category::AirportMetadata => "airport metadata",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-category lifecycle. A failed load falls back to whatever state the
/// category had before it entered `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatus {
    pub loaded: bool,
    pub count: usize,
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
    /// Reason of the most recent failed attempt, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavaidStatus {
    #[serde(flatten)]
    pub status: CategoryStatus,
    pub by_type: BTreeMap<String, usize>,
}

/// Snapshot handed to presentation layers. Field names are part of the
/// contract.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLoadStatus {
    pub dataset_root: Option<PathBuf>,
    pub airports: CategoryStatus,
    pub navaids: NavaidStatus,
    pub waypoints: CategoryStatus,
    pub airspaces: CategoryStatus,
    pub airways: CategoryStatus,
    /// `None` when never attempted or unsupported by this dataset
    pub atc: Option<CategoryStatus>,
    pub holds: Option<CategoryStatus>,
    pub airport_metadata: Option<CategoryStatus>,
    pub provenance: Provenance,
}

impl DataLoadStatus {
    pub fn category(&self, category: Category) -> Option<&CategoryStatus> {
        match category {
            Category::Airports => Some(&self.airports),
            Category::Navaids => Some(&self.navaids.status),
            Category::Waypoints => Some(&self.waypoints),
            Category::Airspaces => Some(&self.airspaces),
            Category::Airways => Some(&self.airways),
            Category::Atc => self.atc.as_ref(),
            Category::Holds => self.holds.as_ref(),
            Category::AirportMetadata => self.airport_metadata.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_json_shape() {
        let mut status = DataLoadStatus::default();
        status.navaids.status.loaded = true;
        status.navaids.status.count = 3;
        status.navaids.by_type.insert("VOR".to_string(), 3);

        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["navaids"]["loaded"], true);
        assert_eq!(json["navaids"]["count"], 3);
        assert_eq!(json["navaids"]["byType"]["VOR"], 3);
        assert!(json["atc"].is_null());
        assert!(json["airportMetadata"].is_null());
        assert!(json["airports"]["source"].is_null());
    }

    #[test]
    fn test_category_partition() {
        assert_eq!(Category::all().count(), 8);
        assert!(Category::Holds.is_optional());
        assert!(!Category::Airways.is_optional());
    }
}
