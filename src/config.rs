use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_MAX_FALLBACK_DISTANCE_NM: f64 = 50.0;
const DEFAULT_MAX_AIRWAY_SEGMENTS: usize = 20_000;
const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Tunables for the navigation data manager, loaded from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagerConfig {
    /// How far from the procedure's airport a bare-id fix may be accepted
    pub max_fallback_distance_nm: f64,
    /// Hard cap for the unfiltered airway network query
    pub max_airway_segments: usize,
    pub search_limit: usize,
    /// ATC, holding patterns and airport metadata
    pub load_optional_categories: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_fallback_distance_nm: DEFAULT_MAX_FALLBACK_DISTANCE_NM,
            max_airway_segments: DEFAULT_MAX_AIRWAY_SEGMENTS,
            search_limit: DEFAULT_SEARCH_LIMIT,
            load_optional_categories: true,
        }
    }
}

impl ManagerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: ManagerConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON: {}", path.display()))?;
        Ok(config)
    }

    pub fn with_max_fallback_distance_nm(mut self, distance_nm: f64) -> Self {
        self.max_fallback_distance_nm = distance_nm;
        self
    }

    pub fn with_max_airway_segments(mut self, max: usize) -> Self {
        self.max_airway_segments = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "maxFallbackDistanceNm": 120.0 }}"#)?;

        let config = ManagerConfig::load(file.path())?;

        assert_eq!(config.max_fallback_distance_nm, 120.0);
        assert_eq!(config.max_airway_segments, DEFAULT_MAX_AIRWAY_SEGMENTS);
        assert_eq!(config.search_limit, DEFAULT_SEARCH_LIMIT);
        assert!(config.load_optional_categories);
        Ok(())
    }

    #[test]
    fn test_missing_config_file() {
        let err = ManagerConfig::load("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
