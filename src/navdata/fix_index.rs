//! Composite fix lookup built from waypoints and navaids.
//!
//! Identifiers repeat across regions, so every record is indexed under
//! `"{id}:{region}"`. A bare `"{id}"` slot is kept as a fallback where the
//! earliest inserted record wins; waypoints are inserted before navaids and so
//! own the bare slot when both exist. Which region wins among duplicates
//! depends on loader output order; callers needing precision pass the region.

use std::collections::HashMap;

use super::types::{Coordinates, Navaid, Waypoint};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixIndex {
    qualified: HashMap<String, Coordinates>,
    bare: HashMap<String, Coordinates>,
    candidates: HashMap<String, Vec<Coordinates>>,
}

fn qualified_key(id: &str, region: &str) -> String {
    format!("{}:{}", id, region)
}

fn non_empty(region: Option<&str>) -> Option<&str> {
    region.map(str::trim).filter(|r| !r.is_empty())
}

impl FixIndex {
    /// Full O(n) rebuild. There is no incremental path; rebuild whenever
    /// either source collection changes.
    pub fn build(waypoints: &[Waypoint], navaids: &[Navaid]) -> Self {
        let points = || {
            waypoints
                .iter()
                .map(|w| (w.id.as_str(), w.region.as_str(), Coordinates::new(w.latitude, w.longitude)))
                .chain(navaids.iter().map(|n| {
                    (n.id.as_str(), n.region.as_str(), Coordinates::new(n.latitude, n.longitude))
                }))
        };

        let mut index = Self {
            qualified: HashMap::with_capacity(waypoints.len() + navaids.len()),
            bare: HashMap::new(),
            candidates: HashMap::new(),
        };

        // Pass 1: qualified keys for every record
        for (id, region, at) in points() {
            index.qualified.insert(qualified_key(id, region), at);
            index.candidates.entry(id.to_string()).or_default().push(at);
        }

        // Pass 2: bare ids, insert-if-absent
        for (id, _, at) in points() {
            index.bare.entry(id.to_string()).or_insert(at);
        }

        index
    }

    /// Qualified lookup only. Without a region this fails even when the bare
    /// id is unique; use [`FixIndex::resolve_any`] for the fallback.
    pub fn resolve(&self, id: &str, region: Option<&str>) -> Option<Coordinates> {
        let region = non_empty(region)?;
        self.qualified.get(&qualified_key(id, region)).copied()
    }

    /// Qualified key first, then the first-writer bare slot
    pub fn resolve_any(&self, id: &str, region: Option<&str>) -> Option<Coordinates> {
        self.resolve(id, region)
            .or_else(|| self.bare.get(id).copied())
    }

    /// Every position recorded for a bare id, in insertion order
    pub fn candidates(&self, id: &str) -> &[Coordinates] {
        self.candidates.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn qualified_len(&self) -> usize {
        self.qualified.len()
    }

    pub fn bare_len(&self) -> usize {
        self.bare.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qualified.is_empty()
    }
}
