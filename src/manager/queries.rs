use serde::Serialize;

use super::NavDataManager;
use crate::error::QueryError;
use crate::navdata::{
    Airport, AirportMetadata, Airspace, AirwaySegment, AirwaySegmentWithCoords, AtcController,
    ControllerRole, Coordinates, FixIndex, GeoPoint, HoldingPattern, Navaid, NavaidType,
    RadiusQuery, Waypoint,
};

/// Display grouping for free-text search hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    Ils,
    Ndb,
    Dme,
    Vor,
    Waypoint,
}

impl From<NavaidType> for SearchCategory {
    fn from(navaid_type: NavaidType) -> Self {
        match navaid_type {
            NavaidType::Ndb => SearchCategory::Ndb,
            NavaidType::Dme | NavaidType::Tacan => SearchCategory::Dme,
            t if t.is_approach_aid() => SearchCategory::Ils,
            _ => SearchCategory::Vor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub region: String,
    pub category: SearchCategory,
    pub latitude: f64,
    pub longitude: f64,
}

fn resolve_endpoint(index: &FixIndex, id: &str, region: &str) -> Option<Coordinates> {
    if region.trim().is_empty() {
        index.resolve_any(id, None)
    } else {
        index.resolve(id, Some(region))
    }
}

/// Both endpoints or nothing
fn resolve_segment(index: &FixIndex, segment: &AirwaySegment) -> Option<AirwaySegmentWithCoords> {
    let from = resolve_endpoint(index, &segment.from_fix, &segment.from_region)?;
    let to = resolve_endpoint(index, &segment.to_fix, &segment.to_region)?;
    Some(AirwaySegmentWithCoords {
        segment: segment.clone(),
        from_lat: from.lat,
        from_lon: from.lon,
        to_lat: to.lat,
        to_lon: to.lon,
    })
}

fn same_ident(a: Option<&str>, b: &str) -> bool {
    a.is_some_and(|a| a.trim().eq_ignore_ascii_case(b.trim()))
}

impl NavDataManager {
    /// Navaids within `radius_nm`, optionally restricted to some types.
    /// An empty type list is rejected rather than matching nothing.
    pub fn navaids_in_radius(
        &self,
        lat: f64,
        lon: f64,
        radius_nm: f64,
        types: Option<&[NavaidType]>,
    ) -> Result<Vec<Navaid>, QueryError> {
        let query = RadiusQuery::new(lat, lon, radius_nm)?;
        let navaids = self.navaids.snapshot();
        match types {
            Some([]) => Err(QueryError::EmptyTypeFilter),
            Some(types) => Ok(query.filter_by(navaids.as_slice(), |n| types.contains(&n.navaid_type))),
            None => Ok(query.filter(navaids.as_slice())),
        }
    }

    /// Type filter given as names such as `"VOR"` or `"vor-dme"`
    pub fn navaids_in_radius_by_type_names<S: AsRef<str>>(
        &self,
        lat: f64,
        lon: f64,
        radius_nm: f64,
        type_names: &[S],
    ) -> Result<Vec<Navaid>, QueryError> {
        let types = type_names
            .iter()
            .map(|name| name.as_ref().parse::<NavaidType>())
            .collect::<Result<Vec<_>, _>>()?;
        self.navaids_in_radius(lat, lon, radius_nm, Some(&types))
    }

    pub fn vors_in_radius(&self, lat: f64, lon: f64, radius_nm: f64) -> Result<Vec<Navaid>, QueryError> {
        self.navaids_in_radius(lat, lon, radius_nm, Some(NavaidType::VOR_FAMILY))
    }

    pub fn ndbs_in_radius(&self, lat: f64, lon: f64, radius_nm: f64) -> Result<Vec<Navaid>, QueryError> {
        self.navaids_in_radius(lat, lon, radius_nm, Some(&[NavaidType::Ndb]))
    }

    pub fn dmes_in_radius(&self, lat: f64, lon: f64, radius_nm: f64) -> Result<Vec<Navaid>, QueryError> {
        self.navaids_in_radius(lat, lon, radius_nm, Some(NavaidType::DME_FAMILY))
    }

    pub fn ils_in_radius(&self, lat: f64, lon: f64, radius_nm: f64) -> Result<Vec<Navaid>, QueryError> {
        self.navaids_in_radius(lat, lon, radius_nm, Some(NavaidType::ILS_LOC))
    }

    pub fn glideslopes_in_radius(&self, lat: f64, lon: f64, radius_nm: f64) -> Result<Vec<Navaid>, QueryError> {
        self.navaids_in_radius(lat, lon, radius_nm, Some(&[NavaidType::Gs]))
    }

    pub fn markers_in_radius(&self, lat: f64, lon: f64, radius_nm: f64) -> Result<Vec<Navaid>, QueryError> {
        self.navaids_in_radius(lat, lon, radius_nm, Some(NavaidType::MARKERS))
    }

    pub fn ils_components_in_radius(&self, lat: f64, lon: f64, radius_nm: f64) -> Result<Vec<Navaid>, QueryError> {
        self.navaids_in_radius(lat, lon, radius_nm, Some(NavaidType::ILS_COMPONENTS))
    }

    pub fn approach_aids_in_radius(&self, lat: f64, lon: f64, radius_nm: f64) -> Result<Vec<Navaid>, QueryError> {
        self.navaids_in_radius(lat, lon, radius_nm, Some(NavaidType::APPROACH_AIDS))
    }

    pub fn waypoints_in_radius(&self, lat: f64, lon: f64, radius_nm: f64) -> Result<Vec<Waypoint>, QueryError> {
        let query = RadiusQuery::new(lat, lon, radius_nm)?;
        Ok(query.filter(self.waypoints.snapshot().as_slice()))
    }

    pub fn airspaces_in_radius(&self, lat: f64, lon: f64, radius_nm: f64) -> Result<Vec<Airspace>, QueryError> {
        let query = RadiusQuery::new(lat, lon, radius_nm)?;
        Ok(self
            .airspaces
            .snapshot()
            .iter()
            .filter(|a| query.touches_airspace(a))
            .cloned()
            .collect())
    }

    /// Equality match on the associated airport; no geometry involved
    pub fn navaids_for_airport(&self, icao: &str) -> Vec<Navaid> {
        self.navaids
            .snapshot()
            .iter()
            .filter(|n| same_ident(n.associated_airport.as_deref(), icao))
            .cloned()
            .collect()
    }

    pub fn navaids_for_runway(&self, icao: &str, runway: &str) -> Vec<Navaid> {
        self.navaids
            .snapshot()
            .iter()
            .filter(|n| {
                same_ident(n.associated_airport.as_deref(), icao)
                    && same_ident(n.associated_runway.as_deref(), runway)
            })
            .cloned()
            .collect()
    }

    /// Segments with at least one resolved endpoint inside the radius, so
    /// long segments crossing into the area are kept
    pub fn airways_in_radius(
        &self,
        lat: f64,
        lon: f64,
        radius_nm: f64,
    ) -> Result<Vec<AirwaySegmentWithCoords>, QueryError> {
        let query = RadiusQuery::new(lat, lon, radius_nm)?;
        let index = self.fix_index();
        Ok(self
            .airways
            .snapshot()
            .iter()
            .filter_map(|segment| resolve_segment(&index, segment))
            .filter(|s| query.contains_point(&s.from_coordinates()) || query.contains_point(&s.to_coordinates()))
            .collect())
    }

    /// The whole resolvable route network, in load order, truncated at
    /// `limit`. The configured maximum bounds every call.
    pub fn all_airways(&self, limit: Option<usize>) -> Result<Vec<AirwaySegmentWithCoords>, QueryError> {
        let max = self.config.max_airway_segments;
        let cap = limit.map_or(max, |limit| limit.min(max));
        if cap == 0 {
            return Err(QueryError::ZeroLimit);
        }
        let index = self.fix_index();
        Ok(self
            .airways
            .snapshot()
            .iter()
            .filter_map(|segment| resolve_segment(&index, segment))
            .take(cap)
            .collect())
    }

    /// Case-insensitive substring search over ids and names. Navaids fill the
    /// result first; waypoints only top it up to `limit`.
    pub fn search(&self, text: &str, limit: Option<usize>) -> Result<Vec<SearchResult>, QueryError> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Err(QueryError::EmptySearch);
        }
        let limit = limit.unwrap_or(self.config.search_limit);
        if limit == 0 {
            return Err(QueryError::ZeroLimit);
        }

        let mut results: Vec<SearchResult> = self
            .navaids
            .snapshot()
            .iter()
            .filter(|n| n.id.to_lowercase().contains(&needle) || n.name.to_lowercase().contains(&needle))
            .take(limit)
            .map(|n| SearchResult {
                id: n.id.clone(),
                name: n.name.clone(),
                region: n.region.clone(),
                category: n.navaid_type.into(),
                latitude: n.latitude,
                longitude: n.longitude,
            })
            .collect();

        if results.len() < limit {
            let remaining = limit - results.len();
            results.extend(
                self.waypoints
                    .snapshot()
                    .iter()
                    .filter(|w| {
                        w.id.to_lowercase().contains(&needle)
                            || w.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&needle))
                    })
                    .take(remaining)
                    .map(|w| SearchResult {
                        id: w.id.clone(),
                        name: w.description.clone().unwrap_or_else(|| w.id.clone()),
                        region: w.region.clone(),
                        category: SearchCategory::Waypoint,
                        latitude: w.latitude,
                        longitude: w.longitude,
                    }),
            );
        }

        Ok(results)
    }

    /// Strict `(id, region)` lookup
    pub fn resolve_fix(&self, id: &str, region: &str) -> Option<Coordinates> {
        self.fix_index().resolve(id, Some(region))
    }

    /// Qualified lookup when a region is given, then the bare-id slot
    pub fn resolve_fix_any(&self, id: &str, region: Option<&str>) -> Option<Coordinates> {
        self.fix_index().resolve_any(id, region)
    }

    pub fn atc_controllers(&self) -> Vec<AtcController> {
        self.atc.snapshot().to_vec()
    }

    pub fn atc_by_role(&self, role: ControllerRole) -> Vec<AtcController> {
        self.atc.snapshot().iter().filter(|c| c.role == role).cloned().collect()
    }

    pub fn atc_for_facility(&self, facility_id: &str) -> Vec<AtcController> {
        self.atc
            .snapshot()
            .iter()
            .filter(|c| c.facility_id.eq_ignore_ascii_case(facility_id))
            .cloned()
            .collect()
    }

    pub fn holds_at_fix(&self, fix_id: &str, fix_region: Option<&str>) -> Vec<HoldingPattern> {
        self.holds
            .snapshot()
            .iter()
            .filter(|h| h.fix_id == fix_id && fix_region.map_or(true, |r| h.fix_region == r))
            .cloned()
            .collect()
    }

    pub fn holds_for_airport(&self, icao: &str) -> Vec<HoldingPattern> {
        self.holds
            .snapshot()
            .iter()
            .filter(|h| same_ident(h.airport.as_deref(), icao))
            .cloned()
            .collect()
    }

    pub fn airport_metadata(&self, icao: &str) -> Option<AirportMetadata> {
        self.airport_metadata
            .snapshot()
            .iter()
            .find(|m| m.icao.eq_ignore_ascii_case(icao.trim()))
            .cloned()
    }

    pub fn airport(&self, icao: &str) -> Option<Airport> {
        self.airport_store.get(icao.trim())
    }

    pub fn airport_coordinates(&self, icao: &str) -> Option<Coordinates> {
        self.airport(icao).map(|a| a.coordinates())
    }
}
