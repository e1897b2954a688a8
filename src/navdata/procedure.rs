use serde::{Deserialize, Serialize};

use super::types::Coordinates;
use crate::utils::navigation::TurnDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcedureKind {
    #[serde(rename = "SID")]
    Sid,
    #[serde(rename = "STAR")]
    Star,
    #[serde(rename = "APPROACH")]
    Approach,
}

impl ProcedureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcedureKind::Sid => "SID",
            ProcedureKind::Star => "STAR",
            ProcedureKind::Approach => "APPROACH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AltitudeConstraint {
    At { feet: i32 },
    AtOrAbove { feet: i32 },
    AtOrBelow { feet: i32 },
    Between { lower: i32, upper: i32 },
}

/// A symbolic fix reference inside a coded procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureWaypoint {
    pub fix_id: String,
    #[serde(default)]
    pub fix_region: String,
    #[serde(default)]
    pub fix_type: String,
    pub path_terminator: String,
    #[serde(default)]
    pub course: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub altitude: Option<AltitudeConstraint>,
    #[serde(default)]
    pub speed: Option<u32>,
    #[serde(default)]
    pub turn_direction: Option<TurnDirection>,
    /// Some sources embed the fix position directly. Input only; resolved
    /// output carries its own latitude/longitude.
    #[serde(default, skip_serializing)]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing)]
    pub longitude: Option<f64>,
}

impl ProcedureWaypoint {
    pub fn embedded_coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coordinates::new(lat, lon))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    #[serde(rename = "type")]
    pub kind: ProcedureKind,
    pub name: String,
    #[serde(default)]
    pub runway: Option<String>,
    #[serde(default)]
    pub transition: Option<String>,
    pub waypoints: Vec<ProcedureWaypoint>,
}

/// Output of the procedure parser for one airport, still unresolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedProcedures {
    pub sids: Vec<Procedure>,
    pub stars: Vec<Procedure>,
    pub approaches: Vec<Procedure>,
}

impl ParsedProcedures {
    pub fn len(&self) -> usize {
        self.sids.len() + self.stars.len() + self.approaches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a procedure waypoint got its coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionMethod {
    Embedded,
    Qualified,
    NearestFallback,
}

/// A procedure waypoint after resolution.
///
/// Coordinates exist if and only if `resolved` is true; unresolved points must
/// be skipped by consumers, never interpolated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProcedureWaypoint {
    #[serde(flatten)]
    waypoint: ProcedureWaypoint,
    #[serde(rename = "latitude")]
    resolved_lat: Option<f64>,
    #[serde(rename = "longitude")]
    resolved_lon: Option<f64>,
    resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<ResolutionMethod>,
}

impl ResolvedProcedureWaypoint {
    pub fn resolved(waypoint: ProcedureWaypoint, at: Coordinates, method: ResolutionMethod) -> Self {
        Self {
            waypoint,
            resolved_lat: Some(at.lat),
            resolved_lon: Some(at.lon),
            resolved: true,
            method: Some(method),
        }
    }

    pub fn unresolved(waypoint: ProcedureWaypoint) -> Self {
        Self {
            waypoint,
            resolved_lat: None,
            resolved_lon: None,
            resolved: false,
            method: None,
        }
    }

    pub fn waypoint(&self) -> &ProcedureWaypoint {
        &self.waypoint
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.resolved_lat, self.resolved_lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<ResolutionMethod> {
        self.method
    }
}

/// Resolved/total tally for one procedure. Diagnostic only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub resolved: usize,
    pub total: usize,
}

impl ResolutionStats {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.resolved as f64 * 100.0 / self.total as f64
    }

    pub fn unresolved(&self) -> usize {
        self.total - self.resolved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProcedure {
    #[serde(rename = "type")]
    pub kind: ProcedureKind,
    pub name: String,
    pub runway: Option<String>,
    pub transition: Option<String>,
    pub waypoints: Vec<ResolvedProcedureWaypoint>,
    pub stats: ResolutionStats,
}

impl ResolvedProcedure {
    /// Coordinates safe to draw, in sequence, with unresolved points skipped
    pub fn plottable_points(&self) -> impl Iterator<Item = Coordinates> + '_ {
        self.waypoints.iter().filter_map(|wp| wp.coordinates())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AirportProcedures {
    pub icao: String,
    pub sids: Vec<ResolvedProcedure>,
    pub stars: Vec<ResolvedProcedure>,
    pub approaches: Vec<ResolvedProcedure>,
}

impl AirportProcedures {
    pub fn all(&self) -> impl Iterator<Item = &ResolvedProcedure> {
        self.sids.iter().chain(&self.stars).chain(&self.approaches)
    }
}
