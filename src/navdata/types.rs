use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Anything with a position the spatial engine can filter
pub trait GeoPoint {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;

    fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude(), self.longitude())
    }
}

impl GeoPoint for Coordinates {
    fn latitude(&self) -> f64 {
        self.lat
    }
    fn longitude(&self) -> f64 {
        self.lon
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NavaidType {
    #[serde(rename = "VOR")]
    Vor,
    #[serde(rename = "VORTAC")]
    Vortac,
    #[serde(rename = "VOR-DME")]
    VorDme,
    #[serde(rename = "NDB")]
    Ndb,
    #[serde(rename = "DME")]
    Dme,
    #[serde(rename = "TACAN")]
    Tacan,
    #[serde(rename = "ILS")]
    Ils,
    #[serde(rename = "LOC")]
    Loc,
    #[serde(rename = "GS")]
    Gs,
    #[serde(rename = "OM")]
    Om,
    #[serde(rename = "MM")]
    Mm,
    #[serde(rename = "IM")]
    Im,
    #[serde(rename = "FPAP")]
    Fpap,
    #[serde(rename = "GLS")]
    Gls,
    #[serde(rename = "LTP")]
    Ltp,
    #[serde(rename = "FTP")]
    Ftp,
}

impl NavaidType {
    pub const ALL: [NavaidType; 16] = [
        NavaidType::Vor,
        NavaidType::Vortac,
        NavaidType::VorDme,
        NavaidType::Ndb,
        NavaidType::Dme,
        NavaidType::Tacan,
        NavaidType::Ils,
        NavaidType::Loc,
        NavaidType::Gs,
        NavaidType::Om,
        NavaidType::Mm,
        NavaidType::Im,
        NavaidType::Fpap,
        NavaidType::Gls,
        NavaidType::Ltp,
        NavaidType::Ftp,
    ];

    pub const VOR_FAMILY: &'static [NavaidType] =
        &[NavaidType::Vor, NavaidType::Vortac, NavaidType::VorDme];
    pub const DME_FAMILY: &'static [NavaidType] = &[NavaidType::Dme, NavaidType::Tacan];
    pub const ILS_LOC: &'static [NavaidType] = &[NavaidType::Ils, NavaidType::Loc];
    pub const MARKERS: &'static [NavaidType] = &[NavaidType::Om, NavaidType::Mm, NavaidType::Im];
    pub const ILS_COMPONENTS: &'static [NavaidType] = &[
        NavaidType::Ils,
        NavaidType::Loc,
        NavaidType::Gs,
        NavaidType::Om,
        NavaidType::Mm,
        NavaidType::Im,
    ];
    pub const APPROACH_AIDS: &'static [NavaidType] = &[
        NavaidType::Ils,
        NavaidType::Loc,
        NavaidType::Gs,
        NavaidType::Om,
        NavaidType::Mm,
        NavaidType::Im,
        NavaidType::Fpap,
        NavaidType::Gls,
        NavaidType::Ltp,
        NavaidType::Ftp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NavaidType::Vor => "VOR",
            NavaidType::Vortac => "VORTAC",
            NavaidType::VorDme => "VOR-DME",
            NavaidType::Ndb => "NDB",
            NavaidType::Dme => "DME",
            NavaidType::Tacan => "TACAN",
            NavaidType::Ils => "ILS",
            NavaidType::Loc => "LOC",
            NavaidType::Gs => "GS",
            NavaidType::Om => "OM",
            NavaidType::Mm => "MM",
            NavaidType::Im => "IM",
            NavaidType::Fpap => "FPAP",
            NavaidType::Gls => "GLS",
            NavaidType::Ltp => "LTP",
            NavaidType::Ftp => "FTP",
        }
    }

    pub fn is_approach_aid(&self) -> bool {
        Self::APPROACH_AIDS.contains(self)
    }
}

impl fmt::Display for NavaidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavaidType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        let wanted = if wanted == "VORDME" { "VOR-DME".to_string() } else { wanted };
        NavaidType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| QueryError::UnknownNavaidType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navaid {
    pub id: String,
    pub region: String,
    pub name: String,
    #[serde(rename = "type")]
    pub navaid_type: NavaidType,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub frequency: Option<f64>,
    #[serde(default)]
    pub bearing: Option<f64>,
    #[serde(default)]
    pub associated_airport: Option<String>,
    #[serde(default)]
    pub associated_runway: Option<String>,
}

impl GeoPoint for Navaid {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub id: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl GeoPoint for Waypoint {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// One leg of an airway between two fix references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirwaySegment {
    pub name: String,
    pub from_fix: String,
    pub from_region: String,
    pub to_fix: String,
    pub to_region: String,
    #[serde(default)]
    pub is_high: bool,
    #[serde(default)]
    pub base_fl: u32,
    #[serde(default)]
    pub top_fl: u32,
}

/// An airway segment with both endpoints resolved. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirwaySegmentWithCoords {
    #[serde(flatten)]
    pub segment: AirwaySegment,
    pub from_lat: f64,
    pub from_lon: f64,
    pub to_lat: f64,
    pub to_lon: f64,
}

impl AirwaySegmentWithCoords {
    pub fn from_coordinates(&self) -> Coordinates {
        Coordinates::new(self.from_lat, self.from_lon)
    }

    pub fn to_coordinates(&self) -> Coordinates {
        Coordinates::new(self.to_lat, self.to_lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airspace {
    pub name: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub lower_limit_ft: Option<i32>,
    #[serde(default)]
    pub upper_limit_ft: Option<i32>,
    /// Ordered polygon vertices; the ring is implicitly closed
    pub coordinates: Vec<Coordinates>,
}

impl Airspace {
    /// Ray casting in plain lat/lon space
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        let ring = &self.coordinates;
        if ring.len() < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = ring.len() - 1;
        for i in 0..ring.len() {
            let (a, b) = (ring[i], ring[j]);
            if (a.lat > lat) != (b.lat > lat)
                && lon < (b.lon - a.lon) * (lat - a.lat) / (b.lat - a.lat) + a.lon
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerRole {
    Ctr,
    App,
    Twr,
    Gnd,
    Del,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtcController {
    pub facility_id: String,
    pub name: String,
    pub role: ControllerRole,
    #[serde(default)]
    pub frequencies: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPattern {
    pub fix_id: String,
    pub fix_region: String,
    #[serde(default)]
    pub airport: Option<String>,
    pub inbound_course: f64,
    #[serde(default)]
    pub turn_direction: Option<crate::utils::navigation::TurnDirection>,
    #[serde(default)]
    pub leg_time_min: Option<f64>,
    #[serde(default)]
    pub leg_distance_nm: Option<f64>,
    #[serde(default)]
    pub min_altitude_ft: Option<i32>,
    #[serde(default)]
    pub max_altitude_ft: Option<i32>,
    #[serde(default)]
    pub speed_kts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportMetadata {
    pub icao: String,
    #[serde(default)]
    pub transition_alt: Option<i32>,
    #[serde(default)]
    pub transition_level: Option<i32>,
    #[serde(default)]
    pub longest_runway: Option<u32>,
}

/// Airport record held by the airport store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub icao: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation_ft: Option<i32>,
}

impl GeoPoint for Airport {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navaid_type_parsing() {
        assert_eq!("vor-dme".parse::<NavaidType>(), Ok(NavaidType::VorDme));
        assert_eq!("VORDME".parse::<NavaidType>(), Ok(NavaidType::VorDme));
        assert_eq!(" gs ".parse::<NavaidType>(), Ok(NavaidType::Gs));
        assert_eq!(
            "XYZ".parse::<NavaidType>(),
            Err(QueryError::UnknownNavaidType("XYZ".to_string()))
        );
    }

    #[test]
    fn test_navaid_json_shape() {
        let json = r#"{"id":"IBCN","region":"LE","name":"BARCELONA ILS","type":"ILS",
            "latitude":41.29,"longitude":2.08,"associatedAirport":"LEBL","associatedRunway":"25R"}"#;
        let navaid: Navaid = serde_json::from_str(json).unwrap();
        assert_eq!(navaid.navaid_type, NavaidType::Ils);
        assert_eq!(navaid.associated_runway.as_deref(), Some("25R"));
        assert!(navaid.frequency.is_none());
    }

    #[test]
    fn test_airspace_contains() {
        let square = Airspace {
            name: "TEST".to_string(),
            class: Some("C".to_string()),
            lower_limit_ft: None,
            upper_limit_ft: None,
            coordinates: vec![
                Coordinates::new(0.0, 0.0),
                Coordinates::new(0.0, 1.0),
                Coordinates::new(1.0, 1.0),
                Coordinates::new(1.0, 0.0),
            ],
        };
        assert!(square.contains(0.5, 0.5));
        assert!(!square.contains(1.5, 0.5));
    }
}
