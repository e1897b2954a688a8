#![allow(dead_code)]

use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const KAAA: (f64, f64) = (40.0, -100.0);

pub fn default_dir(root: &Path) -> PathBuf {
    root.join("Resources").join("default data")
}

pub fn custom_dir(root: &Path) -> PathBuf {
    root.join("Custom Data")
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> Result<()> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn navaid(id: &str, region: &str, kind: &str, lat: f64, lon: f64) -> Value {
    json!({
        "id": id,
        "region": region,
        "name": format!("{} {}", id, kind),
        "type": kind,
        "latitude": lat,
        "longitude": lon,
    })
}

pub fn waypoint(id: &str, region: &str, lat: f64, lon: f64) -> Value {
    json!({ "id": id, "region": region, "latitude": lat, "longitude": lon })
}

/// A small dataset around a single airport, KAAA at 40N 100W, in the
/// default data directory
pub fn dataset() -> Result<TempDir> {
    let root = TempDir::new()?;
    let dir = default_dir(root.path());

    write_json(
        &dir,
        "airports.json",
        &json!([
            { "icao": "KAAA", "name": "Alpha Intl", "latitude": KAAA.0, "longitude": KAAA.1, "elevationFt": 2100 },
            { "icao": "KBBB", "name": "Bravo Muni", "latitude": 45.0, "longitude": -110.0 }
        ]),
    )?;

    write_json(
        &dir,
        "navaids.json",
        &json!([
            navaid("ABC", "K2", "VOR", 35.0, -95.0),
            navaid("AAA", "K1", "VORTAC", 40.05, -100.05),
            navaid("XYZ", "K1", "NDB", 40.1, -100.1),
            navaid("DMA", "K1", "DME", 40.02, -99.95),
            {
                "id": "IAAA", "region": "K1", "name": "ALPHA ILS 09", "type": "ILS",
                "latitude": 40.0, "longitude": -99.97, "frequency": 110.3,
                "associatedAirport": "KAAA", "associatedRunway": "09"
            },
            {
                "id": "IAAA", "region": "K1", "name": "ALPHA GS 09", "type": "GS",
                "latitude": 40.0, "longitude": -100.02,
                "associatedAirport": "KAAA", "associatedRunway": "09"
            },
            {
                "id": "AA", "region": "K1", "name": "ALPHA OM", "type": "OM",
                "latitude": 40.0, "longitude": -100.12,
                "associatedAirport": "KAAA", "associatedRunway": "09"
            }
        ]),
    )?;

    write_json(
        &dir,
        "waypoints.json",
        &json!([
            waypoint("ABC", "K1", 30.0, -90.0),
            waypoint("FIXA", "K1", 40.2, -100.0),
            waypoint("FIXB", "K1", 40.3, -100.2),
            { "id": "ALPHO", "region": "K1", "latitude": 40.1, "longitude": -99.9, "description": "Alpha outer fix" }
        ]),
    )?;

    write_json(
        &dir,
        "airspaces.json",
        &json!([
            {
                "name": "ALPHA CLASS C", "class": "C", "lowerLimitFt": 0, "upperLimitFt": 6000,
                "coordinates": [
                    { "lat": 39.8, "lon": -100.3 }, { "lat": 39.8, "lon": -99.7 },
                    { "lat": 40.2, "lon": -99.7 }, { "lat": 40.2, "lon": -100.3 }
                ]
            },
            {
                "name": "FAR AWAY", "class": "D",
                "coordinates": [
                    { "lat": 10.0, "lon": 10.0 }, { "lat": 10.0, "lon": 11.0 }, { "lat": 11.0, "lon": 11.0 }
                ]
            }
        ]),
    )?;

    write_json(
        &dir,
        "airways.json",
        &json!([
            { "name": "J1", "fromFix": "FIXA", "fromRegion": "K1", "toFix": "FIXB", "toRegion": "K1", "isHigh": true, "baseFl": 180, "topFl": 450 },
            { "name": "V2", "fromFix": "FIXA", "fromRegion": "K1", "toFix": "NOPE", "toRegion": "K1" },
            { "name": "V3", "fromFix": "ABC", "fromRegion": "K2", "toFix": "XYZ", "toRegion": "" }
        ]),
    )?;

    Ok(root)
}
