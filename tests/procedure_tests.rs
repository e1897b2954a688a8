mod common;

use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use common::{custom_dir, dataset, default_dir, write_json};
use xplane_navdata::navdata::{Coordinates, ResolutionMethod};
use xplane_navdata::{DataError, ManagerConfig, NavDataManager, QueryError};

fn leg(fix_id: &str, region: &str) -> Value {
    json!({ "fixId": fix_id, "fixRegion": region, "fixType": "E", "pathTerminator": "TF" })
}

fn near(at: Option<Coordinates>, expected: (f64, f64)) -> bool {
    at.is_some_and(|c| (c.lat - expected.0).abs() < 1e-9 && (c.lon - expected.1).abs() < 1e-9)
}

fn write_kaaa_procedures(dir: &Path) -> Result<()> {
    write_json(
        dir,
        "CIFP/KAAA.json",
        &json!([
            {
                "type": "SID", "name": "DEP1", "runway": "09",
                "waypoints": [
                    {
                        "fixId": "RW09", "fixRegion": "K1", "pathTerminator": "IF",
                        "latitude": 40.0, "longitude": -100.01
                    },
                    leg("FIXA", "K1"),
                    leg("XYZ", "K9"),
                    leg("ABC", "K9")
                ]
            },
            {
                "type": "STAR", "name": "ARR1", "transition": "ALPHO",
                "waypoints": [leg("ALPHO", "K1"), leg("FIXB", "K1")]
            },
            {
                "type": "APPROACH", "name": "I09", "runway": "09",
                "waypoints": [
                    leg("AAA", "K1"),
                    {
                        "fixId": "IAAA", "fixRegion": "K1", "pathTerminator": "CF",
                        "altitude": { "type": "atOrAbove", "feet": 3000 }, "speed": 180
                    }
                ]
            }
        ]),
    )
}

async fn loaded_manager(config: ManagerConfig) -> Result<(tempfile::TempDir, NavDataManager)> {
    let root = dataset()?;
    write_kaaa_procedures(&default_dir(root.path()))?;
    let manager = NavDataManager::new(config);
    manager.load_all(root.path()).await?;
    Ok((root, manager))
}

#[tokio::test]
async fn test_procedures_resolve_in_order() -> Result<()> {
    let (_root, manager) = loaded_manager(ManagerConfig::default()).await?;

    let procedures = manager.procedures_for_airport("kaaa").await?;
    assert_eq!(procedures.icao, "KAAA");
    assert_eq!(procedures.sids.len(), 1);
    assert_eq!(procedures.stars.len(), 1);
    assert_eq!(procedures.approaches.len(), 1);

    let sid = &procedures.sids[0];
    let ids: Vec<_> = sid.waypoints.iter().map(|w| w.waypoint().fix_id.as_str()).collect();
    assert_eq!(ids, vec!["RW09", "FIXA", "XYZ", "ABC"]);

    let methods: Vec<_> = sid.waypoints.iter().map(|w| w.method()).collect();
    assert_eq!(
        methods,
        vec![
            Some(ResolutionMethod::Embedded),
            Some(ResolutionMethod::Qualified),
            Some(ResolutionMethod::NearestFallback),
            None,
        ]
    );
    assert_eq!(sid.waypoints[0].coordinates(), Some(Coordinates::new(40.0, -100.01)));
    assert_eq!(sid.waypoints[2].coordinates(), Some(Coordinates::new(40.1, -100.1)));

    // Neither ABC is anywhere near KAAA
    assert!(!sid.waypoints[3].is_resolved());
    assert!(sid.waypoints[3].coordinates().is_none());
    assert_eq!(sid.stats.resolved, 3);
    assert_eq!(sid.stats.total, 4);
    assert_eq!(sid.plottable_points().count(), 3);

    let approach = &procedures.approaches[0];
    assert_eq!(approach.stats.resolved, 2);
    assert_eq!(approach.stats.percentage(), 100.0);
    Ok(())
}

#[tokio::test]
async fn test_unresolved_waypoints_serialize_without_coordinates() -> Result<()> {
    let (_root, manager) = loaded_manager(ManagerConfig::default()).await?;
    let procedures = manager.procedures_for_airport("KAAA").await?;

    let value = serde_json::to_value(&procedures.sids[0])?;
    let unresolved = &value["waypoints"][3];
    assert_eq!(unresolved["fixId"], "ABC");
    assert_eq!(unresolved["resolved"], false);
    assert!(unresolved["latitude"].is_null());

    let embedded = &value["waypoints"][0];
    assert_eq!(embedded["latitude"], 40.0);
    assert_eq!(embedded["method"], "embedded");
    assert_eq!(value["type"], "SID");
    Ok(())
}

#[tokio::test]
async fn test_fallback_distance_is_configurable() -> Result<()> {
    let (_root, manager) =
        loaded_manager(ManagerConfig::default().with_max_fallback_distance_nm(2.0)).await?;

    let procedures = manager.procedures_for_airport("KAAA").await?;
    let sid = &procedures.sids[0];

    // XYZ sits about 7.5 nm from the airport
    assert!(!sid.waypoints[2].is_resolved());
    assert_eq!(sid.stats.resolved, 2);
    Ok(())
}

#[tokio::test]
async fn test_airport_without_procedure_file() -> Result<()> {
    let (_root, manager) = loaded_manager(ManagerConfig::default()).await?;

    let procedures = manager.procedures_for_airport("KBBB").await?;
    assert_eq!(procedures.icao, "KBBB");
    assert_eq!(procedures.all().count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_custom_procedures_override_default() -> Result<()> {
    let (root, manager) = loaded_manager(ManagerConfig::default()).await?;
    write_json(
        &custom_dir(root.path()),
        "CIFP/KAAA.json",
        &json!([{ "type": "STAR", "name": "CUST1", "waypoints": [leg("FIXB", "K1")] }]),
    )?;

    let procedures = manager.procedures_for_airport("KAAA").await?;
    assert!(procedures.sids.is_empty());
    assert_eq!(procedures.stars[0].name, "CUST1");
    Ok(())
}

#[tokio::test]
async fn test_procedure_errors() -> Result<()> {
    let unset = NavDataManager::default();
    assert!(matches!(
        unset.procedures_for_airport("KAAA").await,
        Err(DataError::RootNotSet)
    ));

    let (root, manager) = loaded_manager(ManagerConfig::default()).await?;
    assert!(matches!(
        manager.procedures_for_airport("../KAAA").await,
        Err(DataError::Query(QueryError::InvalidIcao(_)))
    ));

    fs::write(default_dir(root.path()).join("CIFP").join("KBAD.json"), "{ not json")?;
    assert!(matches!(
        manager.procedures_for_airport("KBAD").await,
        Err(DataError::Parse { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_bare_id_resolves_to_fix_near_airport() -> Result<()> {
    use xplane_navdata::utils::navigation::position_bearing_distance;

    let root = tempfile::TempDir::new()?;
    let dir = default_dir(root.path());
    let abc_k1 = (38.0, -97.0);
    let abc_k2 = position_bearing_distance(abc_k1.0, abc_k1.1, 90.0, 500.0);
    let airport = position_bearing_distance(abc_k1.0, abc_k1.1, 0.0, 10.0);

    write_json(
        &dir,
        "airports.json",
        &json!([{ "icao": "KABC", "name": "Abc Regional", "latitude": airport.0, "longitude": airport.1 }]),
    )?;
    write_json(
        &dir,
        "navaids.json",
        &json!([
            common::navaid("ABC", "K2", "VOR", abc_k2.0, abc_k2.1),
            common::navaid("ABC", "K1", "VOR", abc_k1.0, abc_k1.1)
        ]),
    )?;
    write_json(
        &dir,
        "CIFP/KABC.json",
        &json!([{
            "type": "STAR", "name": "ABC1",
            "waypoints": [leg("ABC", ""), leg("ABC", "K2")]
        }]),
    )?;

    let manager = NavDataManager::new(ManagerConfig::default().with_max_fallback_distance_nm(50.0));
    manager.load_all(root.path()).await?;

    let procedures = manager.procedures_for_airport("KABC").await?;
    let star = &procedures.stars[0];

    assert!(near(star.waypoints[0].coordinates(), abc_k1));
    assert_eq!(star.waypoints[0].method(), Some(ResolutionMethod::NearestFallback));
    // An explicit region always wins over proximity
    assert!(near(star.waypoints[1].coordinates(), abc_k2));
    assert_eq!(star.waypoints[1].method(), Some(ResolutionMethod::Qualified));
    Ok(())
}
