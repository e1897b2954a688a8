//! Loader contracts consumed by the manager.
//!
//! Scenery file grammars are out of scope here; the default implementations
//! read JSON extracts of each table.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use super::procedure::{ParsedProcedures, Procedure, ProcedureKind};
use super::types::{
    Airport, AirportMetadata, Airspace, AirwaySegment, AtcController, HoldingPattern, Navaid,
    Waypoint,
};

/// Records produced by one loader call. `loaded` is false when the source
/// file does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub loaded: bool,
}

impl<T> Loaded<T> {
    pub fn found(records: Vec<T>) -> Self {
        Self { records, loaded: true }
    }

    pub fn absent() -> Self {
        Self { records: Vec::new(), loaded: false }
    }
}

/// Turns one category's source file into typed records.
///
/// A missing file is `Ok(Loaded::absent())`, never an error. Loaders run on
/// the blocking pool, so plain synchronous I/O is expected.
pub trait Loader<T>: Send + Sync {
    fn load(&self, path: &Path) -> Result<Loaded<T>>;
}

impl<T, F> Loader<T> for F
where
    F: Fn(&Path) -> Result<Loaded<T>> + Send + Sync,
{
    fn load(&self, path: &Path) -> Result<Loaded<T>> {
        self(path)
    }
}

/// Reads a JSON array of records
pub struct JsonLoader<T> {
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonLoader<T> {
    pub fn new() -> Self {
        Self { _record: PhantomData }
    }
}

impl<T> Default for JsonLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Loader<T> for JsonLoader<T> {
    fn load(&self, path: &Path) -> Result<Loaded<T>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Loaded::absent()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let records: Vec<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Loaded::found(records))
    }
}

/// Parses one airport's coded procedures
pub trait ProcedureParser: Send + Sync {
    fn parse(&self, contents: &str, icao: &str) -> Result<ParsedProcedures>;
}

/// Reads a JSON array of procedures and splits it by kind
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonProcedureParser;

impl ProcedureParser for JsonProcedureParser {
    fn parse(&self, contents: &str, icao: &str) -> Result<ParsedProcedures> {
        let procedures: Vec<Procedure> = serde_json::from_str(contents)
            .with_context(|| format!("Failed to parse procedures for {}", icao))?;

        let mut parsed = ParsedProcedures::default();
        for procedure in procedures {
            match procedure.kind {
                ProcedureKind::Sid => parsed.sids.push(procedure),
                ProcedureKind::Star => parsed.stars.push(procedure),
                ProcedureKind::Approach => parsed.approaches.push(procedure),
            }
        }
        Ok(parsed)
    }
}

/// One loader per category. Optional categories may be left out, in which
/// case their status stays `None`.
#[derive(Clone)]
pub struct DatasetLoaders {
    pub airports: Arc<dyn Loader<Airport>>,
    pub navaids: Arc<dyn Loader<Navaid>>,
    pub waypoints: Arc<dyn Loader<Waypoint>>,
    pub airspaces: Arc<dyn Loader<Airspace>>,
    pub airways: Arc<dyn Loader<AirwaySegment>>,
    pub atc: Option<Arc<dyn Loader<AtcController>>>,
    pub holds: Option<Arc<dyn Loader<HoldingPattern>>>,
    pub airport_metadata: Option<Arc<dyn Loader<AirportMetadata>>>,
}

impl DatasetLoaders {
    /// JSON loaders for every category
    pub fn json() -> Self {
        Self {
            airports: Arc::new(JsonLoader::<Airport>::new()),
            navaids: Arc::new(JsonLoader::<Navaid>::new()),
            waypoints: Arc::new(JsonLoader::<Waypoint>::new()),
            airspaces: Arc::new(JsonLoader::<Airspace>::new()),
            airways: Arc::new(JsonLoader::<AirwaySegment>::new()),
            atc: Some(Arc::new(JsonLoader::<AtcController>::new())),
            holds: Some(Arc::new(JsonLoader::<HoldingPattern>::new())),
            airport_metadata: Some(Arc::new(JsonLoader::<AirportMetadata>::new())),
        }
    }

    pub fn with_navaids(mut self, loader: impl Loader<Navaid> + 'static) -> Self {
        self.navaids = Arc::new(loader);
        self
    }

    pub fn with_waypoints(mut self, loader: impl Loader<Waypoint> + 'static) -> Self {
        self.waypoints = Arc::new(loader);
        self
    }

    pub fn with_airports(mut self, loader: impl Loader<Airport> + 'static) -> Self {
        self.airports = Arc::new(loader);
        self
    }

    pub fn with_airspaces(mut self, loader: impl Loader<Airspace> + 'static) -> Self {
        self.airspaces = Arc::new(loader);
        self
    }

    pub fn with_airways(mut self, loader: impl Loader<AirwaySegment> + 'static) -> Self {
        self.airways = Arc::new(loader);
        self
    }

    pub fn without_optional(mut self) -> Self {
        self.atc = None;
        self.holds = None;
        self.airport_metadata = None;
        self
    }
}

impl Default for DatasetLoaders {
    fn default() -> Self {
        Self::json()
    }
}
