//! Airport lookup store keyed by ICAO code.
//!
//! Airports are not held in the manager's own collections. The store can be
//! persisted; a [`SourceFingerprint`] of the airport source file decides
//! whether the persisted copy is still current.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use super::types::Airport;

/// Identity of an airport source file at the time it was read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
    pub size: u64,
}

impl SourceFingerprint {
    /// `None` when the file cannot be inspected
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            path: path.to_path_buf(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            size: metadata.len(),
        })
    }
}

pub trait AirportStore: Send + Sync {
    /// Case-insensitive lookup
    fn get(&self, icao: &str) -> Option<Airport>;

    fn replace_all(&self, airports: Vec<Airport>, fingerprint: Option<SourceFingerprint>) -> Result<()>;

    fn count(&self) -> usize;

    fn clear(&self) -> Result<()>;

    /// True when the stored airports were built from exactly this source
    fn is_fresh(&self, fingerprint: &SourceFingerprint) -> bool;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreContents {
    fingerprint: Option<SourceFingerprint>,
    airports: HashMap<String, Airport>,
}

impl StoreContents {
    fn from_airports(airports: Vec<Airport>, fingerprint: Option<SourceFingerprint>) -> Self {
        let airports = airports
            .into_iter()
            .map(|a| (a.icao.to_uppercase(), a))
            .collect();
        Self { fingerprint, airports }
    }
}

/// In-process store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryAirportStore {
    contents: RwLock<StoreContents>,
}

impl MemoryAirportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AirportStore for MemoryAirportStore {
    fn get(&self, icao: &str) -> Option<Airport> {
        let contents = self.contents.read().unwrap_or_else(PoisonError::into_inner);
        contents.airports.get(&icao.to_uppercase()).cloned()
    }

    fn replace_all(&self, airports: Vec<Airport>, fingerprint: Option<SourceFingerprint>) -> Result<()> {
        let fresh = StoreContents::from_airports(airports, fingerprint);
        *self.contents.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        Ok(())
    }

    fn count(&self) -> usize {
        self.contents.read().unwrap_or_else(PoisonError::into_inner).airports.len()
    }

    fn clear(&self) -> Result<()> {
        *self.contents.write().unwrap_or_else(PoisonError::into_inner) = StoreContents::default();
        Ok(())
    }

    fn is_fresh(&self, fingerprint: &SourceFingerprint) -> bool {
        let contents = self.contents.read().unwrap_or_else(PoisonError::into_inner);
        contents.fingerprint.as_ref() == Some(fingerprint)
    }
}

/// Store persisted as one JSON document, rewritten on every replace
#[derive(Debug)]
pub struct JsonFileAirportStore {
    path: PathBuf,
    contents: RwLock<StoreContents>,
}

impl JsonFileAirportStore {
    /// Opens the store, reading any previously persisted airports
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let contents = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read airport store: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse airport store: {}", path.display()))?
        } else {
            StoreContents::default()
        };

        tracing::debug!(
            "[AIRPORT STORE] Opened {} with {} airports",
            path.display(),
            contents.airports.len()
        );

        Ok(Self { path, contents: RwLock::new(contents) })
    }

    fn persist(&self, contents: &StoreContents) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string(contents)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write airport store: {}", self.path.display()))?;
        Ok(())
    }
}

impl AirportStore for JsonFileAirportStore {
    fn get(&self, icao: &str) -> Option<Airport> {
        let contents = self.contents.read().unwrap_or_else(PoisonError::into_inner);
        contents.airports.get(&icao.to_uppercase()).cloned()
    }

    fn replace_all(&self, airports: Vec<Airport>, fingerprint: Option<SourceFingerprint>) -> Result<()> {
        let fresh = StoreContents::from_airports(airports, fingerprint);
        self.persist(&fresh)?;
        *self.contents.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        Ok(())
    }

    fn count(&self) -> usize {
        self.contents.read().unwrap_or_else(PoisonError::into_inner).airports.len()
    }

    fn clear(&self) -> Result<()> {
        let empty = StoreContents::default();
        self.persist(&empty)?;
        *self.contents.write().unwrap_or_else(PoisonError::into_inner) = empty;
        Ok(())
    }

    fn is_fresh(&self, fingerprint: &SourceFingerprint) -> bool {
        let contents = self.contents.read().unwrap_or_else(PoisonError::into_inner);
        contents.fingerprint.as_ref() == Some(fingerprint)
    }
}
