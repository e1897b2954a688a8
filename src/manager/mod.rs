//! The navigation data manager.
//!
//! Owns every in-memory collection, drives loading with per-category failure
//! isolation and answers queries. Construct one explicitly and share it by
//! `Arc`; there is no global instance.

mod loading;
mod procedures;
mod queries;

pub use queries::{SearchCategory, SearchResult};

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::config::ManagerConfig;
use crate::error::{DataError, DataResult};
use crate::navdata::collection::Collection;
use crate::navdata::provenance::{self, DirectoryProvenanceDetector, Provenance, ProvenanceDetector};
use crate::navdata::{
    AirportMetadata, AirportStore, Airspace, AirwaySegment, AtcController, Category, CategoryStatus,
    DataLoadStatus, DatasetLoaders, FixIndex, HoldingPattern, JsonProcedureParser, LoadState,
    MemoryAirportStore, Navaid, NavaidStatus, ProcedureParser, Waypoint,
};

/// Load bookkeeping for airports, whose records live in the airport store
#[derive(Debug, Default)]
struct StoreStatus {
    state: LoadState,
    source: Option<PathBuf>,
    loaded_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

pub struct NavDataManager {
    config: ManagerConfig,
    loaders: DatasetLoaders,
    airport_store: Arc<dyn AirportStore>,
    provenance_detector: Arc<dyn ProvenanceDetector>,
    procedure_parser: Arc<dyn ProcedureParser>,

    dataset_root: RwLock<Option<PathBuf>>,
    provenance: RwLock<Provenance>,

    airports: RwLock<StoreStatus>,
    navaids: Collection<Navaid>,
    waypoints: Collection<Waypoint>,
    airspaces: Collection<Airspace>,
    airways: Collection<AirwaySegment>,
    atc: Collection<AtcController>,
    holds: Collection<HoldingPattern>,
    airport_metadata: Collection<AirportMetadata>,

    /// Bumped on every navaid/waypoint swap; keys the cached fix index
    nav_generation: AtomicU64,
    fix_index_cache: RwLock<Option<(u64, Arc<FixIndex>)>>,
}

impl NavDataManager {
    /// JSON loaders, an in-memory airport store and directory-based provenance
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            loaders: DatasetLoaders::json(),
            airport_store: Arc::new(MemoryAirportStore::new()),
            provenance_detector: Arc::new(DirectoryProvenanceDetector),
            procedure_parser: Arc::new(JsonProcedureParser),
            dataset_root: RwLock::new(None),
            provenance: RwLock::new(Provenance::default()),
            airports: RwLock::new(StoreStatus::default()),
            navaids: Collection::new(),
            waypoints: Collection::new(),
            airspaces: Collection::new(),
            airways: Collection::new(),
            atc: Collection::new(),
            holds: Collection::new(),
            airport_metadata: Collection::new(),
            nav_generation: AtomicU64::new(0),
            fix_index_cache: RwLock::new(None),
        }
    }

    pub fn with_loaders(mut self, loaders: DatasetLoaders) -> Self {
        self.loaders = loaders;
        self
    }

    pub fn with_airport_store(mut self, store: Arc<dyn AirportStore>) -> Self {
        self.airport_store = store;
        self
    }

    pub fn with_provenance_detector(mut self, detector: Arc<dyn ProvenanceDetector>) -> Self {
        self.provenance_detector = detector;
        self
    }

    pub fn with_procedure_parser(mut self, parser: Arc<dyn ProcedureParser>) -> Self {
        self.procedure_parser = parser;
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn dataset_root(&self) -> Option<PathBuf> {
        self.dataset_root.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Set the root used by the single-category loads without loading anything
    pub fn set_dataset_root<P: AsRef<Path>>(&self, root: P) -> DataResult<()> {
        let root = root.as_ref();
        provenance::validate_root(root)?;
        *self.dataset_root.write().unwrap_or_else(PoisonError::into_inner) = Some(root.to_path_buf());
        Ok(())
    }

    fn require_root(&self) -> DataResult<PathBuf> {
        self.dataset_root().ok_or(DataError::RootNotSet)
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn category_state(&self, category: Category) -> LoadState {
        match category {
            Category::Airports => self.airports.read().unwrap_or_else(PoisonError::into_inner).state,
            Category::Navaids => self.navaids.state(),
            Category::Waypoints => self.waypoints.state(),
            Category::Airspaces => self.airspaces.state(),
            Category::Airways => self.airways.state(),
            Category::Atc => self.atc.state(),
            Category::Holds => self.holds.state(),
            Category::AirportMetadata => self.airport_metadata.state(),
        }
    }

    pub fn is_loaded(&self, category: Category) -> bool {
        self.category_state(category) == LoadState::Loaded
    }

    fn airport_status(&self) -> CategoryStatus {
        let status = self.airports.read().unwrap_or_else(PoisonError::into_inner);
        CategoryStatus {
            loaded: status.state == LoadState::Loaded,
            count: self.airport_store.count(),
            source: status.source.clone(),
            loaded_at: status.loaded_at,
            error: status.error.clone(),
        }
    }

    pub fn status(&self) -> DataLoadStatus {
        DataLoadStatus {
            dataset_root: self.dataset_root(),
            airports: self.airport_status(),
            navaids: NavaidStatus {
                status: self.navaids.status(),
                by_type: self.navaid_counts_by_type(),
            },
            waypoints: self.waypoints.status(),
            airspaces: self.airspaces.status(),
            airways: self.airways.status(),
            atc: self.atc.optional_status(),
            holds: self.holds.optional_status(),
            airport_metadata: self.airport_metadata.optional_status(),
            provenance: self.provenance(),
        }
    }

    pub fn navaid_counts_by_type(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for navaid in self.navaids.snapshot().iter() {
            *counts.entry(navaid.navaid_type.to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn airport_count(&self) -> usize {
        self.airport_store.count()
    }

    pub fn navaid_count(&self) -> usize {
        self.navaids.len()
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn airspace_count(&self) -> usize {
        self.airspaces.len()
    }

    pub fn airway_count(&self) -> usize {
        self.airways.len()
    }

    pub fn atc_count(&self) -> usize {
        self.atc.len()
    }

    pub fn hold_count(&self) -> usize {
        self.holds.len()
    }

    pub fn airport_metadata_count(&self) -> usize {
        self.airport_metadata.len()
    }

    /// Fix index over the current waypoints and navaids, rebuilt only when
    /// either collection has been swapped since the last build
    pub fn fix_index(&self) -> Arc<FixIndex> {
        let generation = self.nav_generation.load(Ordering::Acquire);
        if let Some((built_for, index)) =
            &*self.fix_index_cache.read().unwrap_or_else(PoisonError::into_inner)
        {
            if *built_for == generation {
                return Arc::clone(index);
            }
        }

        let index = Arc::new(FixIndex::build(&self.waypoints.snapshot(), &self.navaids.snapshot()));
        debug!(
            "[DATA MANAGER] Built fix index: {} qualified, {} bare ids (generation {})",
            index.qualified_len(),
            index.bare_len(),
            generation
        );
        *self.fix_index_cache.write().unwrap_or_else(PoisonError::into_inner) =
            Some((generation, Arc::clone(&index)));
        index
    }

    fn invalidate_fix_index(&self) {
        self.nav_generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Drop every collection and the airport store. Every category returns to
    /// `Unloaded`; the dataset root is kept.
    pub fn clear(&self) -> DataResult<()> {
        self.navaids.clear();
        self.waypoints.clear();
        self.airspaces.clear();
        self.airways.clear();
        self.atc.clear();
        self.holds.clear();
        self.airport_metadata.clear();
        *self.airports.write().unwrap_or_else(PoisonError::into_inner) = StoreStatus::default();
        *self.provenance.write().unwrap_or_else(PoisonError::into_inner) = Provenance::default();
        self.invalidate_fix_index();
        *self.fix_index_cache.write().unwrap_or_else(PoisonError::into_inner) = None;

        self.airport_store
            .clear()
            .map_err(|e| DataError::AirportStore(format!("{:#}", e)))?;

        info!("[DATA MANAGER] Cleared all navigation data");
        Ok(())
    }
}

impl Default for NavDataManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}
