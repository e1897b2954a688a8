use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use tracing::{error, info, warn};

use super::{NavDataManager, StoreStatus};
use crate::error::{DataError, DataResult};
use crate::navdata::collection::Collection;
use crate::navdata::provenance::{self, DataSource};
use crate::navdata::{Category, DataLoadStatus, LoadState, Loaded, Loader, SourceFingerprint};

/// Run one loader on the blocking pool. A panic inside the loader comes back
/// as a `JoinError` and only fails this category.
async fn run_loader<T: Send + 'static>(
    category: Category,
    loader: Arc<dyn Loader<T>>,
    path: PathBuf,
) -> DataResult<Loaded<T>> {
    match tokio::task::spawn_blocking(move || loader.load(&path)).await {
        Ok(Ok(loaded)) => Ok(loaded),
        Ok(Err(source)) => Err(DataError::Load { category, source }),
        Err(e) => Err(DataError::TaskFailed { category, reason: e.to_string() }),
    }
}

fn log_outcome(category: Category, outcome: &DataResult<usize>) {
    match outcome {
        Ok(count) => info!("[DATA MANAGER] {}: {} records", category, count),
        Err(e) => error!("[DATA MANAGER] Failed to load {}: {}", category, e),
    }
}

impl NavDataManager {
    /// Validate `root`, detect provenance, then load every category.
    ///
    /// Airports, navaids, waypoints, airspaces and airways load together;
    /// ATC, holding patterns and airport metadata follow, also together.
    /// A failing category is logged and shows up as `loaded: false` in the
    /// returned status; it never fails this call. Only an invalid root does.
    pub async fn load_all<P: AsRef<Path>>(&self, root: P) -> DataResult<DataLoadStatus> {
        let root = root.as_ref().to_path_buf();
        provenance::validate_root(&root)?;
        *self.dataset_root.write().unwrap_or_else(PoisonError::into_inner) = Some(root.clone());

        let detected = self.provenance_detector.detect(&root);
        for (category, info) in &detected.categories {
            if info.source == DataSource::Missing && !category.is_optional() {
                warn!("[DATA MANAGER] No {} data found under {}", category, root.display());
            }
        }
        if let Some(cycle) = &detected.cycle {
            info!(
                "[DATA MANAGER] Custom data cycle {} ({})",
                cycle,
                detected.provider.as_deref().unwrap_or("unknown provider")
            );
        }
        *self.provenance.write().unwrap_or_else(PoisonError::into_inner) = detected;

        info!("[DATA MANAGER] Loading navigation data from {}", root.display());

        let (airports, navaids, waypoints, airspaces, airways) = tokio::join!(
            self.load_airports(&root),
            self.load_collection(Category::Navaids, &self.navaids, &self.loaders.navaids, &root),
            self.load_collection(Category::Waypoints, &self.waypoints, &self.loaders.waypoints, &root),
            self.load_collection(Category::Airspaces, &self.airspaces, &self.loaders.airspaces, &root),
            self.load_collection(Category::Airways, &self.airways, &self.loaders.airways, &root),
        );

        for (category, outcome) in [
            (Category::Airports, airports),
            (Category::Navaids, navaids),
            (Category::Waypoints, waypoints),
            (Category::Airspaces, airspaces),
            (Category::Airways, airways),
        ] {
            log_outcome(category, &outcome);
        }

        if self.config.load_optional_categories {
            let (atc, holds, metadata) = tokio::join!(
                self.load_optional(Category::Atc, &self.atc, self.loaders.atc.as_ref(), &root),
                self.load_optional(Category::Holds, &self.holds, self.loaders.holds.as_ref(), &root),
                self.load_optional(
                    Category::AirportMetadata,
                    &self.airport_metadata,
                    self.loaders.airport_metadata.as_ref(),
                    &root
                ),
            );

            for (category, outcome) in [
                (Category::Atc, atc),
                (Category::Holds, holds),
                (Category::AirportMetadata, metadata),
            ] {
                match outcome {
                    Some(outcome) => log_outcome(category, &outcome),
                    None => info!("[DATA MANAGER] {} not supported by this dataset", category),
                }
            }
        }

        let status = self.status();
        info!(
            "[DATA MANAGER] Load complete: {} airports, {} navaids, {} waypoints, {} airspaces, {} airway segments",
            status.airports.count,
            status.navaids.status.count,
            status.waypoints.count,
            status.airspaces.count,
            status.airways.count
        );
        Ok(status)
    }

    /// Load one category into its collection, swapping only on success
    async fn load_collection<T: Send + Sync + 'static>(
        &self,
        category: Category,
        collection: &Collection<T>,
        loader: &Arc<dyn Loader<T>>,
        root: &Path,
    ) -> DataResult<usize> {
        let source = provenance::locate(root, Path::new(category.file_name()));
        let previous = collection.begin_load();

        match run_loader(category, Arc::clone(loader), source.path.clone()).await {
            Ok(loaded) if !loaded.loaded && previous == LoadState::Loaded => {
                // A vanished source never replaces records that loaded before
                let e = DataError::SourceMissing { category, path: source.path };
                warn!("[DATA MANAGER] Keeping previous {}: {}", category, e);
                collection.fail(previous, e.to_string());
                Err(e)
            }
            Ok(loaded) => {
                let count = loaded.records.len();
                if !loaded.loaded {
                    warn!("[DATA MANAGER] {} source not found: {}", category, source.path.display());
                }
                collection.install(loaded.records, source.path, loaded.loaded);
                if matches!(category, Category::Navaids | Category::Waypoints) {
                    self.invalidate_fix_index();
                }
                Ok(count)
            }
            Err(e) => {
                collection.fail(previous, e.to_string());
                Err(e)
            }
        }
    }

    async fn load_optional<T: Send + Sync + 'static>(
        &self,
        category: Category,
        collection: &Collection<T>,
        loader: Option<&Arc<dyn Loader<T>>>,
        root: &Path,
    ) -> Option<DataResult<usize>> {
        match loader {
            Some(loader) => Some(self.load_collection(category, collection, loader, root).await),
            None => None,
        }
    }

    /// Airports go to the airport store. A store already built from the same
    /// source file is reused as is.
    async fn load_airports(&self, root: &Path) -> DataResult<usize> {
        let source = provenance::locate(root, Path::new(Category::Airports.file_name()));
        let previous = {
            let mut status = self.airports.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut status.state, LoadState::Loading)
        };

        let fingerprint = SourceFingerprint::of(&source.path);
        if let Some(fingerprint) = &fingerprint {
            if self.airport_store.is_fresh(fingerprint) {
                let count = self.airport_store.count();
                info!("[DATA MANAGER] Airport store is up to date ({} airports)", count);
                self.finish_airports(source.path, true);
                return Ok(count);
            }
        }

        let outcome = match run_loader(Category::Airports, Arc::clone(&self.loaders.airports), source.path.clone()).await {
            Ok(loaded) if !loaded.loaded && previous == LoadState::Loaded => {
                warn!("[DATA MANAGER] Keeping previous airports: source not found: {}", source.path.display());
                Err(DataError::SourceMissing { category: Category::Airports, path: source.path.clone() })
            }
            Ok(loaded) => {
                let count = loaded.records.len();
                if !loaded.loaded {
                    warn!("[DATA MANAGER] airports source not found: {}", source.path.display());
                }
                let fingerprint = if loaded.loaded { fingerprint } else { None };
                self.airport_store
                    .replace_all(loaded.records, fingerprint)
                    .map(|_| (count, loaded.loaded))
                    .map_err(|e| DataError::AirportStore(format!("{:#}", e)))
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok((count, loaded)) => {
                self.finish_airports(source.path, loaded);
                Ok(count)
            }
            Err(e) => {
                let mut status = self.airports.write().unwrap_or_else(PoisonError::into_inner);
                status.state = match previous {
                    LoadState::Loading => LoadState::Unloaded,
                    other => other,
                };
                status.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn finish_airports(&self, source: PathBuf, loaded: bool) {
        *self.airports.write().unwrap_or_else(PoisonError::into_inner) = StoreStatus {
            state: if loaded { LoadState::Loaded } else { LoadState::Unloaded },
            source: Some(source),
            loaded_at: loaded.then(Utc::now),
            error: None,
        };
    }

    pub async fn load_airports_only(&self) -> DataResult<usize> {
        let root = self.require_root()?;
        self.load_airports(&root).await
    }

    pub async fn load_navaids_only(&self) -> DataResult<usize> {
        let root = self.require_root()?;
        self.load_collection(Category::Navaids, &self.navaids, &self.loaders.navaids, &root)
            .await
    }

    pub async fn load_waypoints_only(&self) -> DataResult<usize> {
        let root = self.require_root()?;
        self.load_collection(Category::Waypoints, &self.waypoints, &self.loaders.waypoints, &root)
            .await
    }

    pub async fn load_airspaces_only(&self) -> DataResult<usize> {
        let root = self.require_root()?;
        self.load_collection(Category::Airspaces, &self.airspaces, &self.loaders.airspaces, &root)
            .await
    }

    pub async fn load_airways_only(&self) -> DataResult<usize> {
        let root = self.require_root()?;
        self.load_collection(Category::Airways, &self.airways, &self.loaders.airways, &root)
            .await
    }

    pub async fn load_atc_only(&self) -> DataResult<usize> {
        let root = self.require_root()?;
        self.load_optional(Category::Atc, &self.atc, self.loaders.atc.as_ref(), &root)
            .await
            .unwrap_or(Err(DataError::Unsupported(Category::Atc)))
    }

    pub async fn load_holds_only(&self) -> DataResult<usize> {
        let root = self.require_root()?;
        self.load_optional(Category::Holds, &self.holds, self.loaders.holds.as_ref(), &root)
            .await
            .unwrap_or(Err(DataError::Unsupported(Category::Holds)))
    }

    pub async fn load_airport_metadata_only(&self) -> DataResult<usize> {
        let root = self.require_root()?;
        self.load_optional(
            Category::AirportMetadata,
            &self.airport_metadata,
            self.loaders.airport_metadata.as_ref(),
            &root,
        )
        .await
        .unwrap_or(Err(DataError::Unsupported(Category::AirportMetadata)))
    }

    /// Reload a single category. Unlike `load_all`, failures are returned.
    pub async fn load_category_only(&self, category: Category) -> DataResult<usize> {
        match category {
            Category::Airports => self.load_airports_only().await,
            Category::Navaids => self.load_navaids_only().await,
            Category::Waypoints => self.load_waypoints_only().await,
            Category::Airspaces => self.load_airspaces_only().await,
            Category::Airways => self.load_airways_only().await,
            Category::Atc => self.load_atc_only().await,
            Category::Holds => self.load_holds_only().await,
            Category::AirportMetadata => self.load_airport_metadata_only().await,
        }
    }
}
