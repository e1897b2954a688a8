use std::path::PathBuf;
use thiserror::Error;

use crate::navdata::Category;

/// Malformed query input. Kept separate from "nothing nearby" so an empty
/// result always means no records matched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("radius must not be negative (got {0} nm)")]
    NegativeRadius(f64),

    #[error("query parameter `{0}` is not a finite number")]
    NonFiniteInput(&'static str),

    #[error("latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),

    #[error("unknown navaid type filter: {0}")]
    UnknownNavaidType(String),

    #[error("navaid type filter is empty")]
    EmptyTypeFilter,

    #[error("search text is empty")]
    EmptySearch,

    #[error("result limit must be at least 1")]
    ZeroLimit,

    #[error("invalid airport identifier: {0:?}")]
    InvalidIcao(String),
}

/// Errors surfaced by the data manager.
///
/// Per-category failures inside `load_all` never escape as a `DataError`;
/// they are recorded in the status snapshot instead.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("dataset root does not exist or is not a directory: {0}")]
    InvalidRoot(PathBuf),

    #[error("dataset root {0} contains neither `Custom Data` nor `Resources/default data`")]
    MissingDataDirectories(PathBuf),

    #[error("no dataset root set; call load_all or set_dataset_root first")]
    RootNotSet,

    #[error("failed to load {category}: {source:#}")]
    Load {
        category: Category,
        #[source]
        source: anyhow::Error,
    },

    #[error("{category} source not found: {}", path.display())]
    SourceMissing { category: Category, path: PathBuf },

    #[error("{0} is not supported by the configured loaders")]
    Unsupported(Category),

    #[error("{category} loader task did not complete: {reason}")]
    TaskFailed { category: Category, reason: String },

    #[error("failed to parse procedures for {icao}: {source:#}")]
    Parse {
        icao: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("airport store error: {0}")]
    AirportStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DataResult<T> = std::result::Result<T, DataError>;
