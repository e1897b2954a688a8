//! Aeronautical data manager for X-Plane style datasets.
//!
//! Loads airports, navaids, waypoints, airspaces, airways and the optional
//! ATC, holding and airport metadata tables in parallel, then answers radius,
//! search and procedure queries over the in-memory collections.

pub mod config;
pub mod error;
pub mod manager;
pub mod navdata;
pub mod utils;

pub use config::ManagerConfig;
pub use error::{DataError, DataResult, QueryError};
pub use manager::{NavDataManager, SearchCategory, SearchResult};
