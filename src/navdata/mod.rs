pub mod airport_store;
pub mod collection;
pub mod fix_index;
pub mod loader;
pub mod procedure;
pub mod provenance;
pub mod resolver;
pub mod spatial;
pub mod status;
pub mod types;

pub use airport_store::{AirportStore, JsonFileAirportStore, MemoryAirportStore, SourceFingerprint};
pub use fix_index::FixIndex;
pub use loader::{DatasetLoaders, JsonLoader, JsonProcedureParser, Loaded, Loader, ProcedureParser};
pub use procedure::{
    AirportProcedures, AltitudeConstraint, ParsedProcedures, Procedure, ProcedureKind,
    ProcedureWaypoint, ResolutionMethod, ResolutionStats, ResolvedProcedure,
    ResolvedProcedureWaypoint,
};
pub use provenance::{DataSource, DirectoryProvenanceDetector, Provenance, ProvenanceDetector, SourceInfo};
pub use resolver::ProcedureResolver;
pub use spatial::{BoundingBox, RadiusQuery};
pub use status::{Category, CategoryStatus, DataLoadStatus, LoadState, NavaidStatus};
pub use types::{
    Airport, AirportMetadata, Airspace, AirwaySegment, AirwaySegmentWithCoords, AtcController,
    ControllerRole, Coordinates, GeoPoint, HoldingPattern, Navaid, NavaidType, Waypoint,
};
