use regex::Regex;
use std::io::ErrorKind;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use super::NavDataManager;
use crate::error::{DataError, DataResult, QueryError};
use crate::navdata::provenance::{self, DataSource};
use crate::navdata::{AirportProcedures, ParsedProcedures, ProcedureResolver};

fn icao_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9]{3,7}$").unwrap())
}

/// Uppercased identifier, or `InvalidIcao` when it could name a path outside
/// the procedure directory
fn normalize_icao(icao: &str) -> Result<String, QueryError> {
    let icao = icao.trim().to_ascii_uppercase();
    if icao_pattern().is_match(&icao) {
        Ok(icao)
    } else {
        Err(QueryError::InvalidIcao(icao))
    }
}

impl NavDataManager {
    /// Parse and resolve every SID, STAR and approach for one airport.
    ///
    /// Procedures are read on demand and never cached. An airport without a
    /// procedure file yields an empty set, not an error.
    pub async fn procedures_for_airport(&self, icao: &str) -> DataResult<AirportProcedures> {
        let icao = normalize_icao(icao)?;
        let root = self.require_root()?;

        let source = provenance::procedure_file(&root, &icao);
        if source.source == DataSource::Missing {
            debug!("[DATA MANAGER] No procedure file for {}", icao);
            return Ok(AirportProcedures { icao, ..Default::default() });
        }

        let contents = match tokio::fs::read_to_string(&source.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(AirportProcedures { icao, ..Default::default() })
            }
            Err(e) => return Err(DataError::Io(e)),
        };

        let parsed = self
            .procedure_parser
            .parse(&contents, &icao)
            .map_err(|source| DataError::Parse { icao: icao.clone(), source })?;

        Ok(self.resolve_procedures(&icao, &parsed))
    }

    /// Resolve already-parsed procedures against the current fix index, using
    /// the airport's own position as the fallback anchor
    pub fn resolve_procedures(&self, icao: &str, parsed: &ParsedProcedures) -> AirportProcedures {
        let anchor = self.airport_coordinates(icao);
        if anchor.is_none() {
            warn!(
                "[DATA MANAGER] Airport {} not in store; bare-id fallback limited to unique fixes",
                icao
            );
        }

        let index = self.fix_index();
        let resolver = ProcedureResolver::new(&index, anchor, self.config.max_fallback_distance_nm);

        let procedures = AirportProcedures {
            icao: icao.to_string(),
            sids: parsed.sids.iter().map(|p| resolver.resolve_procedure(p)).collect(),
            stars: parsed.stars.iter().map(|p| resolver.resolve_procedure(p)).collect(),
            approaches: parsed.approaches.iter().map(|p| resolver.resolve_procedure(p)).collect(),
        };

        let (resolved, total) = procedures
            .all()
            .fold((0, 0), |(r, t), p| (r + p.stats.resolved, t + p.stats.total));
        info!(
            "[DATA MANAGER] {}: {} SIDs, {} STARs, {} approaches, {}/{} waypoints resolved",
            icao,
            procedures.sids.len(),
            procedures.stars.len(),
            procedures.approaches.len(),
            resolved,
            total
        );

        procedures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icao_normalization() {
        assert_eq!(normalize_icao(" kjfk "), Ok("KJFK".to_string()));
        assert_eq!(normalize_icao("5N7"), Ok("5N7".to_string()));
        assert!(normalize_icao("../etc").is_err());
        assert_eq!(normalize_icao("xkjfk01"), Ok("XKJFK01".to_string()));
        assert!(normalize_icao("KJFK0123").is_err());
        assert!(normalize_icao("K/JFK").is_err());
        assert!(normalize_icao("").is_err());
    }
}
