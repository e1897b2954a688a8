//! Turns symbolic procedure waypoints into coordinates.
//!
//! Order of preference per waypoint: coordinates embedded in the record, the
//! `(id, region)` key, then the bare id restricted to candidates near the
//! anchor airport. Anything else stays unresolved and carries no position.

use tracing::debug;

use super::fix_index::FixIndex;
use super::procedure::{
    Procedure, ProcedureWaypoint, ResolutionMethod, ResolutionStats, ResolvedProcedure,
    ResolvedProcedureWaypoint,
};
use super::types::Coordinates;
use crate::utils::navigation::haversine_nm;

/// Candidates closer than this are one physical fix listed twice
/// (a VOR and its co-located DME, say).
const COLOCATED_NM: f64 = 1.0;

/// Stateless between procedures; reads the index snapshot it is given
#[derive(Debug, Clone, Copy)]
pub struct ProcedureResolver<'a> {
    index: &'a FixIndex,
    anchor: Option<Coordinates>,
    max_fallback_distance_nm: f64,
}

impl<'a> ProcedureResolver<'a> {
    pub fn new(index: &'a FixIndex, anchor: Option<Coordinates>, max_fallback_distance_nm: f64) -> Self {
        Self { index, anchor, max_fallback_distance_nm }
    }

    pub fn resolve_procedure(&self, procedure: &Procedure) -> ResolvedProcedure {
        let (waypoints, stats) = self.resolve_waypoints(&procedure.waypoints);

        debug!(
            "[RESOLVER] {} {}{}: {}/{} waypoints resolved ({:.0}%)",
            procedure.kind.as_str(),
            procedure.name,
            procedure.runway.as_deref().map(|r| format!(" RW{}", r)).unwrap_or_default(),
            stats.resolved,
            stats.total,
            stats.percentage()
        );

        ResolvedProcedure {
            kind: procedure.kind,
            name: procedure.name.clone(),
            runway: procedure.runway.clone(),
            transition: procedure.transition.clone(),
            waypoints,
            stats,
        }
    }

    /// Resolves in sequence, preserving order
    pub fn resolve_waypoints(
        &self,
        waypoints: &[ProcedureWaypoint],
    ) -> (Vec<ResolvedProcedureWaypoint>, ResolutionStats) {
        let resolved: Vec<_> = waypoints.iter().map(|wp| self.resolve_waypoint(wp)).collect();
        let stats = ResolutionStats {
            resolved: resolved.iter().filter(|wp| wp.is_resolved()).count(),
            total: resolved.len(),
        };
        (resolved, stats)
    }

    pub fn resolve_waypoint(&self, waypoint: &ProcedureWaypoint) -> ResolvedProcedureWaypoint {
        if let Some(at) = waypoint.embedded_coordinates() {
            return ResolvedProcedureWaypoint::resolved(waypoint.clone(), at, ResolutionMethod::Embedded);
        }

        if let Some(at) = self.index.resolve(&waypoint.fix_id, Some(&waypoint.fix_region)) {
            return ResolvedProcedureWaypoint::resolved(waypoint.clone(), at, ResolutionMethod::Qualified);
        }

        match self.nearest_fallback(&waypoint.fix_id) {
            Some(at) => ResolvedProcedureWaypoint::resolved(
                waypoint.clone(),
                at,
                ResolutionMethod::NearestFallback,
            ),
            None => {
                debug!(
                    "[RESOLVER] Could not resolve {} (region {:?}, type {:?})",
                    waypoint.fix_id, waypoint.fix_region, waypoint.fix_type
                );
                ResolvedProcedureWaypoint::unresolved(waypoint.clone())
            }
        }
    }

    /// Bare-id fallback. Accepts only a single distinct candidate: within the
    /// distance gate of the anchor when one is known, otherwise worldwide.
    fn nearest_fallback(&self, fix_id: &str) -> Option<Coordinates> {
        let candidates = self.index.candidates(fix_id);

        let mut gated: Vec<(f64, Coordinates)> = match self.anchor {
            Some(anchor) => candidates
                .iter()
                .map(|c| (haversine_nm(anchor.lat, anchor.lon, c.lat, c.lon), *c))
                .filter(|(distance, _)| *distance <= self.max_fallback_distance_nm)
                .collect(),
            None => candidates.iter().map(|c| (0.0, *c)).collect(),
        };
        gated.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (_, nearest) = *gated.first()?;
        let single_fix = gated
            .iter()
            .all(|(_, c)| haversine_nm(nearest.lat, nearest.lon, c.lat, c.lon) < COLOCATED_NM);

        if single_fix {
            Some(nearest)
        } else {
            debug!(
                "[RESOLVER] {} is ambiguous: {} candidates pass the fallback gate",
                fix_id,
                gated.len()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navdata::procedure::ProcedureKind;
    use crate::navdata::types::{Navaid, NavaidType, Waypoint};
    use crate::utils::navigation::position_bearing_distance;

    fn waypoint(id: &str, region: &str, at: (f64, f64)) -> Waypoint {
        Waypoint {
            id: id.to_string(),
            region: region.to_string(),
            latitude: at.0,
            longitude: at.1,
            description: None,
        }
    }

    fn ndb(id: &str, region: &str, at: (f64, f64)) -> Navaid {
        Navaid {
            id: id.to_string(),
            region: region.to_string(),
            name: id.to_string(),
            navaid_type: NavaidType::Ndb,
            latitude: at.0,
            longitude: at.1,
            frequency: Some(350.0),
            bearing: None,
            associated_airport: None,
            associated_runway: None,
        }
    }

    fn leg(id: &str, region: &str) -> ProcedureWaypoint {
        ProcedureWaypoint {
            fix_id: id.to_string(),
            fix_region: region.to_string(),
            fix_type: "E".to_string(),
            path_terminator: "TF".to_string(),
            course: None,
            distance: None,
            altitude: None,
            speed: None,
            turn_direction: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_embedded_coordinates_win() {
        let index = FixIndex::build(&[waypoint("EMB", "K1", (1.0, 1.0))], &[]);
        let resolver = ProcedureResolver::new(&index, None, 50.0);

        let mut wp = leg("EMB", "K1");
        wp.latitude = Some(9.0);
        wp.longitude = Some(9.0);

        let resolved = resolver.resolve_waypoint(&wp);
        assert_eq!(resolved.coordinates(), Some(Coordinates::new(9.0, 9.0)));
        assert_eq!(resolved.method(), Some(ResolutionMethod::Embedded));
    }

    #[test]
    fn test_qualified_lookup_matches_navaid_region() {
        let index = FixIndex::build(
            &[waypoint("ABC", "K1", (30.0, -90.0))],
            &[ndb("ABC", "K2", (35.0, -95.0))],
        );
        let resolver = ProcedureResolver::new(&index, None, 50.0);

        let resolved = resolver.resolve_waypoint(&leg("ABC", "K2"));
        assert_eq!(resolved.coordinates(), Some(Coordinates::new(35.0, -95.0)));
        assert_eq!(resolved.method(), Some(ResolutionMethod::Qualified));
    }

    #[test]
    fn test_fallback_picks_candidate_near_anchor() {
        let anchor = (40.0, -100.0);
        let near = position_bearing_distance(anchor.0, anchor.1, 90.0, 20.0);
        let far = position_bearing_distance(anchor.0, anchor.1, 270.0, 2000.0);
        // The far fix is inserted first and so owns the bare slot
        let index = FixIndex::build(&[waypoint("DUP", "AA", far), waypoint("DUP", "BB", near)], &[]);

        let resolver = ProcedureResolver::new(&index, Some(Coordinates::new(anchor.0, anchor.1)), 500.0);
        let resolved = resolver.resolve_waypoint(&leg("DUP", "ZZ"));

        assert_eq!(resolved.coordinates(), Some(Coordinates::new(near.0, near.1)));
        assert_eq!(resolved.method(), Some(ResolutionMethod::NearestFallback));
    }

    #[test]
    fn test_fallback_gate_rejects_distant_candidates() {
        let anchor = Coordinates::new(0.0, 0.0);
        let a = position_bearing_distance(0.0, 0.0, 0.0, 1000.0);
        let b = position_bearing_distance(0.0, 0.0, 180.0, 1000.0);
        let index = FixIndex::build(&[waypoint("FAR", "AA", a), waypoint("FAR", "BB", b)], &[]);

        let resolver = ProcedureResolver::new(&index, Some(anchor), 500.0);
        let resolved = resolver.resolve_waypoint(&leg("FAR", ""));

        assert!(!resolved.is_resolved());
        assert!(resolved.coordinates().is_none());
    }

    #[test]
    fn test_two_distinct_candidates_inside_gate_are_ambiguous() {
        let anchor = (50.0, 10.0);
        let a = position_bearing_distance(anchor.0, anchor.1, 0.0, 10.0);
        let b = position_bearing_distance(anchor.0, anchor.1, 180.0, 12.0);
        let index = FixIndex::build(&[waypoint("AMB", "AA", a), waypoint("AMB", "BB", b)], &[]);

        let resolver = ProcedureResolver::new(&index, Some(Coordinates::new(anchor.0, anchor.1)), 50.0);
        assert!(!resolver.resolve_waypoint(&leg("AMB", "")).is_resolved());
    }

    #[test]
    fn test_colocated_candidates_collapse() {
        let index = FixIndex::build(
            &[waypoint("VIC", "LI", (45.5, 9.0))],
            &[ndb("VIC", "LI", (45.5001, 9.0001))],
        );
        let resolver = ProcedureResolver::new(&index, Some(Coordinates::new(45.6, 9.1)), 30.0);
        assert!(resolver.resolve_waypoint(&leg("VIC", "")).is_resolved());
    }

    #[test]
    fn test_without_anchor_only_unique_ids_fall_back() {
        let index = FixIndex::build(
            &[
                waypoint("ONE", "AA", (10.0, 10.0)),
                waypoint("TWO", "AA", (20.0, 20.0)),
                waypoint("TWO", "BB", (-20.0, -20.0)),
            ],
            &[],
        );
        let resolver = ProcedureResolver::new(&index, None, 50.0);

        assert!(resolver.resolve_waypoint(&leg("ONE", "")).is_resolved());
        assert!(!resolver.resolve_waypoint(&leg("TWO", "")).is_resolved());
    }

    #[test]
    fn test_procedure_order_and_stats() {
        let index = FixIndex::build(
            &[waypoint("AAA", "K1", (1.0, 1.0)), waypoint("CCC", "K1", (1.2, 1.2))],
            &[],
        );
        let resolver = ProcedureResolver::new(&index, Some(Coordinates::new(1.1, 1.1)), 50.0);
        let procedure = Procedure {
            kind: ProcedureKind::Sid,
            name: "TEST1".to_string(),
            runway: Some("09".to_string()),
            transition: None,
            waypoints: vec![leg("AAA", "K1"), leg("BBB", "K1"), leg("CCC", "K1")],
        };

        let resolved = resolver.resolve_procedure(&procedure);
        let ids: Vec<_> = resolved.waypoints.iter().map(|w| w.waypoint().fix_id.as_str()).collect();

        assert_eq!(ids, vec!["AAA", "BBB", "CCC"]);
        assert_eq!(resolved.stats, ResolutionStats { resolved: 2, total: 3 });
        assert!(!resolved.waypoints[1].is_resolved());
    }
}
