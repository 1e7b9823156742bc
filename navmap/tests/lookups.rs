//! Integration tests for id, ident and relation lookups, the secondary
//! caches and connection reloads.
//!
//! Run with: `cargo test --test lookups`

mod common;

use std::sync::Arc;

use common::*;
use navmap::{KindMask, MapEntity, MapLayer, MapObjectKind, MapQuery, Pos, QueryConfig, Rect};

fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids
}

// ============================================================================
// Nearest
// ============================================================================

#[test]
fn test_nearest_uses_l1_distance() {
    let conn = empty_connection();
    // Euclidean would pick A, L1 picks B
    insert_vor(&conn, 1, "AAA", "ED", Pos::new(3.0, 3.0));
    insert_vor(&conn, 2, "BBB", "ED", Pos::new(5.0, 0.5));
    let mut query = MapQuery::new(counting(conn), QueryConfig::default());

    let nearest = query.nearest(MapObjectKind::Vor, &Pos::new(0.0, 0.0));

    match nearest {
        Some(MapEntity::Vor(vor)) => assert_eq!(vor.ident, "BBB"),
        other => panic!("expected a VOR, got {:?}", other),
    }
}

#[test]
fn test_nearest_unsupported_kind_or_empty_table() {
    let mut query = MapQuery::new(counting(empty_connection()), QueryConfig::default());
    let origin = Pos::new(0.0, 0.0);

    assert!(query.nearest(MapObjectKind::Airport, &origin).is_none());
    assert!(query.nearest(MapObjectKind::Airspace, &origin).is_none());
    assert_eq!(query.datastore().executions(), 1);
}

// ============================================================================
// By id
// ============================================================================

#[test]
fn test_entity_by_id() {
    let conn = empty_connection();
    insert_airport(&conn, 1, "EDDF", Pos::new(8.57, 50.03), 13123, 5);
    insert_ndb(&conn, 2, "FR", "ED", Pos::new(8.8, 50.1));
    let mut query = MapQuery::new(counting(conn), QueryConfig::default());

    let airport = query.airport_by_id(1).unwrap();
    assert_eq!(airport.ident, "EDDF");
    assert!(!airport.overview);

    match query.entity_by_id(MapObjectKind::Ndb, 2) {
        Some(MapEntity::Ndb(ndb)) => assert_eq!(ndb.ident, "FR"),
        other => panic!("expected an NDB, got {:?}", other),
    }
    assert!(query.entity_by_id(MapObjectKind::Vor, 2).is_none());

    let executions = query.datastore().executions();
    assert!(query.entity_by_id(MapObjectKind::Marker, 1).is_none());
    assert_eq!(query.datastore().executions(), executions);
}

// ============================================================================
// By ident
// ============================================================================

#[test]
fn test_ident_lookup_by_region() {
    let conn = empty_connection();
    insert_vor(&conn, 1, "FFM", "ED", Pos::new(8.6, 50.0));
    insert_vor(&conn, 2, "FFM", "K1", Pos::new(-90.0, 40.0));
    insert_vor(&conn, 3, "TAU", "ED", Pos::new(9.5, 50.5));
    let mut query = MapQuery::new(counting(conn), QueryConfig::default());

    let german = query.entities_by_ident(KindMask::VOR, "FFM", "ED", "");
    assert_eq!(german.vors.len(), 1);
    assert_eq!(german.vors[0].id, 1);

    let anywhere = query.entities_by_ident(KindMask::VOR | KindMask::NDB, "FFM", "", "");
    assert_eq!(sorted(anywhere.vors.iter().map(|v| v.id).collect()), vec![1, 2]);
    assert!(anywhere.ndbs.is_empty());
}

#[test]
fn test_ident_lookup_ils_by_airport() {
    let conn = empty_connection();
    insert_ils(&conn, 5, "IFRW", "EDDF", Pos::new(8.6, 50.0));
    insert_ils(&conn, 6, "IFRW", "EDDM", Pos::new(11.8, 48.3));
    let mut query = MapQuery::new(counting(conn), QueryConfig::default());

    let at_eddf = query.entities_by_ident(KindMask::ILS, "IFRW", "", "EDDF");
    assert_eq!(at_eddf.ils.len(), 1);
    assert_eq!(at_eddf.ils[0].airport_ident, "EDDF");

    let all = query.entities_by_ident(KindMask::ILS, "IFRW", "", "");
    assert_eq!(all.ils.len(), 2);
}

#[test]
fn test_ident_lookup_near_sorts_and_limits() {
    let conn = empty_connection();
    insert_vor(&conn, 1, "ABC", "ED", Pos::new(0.0, 0.0));
    insert_vor(&conn, 2, "ABC", "ED", Pos::new(10.0, 10.0));
    insert_vor(&conn, 3, "ABC", "ED", Pos::new(1.0, 1.0));
    let mut query = MapQuery::new(counting(conn), QueryConfig::default());
    let near = Pos::new(9.0, 9.0);

    let result = query.entities_by_ident_near(KindMask::VOR, "ABC", "", "", &near, None);
    let ids: Vec<i64> = result.vors.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![2, 3, 1]);

    let close = query.entities_by_ident_near(KindMask::VOR, "ABC", "", "", &near, Some(3.0));
    assert_eq!(close.vors.len(), 1);
    assert_eq!(close.vors[0].id, 2);
}

#[test]
fn test_ident_lookup_near_sorts_airway_segments() {
    let conn = empty_connection();
    let pos = |lon: f64| Pos::new(lon, 50.0);
    insert_airway(&conn, 1, "V7", 1, 1, (10, pos(0.0)), (11, pos(2.0)), (0.0, 49.9, 2.0, 50.1));
    insert_airway(&conn, 2, "V7", 1, 2, (11, pos(2.0)), (12, pos(8.0)), (2.0, 49.9, 8.0, 50.1));
    insert_airway(&conn, 3, "V7", 1, 3, (12, pos(8.0)), (13, pos(9.0)), (8.0, 49.9, 9.0, 50.1));
    let mut query = MapQuery::new(counting(conn), QueryConfig::default());
    let near = Pos::new(9.0, 50.0);

    let result = query.entities_by_ident_near(KindMask::AIRWAY_V, "V7", "", "", &near, None);
    let ids: Vec<i64> = result.airways.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let close = query.entities_by_ident_near(KindMask::AIRWAY_V, "V7", "", "", &near, Some(5.0));
    let ids: Vec<i64> = close.airways.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 2]);
}

// ============================================================================
// Airways
// ============================================================================

/// Airway V1: fragment 1 is WP20 - WP21 - WP22, fragment 2 is WP23 - WP24.
fn airway_database() -> rusqlite::Connection {
    let conn = empty_connection();
    let pos = |id: i64| Pos::new(8.0 + (id - 20) as f64 * 0.5, 50.0);
    for id in 20..=24 {
        insert_waypoint(&conn, id, &format!("WP{}", id), pos(id), None);
    }
    let bounds = (8.0, 49.9, 10.0, 50.1);
    insert_airway(&conn, 100, "V1", 1, 1, (20, pos(20)), (21, pos(21)), bounds);
    insert_airway(&conn, 101, "V1", 1, 2, (21, pos(21)), (22, pos(22)), bounds);
    insert_airway(&conn, 102, "V1", 2, 1, (23, pos(23)), (24, pos(24)), bounds);
    conn
}

#[test]
fn test_airway_waypoints_close_each_fragment() {
    let mut query = MapQuery::new(counting(airway_database()), QueryConfig::default());

    let waypoints = query.airway_waypoints("V1");

    let ids: Vec<i64> = waypoints.iter().map(|w| w.waypoint.id).collect();
    assert_eq!(ids, vec![20, 21, 22, 23, 24]);
    let airways: Vec<i64> = waypoints.iter().map(|w| w.airway_id).collect();
    assert_eq!(airways, vec![100, 101, 101, 102, 102]);
    assert_eq!(waypoints[2].sequence, waypoints[1].sequence);
    assert_eq!(waypoints[4].fragment, 2);

    assert!(query.airway_waypoints("J99").is_empty());
}

#[test]
fn test_airway_lookups() {
    let mut query = MapQuery::new(counting(airway_database()), QueryConfig::default());

    let by_name = query.entities_by_ident(KindMask::AIRWAY_V, "V1", "", "");
    let ids: Vec<i64> = by_name.airways.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![100, 101, 102]);

    let at_wp21 = query.airways_for_waypoint(21);
    assert_eq!(sorted(at_wp21.iter().map(|a| a.id).collect()), vec![100, 101]);

    let on_v1 = query.waypoints_for_airway("V1", "");
    assert_eq!(sorted(on_v1.iter().map(|w| w.id).collect()), vec![20, 21, 22, 23, 24]);
    let wp22 = query.waypoints_for_airway("V1", "WP22");
    assert_eq!(wp22.len(), 1);
}

#[test]
fn test_airway_segment_by_waypoints_either_direction() {
    let mut query = MapQuery::new(counting(airway_database()), QueryConfig::default());

    let forward = query.airway_by_name_and_waypoints("V1", "WP21", "WP22").unwrap();
    let reverse = query.airway_by_name_and_waypoints("V1", "WP22", "WP21").unwrap();
    assert_eq!(forward.id, 101);
    assert_eq!(reverse.id, 101);
    assert!(query.airway_by_name_and_waypoints("V1", "WP20", "WP22").is_none());

    let executions = query.datastore().executions();
    assert!(query.airway_by_name_and_waypoints("V1", "", "WP22").is_none());
    assert_eq!(query.datastore().executions(), executions);
}

#[test]
fn test_navaid_for_waypoint() {
    let conn = empty_connection();
    insert_vor(&conn, 1, "FFM", "ED", Pos::new(8.6, 50.0));
    insert_ndb(&conn, 5, "FR", "ED", Pos::new(8.8, 50.1));
    insert_waypoint(&conn, 10, "FFM", Pos::new(8.6, 50.0), Some(1));
    insert_waypoint(&conn, 11, "FR", Pos::new(8.8, 50.1), Some(5));
    insert_waypoint(&conn, 12, "DOMUX", Pos::new(9.0, 50.2), None);
    let mut query = MapQuery::new(counting(conn), QueryConfig::default());

    assert_eq!(query.vor_for_waypoint(10).unwrap().ident, "FFM");
    assert_eq!(query.ndb_for_waypoint(11).unwrap().ident, "FR");
    assert!(query.vor_for_waypoint(12).is_none());
    assert!(query.ndb_for_waypoint(99).is_none());
}

// ============================================================================
// Secondary caches
// ============================================================================

#[test]
fn test_runways_for_overview_are_memoized() {
    let conn = empty_connection();
    insert_airport(&conn, 1, "EDDF", Pos::new(8.57, 50.03), 9000, 5);
    insert_runway(&conn, 1, 3000, Pos::new(8.55, 50.03));
    insert_runway(&conn, 1, 5000, Pos::new(8.56, 50.03));
    insert_runway(&conn, 1, 9000, Pos::new(8.57, 50.03));
    let mut query = MapQuery::new(counting(conn), QueryConfig::default());

    let first = query.runways_for_overview(1);
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|r| r.length > 4000));
    let executions = query.datastore().executions();

    let second = query.runways_for_overview(1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(query.datastore().executions(), executions);

    assert!(query.runways_for_overview(2).is_empty());
}

#[test]
fn test_airspace_geometry_decodes_once() {
    let conn = empty_connection();
    let outline = square_outline(Pos::new(9.0, 50.0), 1.0);
    let area = (8.0, 49.0, 10.0, 51.0);
    insert_boundary(&conn, 1, "C", (0, 60000), area, Some(outline.encode()));
    let mut query = MapQuery::new(counting(conn), QueryConfig::default());

    let first = query.airspace_geometry(1);
    let second = query.airspace_geometry(1);

    assert_eq!(first.len(), 5);
    assert_eq!(first.points[2], Pos::new(10.0, 51.0));
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(query.geometry_cache().decode_count(), 1);
}

#[test]
fn test_airspace_geometry_missing_or_corrupt_is_empty() {
    let conn = empty_connection();
    let area = (8.0, 49.0, 10.0, 51.0);
    insert_boundary(&conn, 1, "R", (0, 5000), area, Some(vec![0, 0, 0, 9, 1, 2]));
    insert_boundary(&conn, 2, "R", (0, 5000), area, None);
    let mut query = MapQuery::new(counting(conn), QueryConfig::default());

    assert!(query.airspace_geometry(1).is_empty());
    assert!(query.airspace_geometry(2).is_empty());
    assert!(query.airspace_geometry(3).is_empty());
}

#[test]
fn test_airspace_geometry_cache_is_bounded() {
    let conn = empty_connection();
    let area = (8.0, 49.0, 10.0, 51.0);
    let outline = square_outline(Pos::new(9.0, 50.0), 0.5);
    insert_boundary(&conn, 1, "C", (0, 60000), area, Some(outline.encode()));
    insert_boundary(&conn, 2, "C", (0, 60000), area, Some(outline.encode()));
    let config = QueryConfig::default().with_geometry_cache_size(1);
    let mut query = MapQuery::new(counting(conn), config);

    query.airspace_geometry(1);
    query.airspace_geometry(2);
    query.airspace_geometry(1);

    assert_eq!(query.geometry_cache().decode_count(), 3);
}

// ============================================================================
// Reload
// ============================================================================

#[test]
fn test_replaced_connection_triggers_reload() {
    let old = empty_connection();
    insert_vor(&old, 1, "OLD", "ED", Pos::new(9.0, 50.0));
    let mut query = MapQuery::new(counting(old), QueryConfig::default());
    let rect = Rect::new(8.0, 49.0, 10.0, 51.0);
    let layer = MapLayer::default();

    assert_eq!(query.vors(&rect, &layer, false)[0].ident, "OLD");
    query.airspace_geometry(7);
    assert!(query.geometry_cache().contains(7));

    let new = empty_connection();
    insert_vor(&new, 2, "NEW", "ED", Pos::new(9.0, 50.0));
    query.datastore_mut().inner_mut().replace_connection(new);

    let vors = query.vors(&rect, &layer, false);
    assert_eq!(vors.len(), 1);
    assert_eq!(vors[0].ident, "NEW");
    assert!(!query.geometry_cache().contains(7));
}

#[test]
fn test_replace_datastore_returns_previous() {
    let old = empty_connection();
    insert_ndb(&old, 1, "OLD", "ED", Pos::new(9.0, 50.0));
    let mut query = MapQuery::new(counting(old), QueryConfig::default());

    let new = empty_connection();
    insert_ndb(&new, 1, "NEW", "ED", Pos::new(9.0, 50.0));
    let previous = query.replace_datastore(counting(new));

    assert_eq!(previous.executions(), 0);
    assert_eq!(query.ndb_by_id(1).unwrap().ident, "NEW");
}
