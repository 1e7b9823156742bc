//! Shared fixtures for the integration tests.
//!
//! Builds a small navigation database in memory and wraps the datastore so
//! tests can count round-trips.

#![allow(dead_code)]

use rusqlite::{params, Connection};

use navmap::datastore::{Datastore, DatastoreError, Param, Row, StatementId};
use navmap::query::LineString;
use navmap::{Pos, SqliteDatastore};

// ============================================================================
// Schema
// ============================================================================

pub const SCHEMA: &str = "
create table airport (
    airport_id integer primary key,
    ident text, name text,
    has_avgas integer default 0, has_jetfuel integer default 0,
    tower_frequency integer,
    is_closed integer default 0, is_military integer default 0, is_addon integer default 0,
    rating integer default 0,
    num_runway_hard integer default 1, num_runway_soft integer default 0,
    num_runway_water integer default 0, num_helipad integer default 0,
    longest_runway_length integer default 0, longest_runway_heading integer default 0,
    mag_var double default 0,
    lonx double, laty double,
    left_lonx double, top_laty double, right_lonx double, bottom_laty double,
    tower_lonx double, tower_laty double);

create view airport_medium as select * from airport where longest_runway_length > 4000;
create view airport_large as select * from airport where longest_runway_length > 8000;

create table vor (
    vor_id integer primary key,
    ident text, name text, region text, type text,
    frequency integer default 0, channel text, range integer default 0,
    dme_only integer default 0, dme_altitude integer,
    mag_var double default 0, altitude integer,
    lonx double, laty double);

create table ndb (
    ndb_id integer primary key,
    ident text, name text, region text, type text,
    frequency integer default 0, range integer default 0,
    mag_var double default 0, altitude integer,
    lonx double, laty double);

create table waypoint (
    waypoint_id integer primary key,
    ident text, region text, type text,
    num_victor_airway integer default 0, num_jet_airway integer default 0,
    mag_var double default 0,
    lonx double, laty double,
    nav_id integer);

create table marker (
    marker_id integer primary key,
    type text, ident text, heading double default 0,
    lonx double, laty double);

create table ils (
    ils_id integer primary key,
    ident text, name text, region text,
    mag_var double default 0, loc_heading double default 0, gs_pitch double,
    frequency integer default 0, range integer default 0, dme_range integer,
    loc_width double default 4,
    end1_lonx double, end1_laty double,
    end_mid_lonx double, end_mid_laty double,
    end2_lonx double, end2_laty double,
    altitude integer,
    lonx double, laty double,
    loc_airport_ident text);

create table airway (
    airway_id integer primary key,
    airway_name text, airway_type text,
    airway_fragment_no integer default 1, sequence_no integer default 1,
    from_waypoint_id integer, to_waypoint_id integer,
    direction text default 'N',
    minimum_altitude integer, maximum_altitude integer,
    from_lonx double, from_laty double, to_lonx double, to_laty double,
    left_lonx double, top_laty double, right_lonx double, bottom_laty double);

create table boundary (
    boundary_id integer primary key,
    type text, name text,
    com_type text, com_frequency integer, com_name text,
    min_altitude_type text, max_altitude_type text,
    max_altitude integer,
    max_lonx double, max_laty double,
    min_altitude integer,
    min_lonx double, min_laty double,
    geometry blob);

create table runway (
    runway_id integer primary key,
    airport_id integer,
    length integer, heading double,
    lonx double, laty double,
    primary_lonx double, primary_laty double,
    secondary_lonx double, secondary_laty double);
";

/// An empty navigation database with the full schema.
pub fn empty_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn insert_airport(conn: &Connection, id: i64, ident: &str, pos: Pos, runway: i32, rating: i32) {
    conn.execute(
        "insert into airport (airport_id, ident, name, rating, longest_runway_length,
             lonx, laty, left_lonx, top_laty, right_lonx, bottom_laty, tower_lonx, tower_laty)
         values (?1, ?2, ?2, ?3, ?4, ?5, ?6, ?5 - 0.01, ?6 + 0.01, ?5 + 0.01, ?6 - 0.01, ?5, ?6)",
        params![id, ident, rating, runway, pos.lon, pos.lat],
    )
    .unwrap();
}

pub fn insert_vor(conn: &Connection, id: i64, ident: &str, region: &str, pos: Pos) {
    conn.execute(
        "insert into vor (vor_id, ident, name, region, type, lonx, laty)
         values (?1, ?2, ?2, ?3, 'H', ?4, ?5)",
        params![id, ident, region, pos.lon, pos.lat],
    )
    .unwrap();
}

pub fn insert_ndb(conn: &Connection, id: i64, ident: &str, region: &str, pos: Pos) {
    conn.execute(
        "insert into ndb (ndb_id, ident, name, region, type, lonx, laty)
         values (?1, ?2, ?2, ?3, 'HH', ?4, ?5)",
        params![id, ident, region, pos.lon, pos.lat],
    )
    .unwrap();
}

pub fn insert_waypoint(conn: &Connection, id: i64, ident: &str, pos: Pos, nav_id: Option<i64>) {
    conn.execute(
        "insert into waypoint (waypoint_id, ident, region, type, lonx, laty, nav_id)
         values (?1, ?2, 'ED', 'WN', ?3, ?4, ?5)",
        params![id, ident, pos.lon, pos.lat, nav_id],
    )
    .unwrap();
}

pub fn insert_ils(conn: &Connection, id: i64, ident: &str, airport: &str, pos: Pos) {
    conn.execute(
        "insert into ils (ils_id, ident, name, region, lonx, laty,
             end1_lonx, end1_laty, end_mid_lonx, end_mid_laty, end2_lonx, end2_laty,
             loc_airport_ident)
         values (?1, ?2, ?2, 'ED', ?3, ?4, ?3 - 0.1, ?4, ?3 - 0.1, ?4 + 0.01, ?3 - 0.1, ?4 + 0.02, ?5)",
        params![id, ident, pos.lon, pos.lat, airport],
    )
    .unwrap();
}

/// Airway segment between two waypoints; the bounding box is given
/// explicitly so wrapped boxes can be stored.
#[allow(clippy::too_many_arguments)]
pub fn insert_airway(
    conn: &Connection,
    id: i64,
    name: &str,
    fragment: i32,
    sequence: i32,
    from: (i64, Pos),
    to: (i64, Pos),
    bounding: (f64, f64, f64, f64),
) {
    let (west, south, east, north) = bounding;
    conn.execute(
        "insert into airway (airway_id, airway_name, airway_type, airway_fragment_no, sequence_no,
             from_waypoint_id, to_waypoint_id, from_lonx, from_laty, to_lonx, to_laty,
             left_lonx, top_laty, right_lonx, bottom_laty)
         values (?1, ?2, 'V', ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            id, name, fragment, sequence, from.0, to.0, from.1.lon, from.1.lat, to.1.lon,
            to.1.lat, west, north, east, south
        ],
    )
    .unwrap();
}

/// Airspace boundary with a bounding box and an encoded outline.
pub fn insert_boundary(
    conn: &Connection,
    id: i64,
    code: &str,
    altitudes: (i32, i32),
    bounding: (f64, f64, f64, f64),
    geometry: Option<Vec<u8>>,
) {
    let (west, south, east, north) = bounding;
    conn.execute(
        "insert into boundary (boundary_id, type, name, min_altitude, max_altitude,
             min_lonx, min_laty, max_lonx, max_laty, geometry)
         values (?1, ?2, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![id, code, altitudes.0, altitudes.1, west, south, east, north, geometry],
    )
    .unwrap();
}

pub fn insert_runway(conn: &Connection, airport_id: i64, length: i32, pos: Pos) {
    conn.execute(
        "insert into runway (airport_id, length, heading, lonx, laty,
             primary_lonx, primary_laty, secondary_lonx, secondary_laty)
         values (?1, ?2, 90, ?3, ?4, ?3 - 0.01, ?4, ?3 + 0.01, ?4)",
        params![airport_id, length, pos.lon, pos.lat],
    )
    .unwrap();
}

/// Closed square outline around a center.
pub fn square_outline(center: Pos, half: f64) -> LineString {
    LineString::new(vec![
        Pos::new(center.lon - half, center.lat - half),
        Pos::new(center.lon + half, center.lat - half),
        Pos::new(center.lon + half, center.lat + half),
        Pos::new(center.lon - half, center.lat + half),
        Pos::new(center.lon - half, center.lat - half),
    ])
}

// ============================================================================
// Counting datastore
// ============================================================================

/// Forwards to an inner datastore and counts executions.
pub struct CountingDatastore<D> {
    inner: D,
    executions: usize,
}

impl<D: Datastore> CountingDatastore<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            executions: 0,
        }
    }

    pub fn executions(&self) -> usize {
        self.executions
    }

    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }
}

impl<D: Datastore> Datastore for CountingDatastore<D> {
    fn prepare(&mut self, sql: &str) -> Result<StatementId, DatastoreError> {
        self.inner.prepare(sql)
    }

    fn execute(
        &mut self,
        statement: StatementId,
        params: &[Param<'_>],
    ) -> Result<Vec<Row>, DatastoreError> {
        self.executions += 1;
        self.inner.execute(statement, params)
    }

    fn finalize_all(&mut self) {
        self.inner.finalize_all();
    }

    fn generation(&self) -> u64 {
        self.inner.generation()
    }
}

/// Counting datastore over `conn`.
pub fn counting(conn: Connection) -> CountingDatastore<SqliteDatastore> {
    CountingDatastore::new(SqliteDatastore::from_connection(conn))
}

/// Datastore whose `execute` fails while `failing` is set.
pub struct FailingDatastore<D> {
    inner: D,
    failing: bool,
    attempts: usize,
}

impl<D: Datastore> FailingDatastore<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            failing: true,
            attempts: 0,
        }
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Executions attempted, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl<D: Datastore> Datastore for FailingDatastore<D> {
    fn prepare(&mut self, sql: &str) -> Result<StatementId, DatastoreError> {
        self.inner.prepare(sql)
    }

    fn execute(
        &mut self,
        statement: StatementId,
        params: &[Param<'_>],
    ) -> Result<Vec<Row>, DatastoreError> {
        self.attempts += 1;
        if self.failing {
            return Err(DatastoreError::Execute {
                statement,
                message: "disk I/O error".to_string(),
            });
        }
        self.inner.execute(statement, params)
    }

    fn finalize_all(&mut self) {
        self.inner.finalize_all();
    }

    fn generation(&self) -> u64 {
        self.inner.generation()
    }
}

/// Failing datastore over `conn`, starting in the failing state.
pub fn failing(conn: Connection) -> FailingDatastore<SqliteDatastore> {
    FailingDatastore::new(SqliteDatastore::from_connection(conn))
}
