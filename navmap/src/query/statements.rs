//! Prepared statement registry.
//!
//! Every (entity kind × access pattern) has exactly one [`StatementKey`] and
//! one SQL text. [`QueryBuilder`] prepares all of them against a datastore
//! and tears them down again when the connection changes.

use std::collections::HashMap;

use crate::datastore::{Datastore, Param, Row, StatementId, Value};
use crate::geo::Rect;

const AIRPORT_OVERVIEW_COLUMNS: &[&str] = &[
    "airport_id",
    "ident",
    "name",
    "has_avgas",
    "has_jetfuel",
    "tower_frequency",
    "is_closed",
    "is_military",
    "is_addon",
    "rating",
    "num_runway_hard",
    "num_runway_soft",
    "num_runway_water",
    "num_helipad",
    "longest_runway_length",
    "longest_runway_heading",
    "mag_var",
    "lonx",
    "laty",
    "left_lonx",
    "top_laty",
    "right_lonx",
    "bottom_laty",
];

const AIRPORT_TOWER_COLUMNS: &[&str] = &["tower_lonx", "tower_laty"];

const VOR_COLUMNS: &[&str] = &[
    "vor_id",
    "ident",
    "name",
    "region",
    "type",
    "frequency",
    "channel",
    "range",
    "dme_only",
    "dme_altitude",
    "mag_var",
    "altitude",
    "lonx",
    "laty",
];

const NDB_COLUMNS: &[&str] = &[
    "ndb_id",
    "ident",
    "name",
    "region",
    "type",
    "frequency",
    "range",
    "mag_var",
    "altitude",
    "lonx",
    "laty",
];

const WAYPOINT_COLUMNS: &[&str] = &[
    "waypoint_id",
    "ident",
    "region",
    "type",
    "num_victor_airway",
    "num_jet_airway",
    "mag_var",
    "lonx",
    "laty",
    "nav_id",
];

const MARKER_COLUMNS: &[&str] = &["marker_id", "type", "ident", "heading", "lonx", "laty"];

const ILS_COLUMNS: &[&str] = &[
    "ils_id",
    "ident",
    "name",
    "region",
    "mag_var",
    "loc_heading",
    "gs_pitch",
    "frequency",
    "range",
    "dme_range",
    "loc_width",
    "end1_lonx",
    "end1_laty",
    "end_mid_lonx",
    "end_mid_laty",
    "end2_lonx",
    "end2_laty",
    "altitude",
    "lonx",
    "laty",
    "loc_airport_ident",
];

const AIRWAY_COLUMNS: &[&str] = &[
    "airway_id",
    "airway_name",
    "airway_type",
    "airway_fragment_no",
    "sequence_no",
    "from_waypoint_id",
    "to_waypoint_id",
    "direction",
    "minimum_altitude",
    "maximum_altitude",
    "from_lonx",
    "from_laty",
    "to_lonx",
    "to_laty",
    "left_lonx",
    "top_laty",
    "right_lonx",
    "bottom_laty",
];

const AIRSPACE_COLUMNS: &[&str] = &[
    "boundary_id",
    "type",
    "name",
    "com_type",
    "com_frequency",
    "com_name",
    "min_altitude_type",
    "max_altitude_type",
    "max_altitude",
    "max_lonx",
    "max_laty",
    "min_altitude",
    "min_lonx",
    "min_laty",
];

const RUNWAY_COLUMNS: &[&str] = &[
    "airport_id",
    "length",
    "heading",
    "lonx",
    "laty",
    "primary_lonx",
    "primary_laty",
    "secondary_lonx",
    "secondary_laty",
];

/// Point features inside one plain rectangle.
const WHERE_POINT_IN_RECT: &str =
    "lonx between :leftx and :rightx and laty between :bottomy and :topy";

/// Features with an own bounding box overlapping one plain rectangle.
///
/// A box whose right bound is less than its left bound wraps the
/// antimeridian and is always returned; callers filter those client-side.
const WHERE_AIRWAY_IN_RECT: &str = "(not (right_lonx < :leftx or left_lonx > :rightx or \
     bottom_laty > :topy or top_laty < :bottomy) or right_lonx < left_lonx)";

const WHERE_AIRSPACE_IN_RECT: &str = "(not (max_lonx < :leftx or min_lonx > :rightx or \
     min_laty > :topy or max_laty < :bottomy) or max_lonx < min_lonx)";

const WHERE_IDENT_REGION: &str = "ident = :ident and region like :region";

const ORDER_BY_L1_DISTANCE: &str = "order by (abs(lonx - :lonx) + abs(laty - :laty))";

/// Runways at or below this length in feet are left out of the overview.
pub const OVERVIEW_MIN_RUNWAY_LENGTH: i32 = 4000;

/// One prepared statement per entity kind and access pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKey {
    // By rectangle
    AirportByRect,
    AirportMediumByRect,
    AirportLargeByRect,
    VorByRect,
    NdbByRect,
    WaypointByRect,
    MarkerByRect,
    IlsByRect,
    AirwayByRect,
    AirspaceByRect,
    AirspaceByRectBelowAlt,
    AirspaceByRectAboveAlt,
    AirspaceByRectAtAlt,

    // By id
    AirportById,
    VorById,
    NdbById,
    WaypointById,
    IlsById,
    AirwayById,
    AirspaceById,
    AirspaceGeometryById,
    RunwayOverviewByAirportId,

    // By ident
    AirportByIdent,
    VorByIdent,
    NdbByIdent,
    WaypointByIdent,
    IlsByIdent,
    AirwayByName,

    // Nearest by L1 distance
    AirportNearest,
    VorNearest,
    NdbNearest,
    WaypointNearest,

    // By related entity
    VorByWaypointId,
    NdbByWaypointId,
    AirwayByWaypointId,
    AirwayByNameAndWaypoints,
    AirwayWaypointsByIdent,
    AirwayWaypointsByName,
}

impl StatementKey {
    pub const ALL: [StatementKey; 38] = [
        StatementKey::AirportByRect,
        StatementKey::AirportMediumByRect,
        StatementKey::AirportLargeByRect,
        StatementKey::VorByRect,
        StatementKey::NdbByRect,
        StatementKey::WaypointByRect,
        StatementKey::MarkerByRect,
        StatementKey::IlsByRect,
        StatementKey::AirwayByRect,
        StatementKey::AirspaceByRect,
        StatementKey::AirspaceByRectBelowAlt,
        StatementKey::AirspaceByRectAboveAlt,
        StatementKey::AirspaceByRectAtAlt,
        StatementKey::AirportById,
        StatementKey::VorById,
        StatementKey::NdbById,
        StatementKey::WaypointById,
        StatementKey::IlsById,
        StatementKey::AirwayById,
        StatementKey::AirspaceById,
        StatementKey::AirspaceGeometryById,
        StatementKey::RunwayOverviewByAirportId,
        StatementKey::AirportByIdent,
        StatementKey::VorByIdent,
        StatementKey::NdbByIdent,
        StatementKey::WaypointByIdent,
        StatementKey::IlsByIdent,
        StatementKey::AirwayByName,
        StatementKey::AirportNearest,
        StatementKey::VorNearest,
        StatementKey::NdbNearest,
        StatementKey::WaypointNearest,
        StatementKey::VorByWaypointId,
        StatementKey::NdbByWaypointId,
        StatementKey::AirwayByWaypointId,
        StatementKey::AirwayByNameAndWaypoints,
        StatementKey::AirwayWaypointsByIdent,
        StatementKey::AirwayWaypointsByName,
    ];

    /// SQL text with the row cap appended.
    pub fn sql(&self, row_limit: usize) -> String {
        let limit = format!("limit {}", row_limit);
        let airport = airport_columns();
        let overview = select_list(AIRPORT_OVERVIEW_COLUMNS);
        let vor = select_list(VOR_COLUMNS);
        let ndb = select_list(NDB_COLUMNS);
        let waypoint = select_list(WAYPOINT_COLUMNS);
        let ils = select_list(ILS_COLUMNS);
        let airway = select_list(AIRWAY_COLUMNS);
        let airspace = select_list(AIRSPACE_COLUMNS);

        match self {
            StatementKey::AirportByRect => format!(
                "select {airport} from airport where {WHERE_POINT_IN_RECT} \
                 and longest_runway_length >= :minlength \
                 order by rating desc, longest_runway_length desc {limit}"
            ),
            StatementKey::AirportMediumByRect => format!(
                "select {overview} from airport_medium where {WHERE_POINT_IN_RECT} {limit}"
            ),
            StatementKey::AirportLargeByRect => format!(
                "select {overview} from airport_large where {WHERE_POINT_IN_RECT} {limit}"
            ),
            StatementKey::VorByRect => {
                format!("select {vor} from vor where {WHERE_POINT_IN_RECT} {limit}")
            }
            StatementKey::NdbByRect => {
                format!("select {ndb} from ndb where {WHERE_POINT_IN_RECT} {limit}")
            }
            StatementKey::WaypointByRect => {
                format!("select {waypoint} from waypoint where {WHERE_POINT_IN_RECT} {limit}")
            }
            StatementKey::MarkerByRect => format!(
                "select {} from marker where {WHERE_POINT_IN_RECT} {limit}",
                select_list(MARKER_COLUMNS)
            ),
            StatementKey::IlsByRect => {
                format!("select {ils} from ils where {WHERE_POINT_IN_RECT} {limit}")
            }
            StatementKey::AirwayByRect => {
                format!("select {airway} from airway where {WHERE_AIRWAY_IN_RECT} {limit}")
            }
            StatementKey::AirspaceByRect => format!(
                "select {airspace} from boundary where {WHERE_AIRSPACE_IN_RECT} \
                 and type like :type {limit}"
            ),
            StatementKey::AirspaceByRectBelowAlt => format!(
                "select {airspace} from boundary where {WHERE_AIRSPACE_IN_RECT} \
                 and type like :type and min_altitude < :alt {limit}"
            ),
            StatementKey::AirspaceByRectAboveAlt => format!(
                "select {airspace} from boundary where {WHERE_AIRSPACE_IN_RECT} \
                 and type like :type and max_altitude > :alt {limit}"
            ),
            StatementKey::AirspaceByRectAtAlt => format!(
                "select {airspace} from boundary where {WHERE_AIRSPACE_IN_RECT} \
                 and type like :type and :alt between min_altitude and max_altitude {limit}"
            ),

            StatementKey::AirportById => {
                format!("select {airport} from airport where airport_id = :id {limit}")
            }
            StatementKey::VorById => format!("select {vor} from vor where vor_id = :id {limit}"),
            StatementKey::NdbById => format!("select {ndb} from ndb where ndb_id = :id {limit}"),
            StatementKey::WaypointById => {
                format!("select {waypoint} from waypoint where waypoint_id = :id {limit}")
            }
            StatementKey::IlsById => format!("select {ils} from ils where ils_id = :id {limit}"),
            StatementKey::AirwayById => {
                format!("select {airway} from airway where airway_id = :id {limit}")
            }
            StatementKey::AirspaceById => {
                format!("select {airspace} from boundary where boundary_id = :id {limit}")
            }
            StatementKey::AirspaceGeometryById => {
                format!("select geometry from boundary where boundary_id = :id {limit}")
            }
            StatementKey::RunwayOverviewByAirportId => format!(
                "select {} from runway where airport_id = :id and length > {} {limit}",
                select_list(RUNWAY_COLUMNS),
                OVERVIEW_MIN_RUNWAY_LENGTH
            ),

            StatementKey::AirportByIdent => {
                format!("select {airport} from airport where ident = :ident {limit}")
            }
            StatementKey::VorByIdent => {
                format!("select {vor} from vor where {WHERE_IDENT_REGION} {limit}")
            }
            StatementKey::NdbByIdent => {
                format!("select {ndb} from ndb where {WHERE_IDENT_REGION} {limit}")
            }
            StatementKey::WaypointByIdent => {
                format!("select {waypoint} from waypoint where {WHERE_IDENT_REGION} {limit}")
            }
            StatementKey::IlsByIdent => format!(
                "select {ils} from ils where ident = :ident \
                 and loc_airport_ident like :airport {limit}"
            ),
            StatementKey::AirwayByName => format!(
                "select {airway} from airway where airway_name = :name \
                 order by airway_fragment_no, sequence_no {limit}"
            ),

            StatementKey::AirportNearest => {
                format!("select {airport} from airport {ORDER_BY_L1_DISTANCE} limit 1")
            }
            StatementKey::VorNearest => {
                format!("select {vor} from vor {ORDER_BY_L1_DISTANCE} limit 1")
            }
            StatementKey::NdbNearest => {
                format!("select {ndb} from ndb {ORDER_BY_L1_DISTANCE} limit 1")
            }
            StatementKey::WaypointNearest => {
                format!("select {waypoint} from waypoint {ORDER_BY_L1_DISTANCE} limit 1")
            }

            StatementKey::VorByWaypointId => format!(
                "select {vor} from vor where vor_id in \
                 (select nav_id from waypoint w where w.waypoint_id = :id) {limit}"
            ),
            StatementKey::NdbByWaypointId => format!(
                "select {ndb} from ndb where ndb_id in \
                 (select nav_id from waypoint w where w.waypoint_id = :id) {limit}"
            ),
            StatementKey::AirwayByWaypointId => format!(
                "select {airway} from airway \
                 where from_waypoint_id = :id or to_waypoint_id = :id {limit}"
            ),
            StatementKey::AirwayByNameAndWaypoints => format!(
                "select {} from airway a \
                 join waypoint wf on a.from_waypoint_id = wf.waypoint_id \
                 join waypoint wt on a.to_waypoint_id = wt.waypoint_id \
                 where a.airway_name = :airway and \
                 ((wf.ident = :ident1 and wt.ident = :ident2) or \
                 (wt.ident = :ident1 and wf.ident = :ident2)) {limit}",
                qualified_list("a", AIRWAY_COLUMNS)
            ),
            StatementKey::AirwayWaypointsByIdent => {
                let columns = qualified_list("w", WAYPOINT_COLUMNS);
                format!(
                    "select {columns} from waypoint w \
                     join airway a on w.waypoint_id = a.from_waypoint_id \
                     where w.ident like :waypoint and a.airway_name like :airway \
                     union \
                     select {columns} from waypoint w \
                     join airway a on w.waypoint_id = a.to_waypoint_id \
                     where w.ident like :waypoint and a.airway_name like :airway {limit}"
                )
            }
            StatementKey::AirwayWaypointsByName => format!(
                "select {airway} from airway where airway_name = :name \
                 order by airway_fragment_no, sequence_no {limit}"
            ),
        }
    }
}

fn select_list(columns: &[&str]) -> String {
    columns.join(", ")
}

/// Columns of an aliased table, renamed back to their plain names.
fn qualified_list(alias: &str, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("{alias}.{c} as {c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn airport_columns() -> String {
    AIRPORT_OVERVIEW_COLUMNS
        .iter()
        .chain(AIRPORT_TOWER_COLUMNS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// The four bounds of a plain (non-wrapping) rectangle as named parameters.
pub fn rect_params(rect: &Rect) -> Vec<Param<'static>> {
    vec![
        (":leftx", Value::Real(rect.west)),
        (":rightx", Value::Real(rect.east)),
        (":bottomy", Value::Real(rect.south)),
        (":topy", Value::Real(rect.north)),
    ]
}

/// Holds the prepared statement handle of every [`StatementKey`].
#[derive(Debug)]
pub struct QueryBuilder {
    statements: HashMap<StatementKey, StatementId>,
    row_limit: usize,
    generation: Option<u64>,
}

impl QueryBuilder {
    pub fn new(row_limit: usize) -> Self {
        Self {
            statements: HashMap::new(),
            row_limit,
            generation: None,
        }
    }

    pub fn row_limit(&self) -> usize {
        self.row_limit
    }

    /// Returns true if statements are prepared on the datastore's current connection.
    pub fn is_current<D: Datastore + ?Sized>(&self, db: &D) -> bool {
        self.generation == Some(db.generation())
    }

    /// Number of prepared statements.
    pub fn prepared_count(&self) -> usize {
        self.statements.len()
    }

    /// Prepare every statement.
    ///
    /// Statements that fail to compile are logged and left out; running them
    /// later yields no rows. Returns the number of failures.
    pub fn prepare_all<D: Datastore + ?Sized>(&mut self, db: &mut D) -> usize {
        self.statements.clear();
        let mut failed = 0;

        for key in StatementKey::ALL {
            match db.prepare(&key.sql(self.row_limit)) {
                Ok(id) => {
                    self.statements.insert(key, id);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(statement = ?key, error = %e, "Failed to prepare statement");
                }
            }
        }

        self.generation = Some(db.generation());
        tracing::debug!(
            prepared = self.statements.len(),
            failed,
            generation = db.generation(),
            "Prepared statements"
        );
        failed
    }

    /// Finalize every statement.
    pub fn teardown<D: Datastore + ?Sized>(&mut self, db: &mut D) {
        self.statements.clear();
        self.generation = None;
        db.finalize_all();
    }

    /// Execute a statement.
    ///
    /// Execution failures are logged and reported as an empty result.
    pub fn run<D: Datastore + ?Sized>(
        &self,
        db: &mut D,
        key: StatementKey,
        params: &[Param<'_>],
    ) -> Vec<Row> {
        let Some(&id) = self.statements.get(&key) else {
            tracing::warn!(statement = ?key, "Statement not prepared, returning no rows");
            return Vec::new();
        };

        match db.execute(id, params) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(statement = ?key, error = %e, "Query failed, returning no rows");
                Vec::new()
            }
        }
    }
}
