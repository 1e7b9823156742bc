//! Row to entity conversion.
//!
//! The query layer never reads columns itself; every row passes through an
//! [`EntityFactory`]. [`DefaultEntityFactory`] maps the column layout of the
//! navigation database schema.

use crate::datastore::{Row, RowError};
use crate::geo::{Pos, Rect};
use crate::model::{
    Airport, Airspace, AirspaceType, Airway, Ils, Marker, Ndb, Runway, Vor, Waypoint,
};

/// Builds typed entities from datastore rows.
pub trait EntityFactory {
    /// A complete airport row.
    fn airport(&self, row: &Row) -> Result<Airport, RowError>;

    /// A partial airport row from the medium/large overview tiers.
    fn airport_overview(&self, row: &Row) -> Result<Airport, RowError>;

    fn vor(&self, row: &Row) -> Result<Vor, RowError>;

    fn ndb(&self, row: &Row) -> Result<Ndb, RowError>;

    fn waypoint(&self, row: &Row) -> Result<Waypoint, RowError>;

    fn marker(&self, row: &Row) -> Result<Marker, RowError>;

    fn ils(&self, row: &Row) -> Result<Ils, RowError>;

    fn airway(&self, row: &Row) -> Result<Airway, RowError>;

    fn airspace(&self, row: &Row) -> Result<Airspace, RowError>;

    fn runway(&self, row: &Row) -> Result<Runway, RowError>;
}

/// Factory for the standard navigation database columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEntityFactory;

impl DefaultEntityFactory {
    pub fn new() -> Self {
        Self
    }
}

fn pos(row: &Row, lon: &str, lat: &str) -> Result<Pos, RowError> {
    Ok(Pos::new(row.float(lon)?, row.float(lat)?))
}

fn opt_pos(row: &Row, lon: &str, lat: &str) -> Result<Option<Pos>, RowError> {
    if !row.has_column(lon) || !row.has_column(lat) {
        return Ok(None);
    }
    match (row.opt_float(lon)?, row.opt_float(lat)?) {
        (Some(lon), Some(lat)) => Ok(Some(Pos::new(lon, lat))),
        _ => Ok(None),
    }
}

fn opt_int32(row: &Row, column: &str) -> Result<Option<i32>, RowError> {
    Ok(row
        .opt_int(column)?
        .map(|v| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32))
}

/// Bounding rectangle of points that do not cross the antimeridian.
fn bounding_of(points: &[Pos]) -> Rect {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Rect::default();
    };
    iter.fold(Rect::from_pos(*first), |r, p| {
        Rect::new(
            r.west.min(p.lon),
            r.south.min(p.lat),
            r.east.max(p.lon),
            r.north.max(p.lat),
        )
    })
}

impl EntityFactory for DefaultEntityFactory {
    fn airport(&self, row: &Row) -> Result<Airport, RowError> {
        let mut airport = self.airport_overview(row)?;
        airport.tower_position = opt_pos(row, "tower_lonx", "tower_laty")?;
        airport.overview = false;
        Ok(airport)
    }

    fn airport_overview(&self, row: &Row) -> Result<Airport, RowError> {
        Ok(Airport {
            id: row.int("airport_id")?,
            ident: row.text("ident")?.to_string(),
            name: row.text("name")?.to_string(),
            rating: row.int32("rating")?,
            position: pos(row, "lonx", "laty")?,
            bounding: Rect::new(
                row.float("left_lonx")?,
                row.float("bottom_laty")?,
                row.float("right_lonx")?,
                row.float("top_laty")?,
            ),
            longest_runway_length: row.int32("longest_runway_length")?,
            longest_runway_heading: row.int32("longest_runway_heading")?,
            tower_frequency: opt_int32(row, "tower_frequency")?.filter(|f| *f > 0),
            mag_var: row.float("mag_var")?,
            closed: row.flag("is_closed")?,
            military: row.flag("is_military")?,
            addon: row.flag("is_addon")?,
            hard_runways: row.int32("num_runway_hard")?,
            soft_runways: row.int32("num_runway_soft")?,
            water_runways: row.int32("num_runway_water")?,
            helipads: row.int32("num_helipad")?,
            avgas: row.flag("has_avgas")?,
            jetfuel: row.flag("has_jetfuel")?,
            tower_position: None,
            overview: true,
        })
    }

    fn vor(&self, row: &Row) -> Result<Vor, RowError> {
        Ok(Vor {
            id: row.int("vor_id")?,
            ident: row.text("ident")?.to_string(),
            name: row.text("name")?.to_string(),
            region: row.text("region")?.to_string(),
            kind: row.text("type")?.to_string(),
            frequency: row.int32("frequency")?,
            channel: row.text("channel")?.to_string(),
            range: row.int32("range")?,
            dme_only: row.flag("dme_only")?,
            has_dme: row.opt_int("dme_altitude")?.is_some(),
            mag_var: row.float("mag_var")?,
            altitude: opt_int32(row, "altitude")?,
            position: pos(row, "lonx", "laty")?,
        })
    }

    fn ndb(&self, row: &Row) -> Result<Ndb, RowError> {
        Ok(Ndb {
            id: row.int("ndb_id")?,
            ident: row.text("ident")?.to_string(),
            name: row.text("name")?.to_string(),
            region: row.text("region")?.to_string(),
            kind: row.text("type")?.to_string(),
            frequency: row.int32("frequency")?,
            range: row.int32("range")?,
            mag_var: row.float("mag_var")?,
            altitude: opt_int32(row, "altitude")?,
            position: pos(row, "lonx", "laty")?,
        })
    }

    fn waypoint(&self, row: &Row) -> Result<Waypoint, RowError> {
        Ok(Waypoint {
            id: row.int("waypoint_id")?,
            ident: row.text("ident")?.to_string(),
            region: row.text("region")?.to_string(),
            kind: row.text("type")?.to_string(),
            victor_airways: row.int32("num_victor_airway")?,
            jet_airways: row.int32("num_jet_airway")?,
            mag_var: row.float("mag_var")?,
            position: pos(row, "lonx", "laty")?,
            nav_id: if row.has_column("nav_id") {
                row.opt_int("nav_id")?
            } else {
                None
            },
        })
    }

    fn marker(&self, row: &Row) -> Result<Marker, RowError> {
        Ok(Marker {
            id: row.int("marker_id")?,
            kind: row.text("type")?.to_string(),
            ident: row.text("ident")?.to_string(),
            heading: row.float("heading")?,
            position: pos(row, "lonx", "laty")?,
        })
    }

    fn ils(&self, row: &Row) -> Result<Ils, RowError> {
        let position = pos(row, "lonx", "laty")?;
        let end1 = pos(row, "end1_lonx", "end1_laty")?;
        let end_mid = pos(row, "end_mid_lonx", "end_mid_laty")?;
        let end2 = pos(row, "end2_lonx", "end2_laty")?;

        Ok(Ils {
            id: row.int("ils_id")?,
            ident: row.text("ident")?.to_string(),
            name: row.text("name")?.to_string(),
            region: row.text("region")?.to_string(),
            airport_ident: row.text("loc_airport_ident")?.to_string(),
            mag_var: row.float("mag_var")?,
            loc_heading: row.float("loc_heading")?,
            gs_pitch: row.opt_float("gs_pitch")?,
            frequency: row.int32("frequency")?,
            range: row.int32("range")?,
            dme_range: opt_int32(row, "dme_range")?,
            width: row.float("loc_width")?,
            end1,
            end_mid,
            end2,
            altitude: opt_int32(row, "altitude")?,
            position,
            bounding: bounding_of(&[position, end1, end2]),
        })
    }

    fn airway(&self, row: &Row) -> Result<Airway, RowError> {
        let from = pos(row, "from_lonx", "from_laty")?;
        let to = pos(row, "to_lonx", "to_laty")?;
        let bounding = if row.has_column("left_lonx") {
            Rect::new(
                row.float("left_lonx")?,
                row.float("bottom_laty")?,
                row.float("right_lonx")?,
                row.float("top_laty")?,
            )
        } else {
            bounding_of(&[from, to])
        };

        Ok(Airway {
            id: row.int("airway_id")?,
            name: row.text("airway_name")?.to_string(),
            kind: row.text("airway_type")?.to_string(),
            fragment: row.int32("airway_fragment_no")?,
            sequence: row.int32("sequence_no")?,
            from_waypoint_id: row.int("from_waypoint_id")?,
            to_waypoint_id: row.int("to_waypoint_id")?,
            direction: row.text("direction")?.to_string(),
            min_altitude: opt_int32(row, "minimum_altitude")?.unwrap_or(0),
            max_altitude: opt_int32(row, "maximum_altitude")?.unwrap_or(0),
            from,
            to,
            bounding,
        })
    }

    fn airspace(&self, row: &Row) -> Result<Airspace, RowError> {
        Ok(Airspace {
            id: row.int("boundary_id")?,
            kind: AirspaceType::from_db_code(row.text("type")?),
            name: row.text("name")?.to_string(),
            com_type: row.text("com_type")?.to_string(),
            com_frequency: opt_int32(row, "com_frequency")?.filter(|f| *f > 0),
            com_name: row.text("com_name")?.to_string(),
            min_altitude_type: row.text("min_altitude_type")?.to_string(),
            max_altitude_type: row.text("max_altitude_type")?.to_string(),
            min_altitude: opt_int32(row, "min_altitude")?.unwrap_or(0),
            max_altitude: opt_int32(row, "max_altitude")?.unwrap_or(0),
            // max_lonx < min_lonx for boundaries crossing the antimeridian
            bounding: Rect::new(
                row.float("min_lonx")?,
                row.float("min_laty")?,
                row.float("max_lonx")?,
                row.float("max_laty")?,
            ),
        })
    }

    fn runway(&self, row: &Row) -> Result<Runway, RowError> {
        Ok(Runway {
            airport_id: row.int("airport_id")?,
            length: row.int32("length")?,
            heading: row.float("heading")?,
            position: pos(row, "lonx", "laty")?,
            primary: pos(row, "primary_lonx", "primary_laty")?,
            secondary: pos(row, "secondary_lonx", "secondary_laty")?,
        })
    }
}
