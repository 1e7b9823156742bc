//! Map object model.
//!
//! Entities are immutable values built once by the row factory. They are
//! grouped by [`MapObjectKind`]; sets of kinds travel as a [`KindMask`].

mod airspace;
mod entities;
mod layer;
mod result;

pub use airspace::{AirspaceFilter, AirspaceType, AirspaceTypes, AltitudeFilter};
pub use entities::{
    Airport, Airspace, Airway, AirwayWaypoint, Helipad, Ils, Marker, Ndb, Parking, Runway, Vor,
    Waypoint,
};
pub use layer::{DataSource, MapLayer, QueryKey};
pub use result::{EntitySlice, MapEntity, PickResult, Ranked, SearchResult};

use bitflags::bitflags;
use std::fmt;

use crate::geo::{Pos, Rect};

/// Kind of a map object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapObjectKind {
    Airport,
    Vor,
    Ndb,
    Waypoint,
    Marker,
    Ils,
    Airway,
    Airspace,
    Parking,
    Helipad,
}

impl MapObjectKind {
    /// Kinds served by a viewport cache.
    pub const CACHED: [MapObjectKind; 8] = [
        MapObjectKind::Airport,
        MapObjectKind::Vor,
        MapObjectKind::Ndb,
        MapObjectKind::Waypoint,
        MapObjectKind::Marker,
        MapObjectKind::Ils,
        MapObjectKind::Airway,
        MapObjectKind::Airspace,
    ];

    /// Lowercase name, also accepted by [`MapObjectKind::parse`].
    pub fn name(&self) -> &'static str {
        match self {
            MapObjectKind::Airport => "airport",
            MapObjectKind::Vor => "vor",
            MapObjectKind::Ndb => "ndb",
            MapObjectKind::Waypoint => "waypoint",
            MapObjectKind::Marker => "marker",
            MapObjectKind::Ils => "ils",
            MapObjectKind::Airway => "airway",
            MapObjectKind::Airspace => "airspace",
            MapObjectKind::Parking => "parking",
            MapObjectKind::Helipad => "helipad",
        }
    }

    /// Parse a kind name, case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        [
            MapObjectKind::Airport,
            MapObjectKind::Vor,
            MapObjectKind::Ndb,
            MapObjectKind::Waypoint,
            MapObjectKind::Marker,
            MapObjectKind::Ils,
            MapObjectKind::Airway,
            MapObjectKind::Airspace,
            MapObjectKind::Parking,
            MapObjectKind::Helipad,
        ]
        .into_iter()
        .find(|kind| kind.name() == name)
    }

    /// The mask bit selecting this kind.
    pub fn mask(&self) -> KindMask {
        match self {
            MapObjectKind::Airport | MapObjectKind::Parking | MapObjectKind::Helipad => {
                KindMask::AIRPORT
            }
            MapObjectKind::Vor => KindMask::VOR,
            MapObjectKind::Ndb => KindMask::NDB,
            MapObjectKind::Waypoint => KindMask::WAYPOINT,
            MapObjectKind::Marker => KindMask::MARKER,
            MapObjectKind::Ils => KindMask::ILS,
            MapObjectKind::Airway => KindMask::AIRWAY_V | KindMask::AIRWAY_J,
            MapObjectKind::Airspace => KindMask::AIRSPACE,
        }
    }
}

impl fmt::Display for MapObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// A set of map object kinds.
    ///
    /// `AIRWAY_V` and `AIRWAY_J` select victor and jet airways and, when
    /// picking, waypoints that are part of such airways.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KindMask: u32 {
        const AIRPORT = 1 << 0;
        const VOR = 1 << 1;
        const NDB = 1 << 2;
        const WAYPOINT = 1 << 3;
        const MARKER = 1 << 4;
        const ILS = 1 << 5;
        const AIRWAY_V = 1 << 6;
        const AIRWAY_J = 1 << 7;
        const AIRSPACE = 1 << 8;
        const ALL = Self::AIRPORT.bits()
            | Self::VOR.bits()
            | Self::NDB.bits()
            | Self::WAYPOINT.bits()
            | Self::MARKER.bits()
            | Self::ILS.bits()
            | Self::AIRWAY_V.bits()
            | Self::AIRWAY_J.bits()
            | Self::AIRSPACE.bits();
    }
}

/// Common accessors of every entity type.
pub trait MapObject {
    /// Kind of this entity type.
    const KIND: MapObjectKind;

    /// Database id.
    fn id(&self) -> i64;

    /// Reference position used for distance and picking.
    fn position(&self) -> Pos;

    /// Own bounding rectangle, if the entity has an extent.
    fn bounding(&self) -> Option<Rect> {
        None
    }
}
