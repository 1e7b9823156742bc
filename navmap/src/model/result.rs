//! Aggregate results.
//!
//! [`SearchResult`] owns its entities. [`PickResult`] borrows entities from
//! the viewport caches together with their screen distance and is only valid
//! until the next mutating call on the query layer.

use std::fmt;

use super::{
    Airport, Airspace, Airway, Helipad, Ils, MapObjectKind, Marker, Ndb, Parking, Vor, Waypoint,
};

/// Entities grouped by kind, owned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResult {
    pub airports: Vec<Airport>,
    pub vors: Vec<Vor>,
    pub ndbs: Vec<Ndb>,
    pub waypoints: Vec<Waypoint>,
    pub markers: Vec<Marker>,
    pub ils: Vec<Ils>,
    pub airways: Vec<Airway>,
    pub airspaces: Vec<Airspace>,
    /// Airports whose tower was hit in diagram mode
    pub towers: Vec<Airport>,
    pub parkings: Vec<Parking>,
    pub helipads: Vec<Helipad>,
}

impl SearchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entities.
    pub fn len(&self) -> usize {
        self.airports.len()
            + self.vors.len()
            + self.ndbs.len()
            + self.waypoints.len()
            + self.markers.len()
            + self.ils.len()
            + self.airways.len()
            + self.airspaces.len()
            + self.towers.len()
            + self.parkings.len()
            + self.helipads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a single entity to the list of its kind.
    pub fn push(&mut self, entity: MapEntity) {
        match entity {
            MapEntity::Airport(e) => self.airports.push(e),
            MapEntity::Vor(e) => self.vors.push(e),
            MapEntity::Ndb(e) => self.ndbs.push(e),
            MapEntity::Waypoint(e) => self.waypoints.push(e),
            MapEntity::Marker(e) => self.markers.push(e),
            MapEntity::Ils(e) => self.ils.push(e),
            MapEntity::Airway(e) => self.airways.push(e),
            MapEntity::Airspace(e) => self.airspaces.push(e),
            MapEntity::Parking(e) => self.parkings.push(e),
            MapEntity::Helipad(e) => self.helipads.push(e),
        }
    }

    /// Iterate all entities except towers as [`MapEntity`] values.
    pub fn entities(&self) -> impl Iterator<Item = MapEntity> + '_ {
        self.airports
            .iter()
            .cloned()
            .map(MapEntity::Airport)
            .chain(self.vors.iter().cloned().map(MapEntity::Vor))
            .chain(self.ndbs.iter().cloned().map(MapEntity::Ndb))
            .chain(self.waypoints.iter().cloned().map(MapEntity::Waypoint))
            .chain(self.markers.iter().cloned().map(MapEntity::Marker))
            .chain(self.ils.iter().cloned().map(MapEntity::Ils))
            .chain(self.airways.iter().cloned().map(MapEntity::Airway))
            .chain(self.airspaces.iter().cloned().map(MapEntity::Airspace))
            .chain(self.parkings.iter().cloned().map(MapEntity::Parking))
            .chain(self.helipads.iter().cloned().map(MapEntity::Helipad))
    }
}

/// A borrowed entity with its screen distance in pixels.
#[derive(Debug, PartialEq)]
pub struct Ranked<'a, T> {
    pub entity: &'a T,
    pub distance: i32,
}

impl<T> Clone for Ranked<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ranked<'_, T> {}

/// Entities near a screen point, borrowed from the caches.
///
/// Every list is sorted ascending by screen distance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PickResult<'a> {
    pub airports: Vec<Ranked<'a, Airport>>,
    pub vors: Vec<Ranked<'a, Vor>>,
    pub ndbs: Vec<Ranked<'a, Ndb>>,
    pub waypoints: Vec<Ranked<'a, Waypoint>>,
    pub markers: Vec<Ranked<'a, Marker>>,
    pub ils: Vec<Ranked<'a, Ils>>,
    /// Airports ranked by the distance to their tower
    pub towers: Vec<Ranked<'a, Airport>>,
    pub parkings: Vec<Ranked<'a, Parking>>,
    pub helipads: Vec<Ranked<'a, Helipad>>,
}

impl<'a> PickResult<'a> {
    pub fn len(&self) -> usize {
        self.airports.len()
            + self.vors.len()
            + self.ndbs.len()
            + self.waypoints.len()
            + self.markers.len()
            + self.ils.len()
            + self.towers.len()
            + self.parkings.len()
            + self.helipads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the picked entities into an owning result.
    pub fn to_owned_result(&self) -> SearchResult {
        fn owned<T: Clone>(list: &[Ranked<'_, T>]) -> Vec<T> {
            list.iter().map(|r| r.entity.clone()).collect()
        }

        SearchResult {
            airports: owned(&self.airports),
            vors: owned(&self.vors),
            ndbs: owned(&self.ndbs),
            waypoints: owned(&self.waypoints),
            markers: owned(&self.markers),
            ils: owned(&self.ils),
            airways: Vec::new(),
            airspaces: Vec::new(),
            towers: owned(&self.towers),
            parkings: owned(&self.parkings),
            helipads: owned(&self.helipads),
        }
    }
}

/// Any single entity.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEntity {
    Airport(Airport),
    Vor(Vor),
    Ndb(Ndb),
    Waypoint(Waypoint),
    Marker(Marker),
    Ils(Ils),
    Airway(Airway),
    Airspace(Airspace),
    Parking(Parking),
    Helipad(Helipad),
}

impl MapEntity {
    pub fn kind(&self) -> MapObjectKind {
        match self {
            MapEntity::Airport(_) => MapObjectKind::Airport,
            MapEntity::Vor(_) => MapObjectKind::Vor,
            MapEntity::Ndb(_) => MapObjectKind::Ndb,
            MapEntity::Waypoint(_) => MapObjectKind::Waypoint,
            MapEntity::Marker(_) => MapObjectKind::Marker,
            MapEntity::Ils(_) => MapObjectKind::Ils,
            MapEntity::Airway(_) => MapObjectKind::Airway,
            MapEntity::Airspace(_) => MapObjectKind::Airspace,
            MapEntity::Parking(_) => MapObjectKind::Parking,
            MapEntity::Helipad(_) => MapObjectKind::Helipad,
        }
    }
}

impl fmt::Display for MapEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapEntity::Airport(e) => fmt::Display::fmt(e, f),
            MapEntity::Vor(e) => fmt::Display::fmt(e, f),
            MapEntity::Ndb(e) => fmt::Display::fmt(e, f),
            MapEntity::Waypoint(e) => fmt::Display::fmt(e, f),
            MapEntity::Marker(e) => fmt::Display::fmt(e, f),
            MapEntity::Ils(e) => fmt::Display::fmt(e, f),
            MapEntity::Airway(e) => fmt::Display::fmt(e, f),
            MapEntity::Airspace(e) => fmt::Display::fmt(e, f),
            MapEntity::Parking(e) => write!(f, "parking {} {} at {}", e.name, e.number, e.position),
            MapEntity::Helipad(e) => write!(f, "helipad {} at {}", e.kind, e.position),
        }
    }
}

/// A cached viewport list of one kind, borrowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntitySlice<'a> {
    Airports(&'a [Airport]),
    Vors(&'a [Vor]),
    Ndbs(&'a [Ndb]),
    Waypoints(&'a [Waypoint]),
    Markers(&'a [Marker]),
    Ils(&'a [Ils]),
    Airways(&'a [Airway]),
    Airspaces(&'a [Airspace]),
}

impl EntitySlice<'_> {
    pub fn len(&self) -> usize {
        match self {
            EntitySlice::Airports(s) => s.len(),
            EntitySlice::Vors(s) => s.len(),
            EntitySlice::Ndbs(s) => s.len(),
            EntitySlice::Waypoints(s) => s.len(),
            EntitySlice::Markers(s) => s.len(),
            EntitySlice::Ils(s) => s.len(),
            EntitySlice::Airways(s) => s.len(),
            EntitySlice::Airspaces(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone the borrowed entities into owned values.
    pub fn to_entities(&self) -> Vec<MapEntity> {
        match self {
            EntitySlice::Airports(s) => s.iter().cloned().map(MapEntity::Airport).collect(),
            EntitySlice::Vors(s) => s.iter().cloned().map(MapEntity::Vor).collect(),
            EntitySlice::Ndbs(s) => s.iter().cloned().map(MapEntity::Ndb).collect(),
            EntitySlice::Waypoints(s) => s.iter().cloned().map(MapEntity::Waypoint).collect(),
            EntitySlice::Markers(s) => s.iter().cloned().map(MapEntity::Marker).collect(),
            EntitySlice::Ils(s) => s.iter().cloned().map(MapEntity::Ils).collect(),
            EntitySlice::Airways(s) => s.iter().cloned().map(MapEntity::Airway).collect(),
            EntitySlice::Airspaces(s) => s.iter().cloned().map(MapEntity::Airspace).collect(),
        }
    }
}
