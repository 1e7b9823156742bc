//! Entity types returned by the query layer.

use std::fmt;

use super::{AirspaceType, MapObject, MapObjectKind};
use crate::geo::{Pos, Rect};

/// An airport.
///
/// Overview rows (medium/large airport tiers) carry only part of the
/// attributes; `overview` is set for those.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Airport {
    pub id: i64,
    pub ident: String,
    pub name: String,
    pub rating: i32,
    pub position: Pos,
    pub bounding: Rect,
    /// Feet
    pub longest_runway_length: i32,
    /// Degrees true
    pub longest_runway_heading: i32,
    /// kHz, `None` if the airport has no tower
    pub tower_frequency: Option<i32>,
    pub mag_var: f64,
    pub closed: bool,
    pub military: bool,
    pub addon: bool,
    pub hard_runways: i32,
    pub soft_runways: i32,
    pub water_runways: i32,
    pub helipads: i32,
    pub avgas: bool,
    pub jetfuel: bool,
    /// Tower position for airport diagrams; absent on overview rows
    pub tower_position: Option<Pos>,
    pub overview: bool,
}

impl Airport {
    /// Returns true if the airport has only helipads.
    pub fn is_heliport(&self) -> bool {
        self.helipads > 0
            && self.hard_runways == 0
            && self.soft_runways == 0
            && self.water_runways == 0
    }
}

impl MapObject for Airport {
    const KIND: MapObjectKind = MapObjectKind::Airport;

    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> Pos {
        self.position
    }

    fn bounding(&self) -> Option<Rect> {
        Some(self.bounding)
    }
}

impl fmt::Display for Airport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at {}", self.ident, self.name, self.position)
    }
}

/// A VOR, VORTAC or DME station.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vor {
    pub id: i64,
    pub ident: String,
    pub name: String,
    pub region: String,
    pub kind: String,
    /// kHz
    pub frequency: i32,
    pub channel: String,
    /// Nautical miles
    pub range: i32,
    pub dme_only: bool,
    pub has_dme: bool,
    pub mag_var: f64,
    pub altitude: Option<i32>,
    pub position: Pos,
}

impl MapObject for Vor {
    const KIND: MapObjectKind = MapObjectKind::Vor;

    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> Pos {
        self.position
    }
}

impl fmt::Display for Vor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) {:.2} MHz at {}",
            self.ident,
            self.name,
            self.region,
            f64::from(self.frequency) / 1000.0,
            self.position
        )
    }
}

/// A non-directional beacon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ndb {
    pub id: i64,
    pub ident: String,
    pub name: String,
    pub region: String,
    pub kind: String,
    /// 0.01 kHz
    pub frequency: i32,
    pub range: i32,
    pub mag_var: f64,
    pub altitude: Option<i32>,
    pub position: Pos,
}

impl MapObject for Ndb {
    const KIND: MapObjectKind = MapObjectKind::Ndb;

    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> Pos {
        self.position
    }
}

impl fmt::Display for Ndb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) {:.1} kHz at {}",
            self.ident,
            self.name,
            self.region,
            f64::from(self.frequency) / 100.0,
            self.position
        )
    }
}

/// An enroute or terminal waypoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Waypoint {
    pub id: i64,
    pub ident: String,
    pub region: String,
    pub kind: String,
    pub victor_airways: i32,
    pub jet_airways: i32,
    pub mag_var: f64,
    pub position: Pos,
    /// Id of the VOR or NDB this waypoint is based on
    pub nav_id: Option<i64>,
}

impl Waypoint {
    pub fn has_victor_airways(&self) -> bool {
        self.victor_airways > 0
    }

    pub fn has_jet_airways(&self) -> bool {
        self.jet_airways > 0
    }
}

impl MapObject for Waypoint {
    const KIND: MapObjectKind = MapObjectKind::Waypoint;

    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> Pos {
        self.position
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at {}", self.ident, self.region, self.position)
    }
}

/// A marker beacon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Marker {
    pub id: i64,
    pub kind: String,
    pub ident: String,
    pub heading: f64,
    pub position: Pos,
}

impl MapObject for Marker {
    const KIND: MapObjectKind = MapObjectKind::Marker;

    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> Pos {
        self.position
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} marker {} at {}", self.kind, self.ident, self.position)
    }
}

/// An instrument landing system localizer with its feather geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ils {
    pub id: i64,
    pub ident: String,
    pub name: String,
    pub region: String,
    pub airport_ident: String,
    pub mag_var: f64,
    pub loc_heading: f64,
    pub gs_pitch: Option<f64>,
    /// kHz
    pub frequency: i32,
    pub range: i32,
    pub dme_range: Option<i32>,
    pub width: f64,
    pub end1: Pos,
    pub end_mid: Pos,
    pub end2: Pos,
    pub altitude: Option<i32>,
    pub position: Pos,
    pub bounding: Rect,
}

impl MapObject for Ils {
    const KIND: MapObjectKind = MapObjectKind::Ils;

    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> Pos {
        self.position
    }

    fn bounding(&self) -> Option<Rect> {
        Some(self.bounding)
    }
}

impl fmt::Display for Ils {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) {:.2} MHz",
            self.ident,
            self.name,
            self.airport_ident,
            f64::from(self.frequency) / 1000.0
        )
    }
}

/// One segment of an airway between two waypoints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Airway {
    pub id: i64,
    pub name: String,
    /// `V` victor, `J` jet or `B` both
    pub kind: String,
    pub fragment: i32,
    pub sequence: i32,
    pub from_waypoint_id: i64,
    pub to_waypoint_id: i64,
    pub direction: String,
    pub min_altitude: i32,
    pub max_altitude: i32,
    pub from: Pos,
    pub to: Pos,
    /// May wrap across the antimeridian
    pub bounding: Rect,
}

impl Airway {
    pub fn is_victor(&self) -> bool {
        matches!(self.kind.as_str(), "V" | "B")
    }

    pub fn is_jet(&self) -> bool {
        matches!(self.kind.as_str(), "J" | "B")
    }
}

impl MapObject for Airway {
    const KIND: MapObjectKind = MapObjectKind::Airway;

    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> Pos {
        self.bounding.center()
    }

    fn bounding(&self) -> Option<Rect> {
        Some(self.bounding)
    }
}

impl fmt::Display for Airway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) segment {}.{} {} -> {}",
            self.name, self.kind, self.fragment, self.sequence, self.from, self.to
        )
    }
}

/// An airspace boundary without its outline.
///
/// The outline is fetched separately through the geometry cache.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Airspace {
    pub id: i64,
    pub kind: AirspaceType,
    pub name: String,
    pub com_type: String,
    pub com_frequency: Option<i32>,
    pub com_name: String,
    pub min_altitude_type: String,
    pub max_altitude_type: String,
    /// Feet
    pub min_altitude: i32,
    /// Feet
    pub max_altitude: i32,
    /// May wrap across the antimeridian
    pub bounding: Rect,
}

impl MapObject for Airspace {
    const KIND: MapObjectKind = MapObjectKind::Airspace;

    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> Pos {
        self.bounding.center()
    }

    fn bounding(&self) -> Option<Rect> {
        Some(self.bounding)
    }
}

impl fmt::Display for Airspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}-{} ft",
            self.kind, self.name, self.min_altitude, self.max_altitude
        )
    }
}

/// A parking spot or gate shown in airport diagrams.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parking {
    pub id: i64,
    pub airport_id: i64,
    pub kind: String,
    pub name: String,
    pub number: i32,
    pub radius: f64,
    pub heading: f64,
    pub jetway: bool,
    pub position: Pos,
}

impl MapObject for Parking {
    const KIND: MapObjectKind = MapObjectKind::Parking;

    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> Pos {
        self.position
    }
}

/// A helipad shown in airport diagrams.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Helipad {
    pub id: i64,
    pub airport_id: i64,
    pub kind: String,
    pub closed: bool,
    pub position: Pos,
}

impl MapObject for Helipad {
    const KIND: MapObjectKind = MapObjectKind::Helipad;

    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> Pos {
        self.position
    }
}

/// A simplified runway for the airport overview layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Runway {
    pub airport_id: i64,
    /// Feet
    pub length: i32,
    pub heading: f64,
    pub position: Pos,
    pub primary: Pos,
    pub secondary: Pos,
}

/// A waypoint in the ordered list of an airway.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AirwayWaypoint {
    pub airway_id: i64,
    pub fragment: i32,
    pub sequence: i32,
    pub waypoint: Waypoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airway_kind_flags() {
        let mut airway = Airway {
            kind: "B".to_string(),
            ..Default::default()
        };
        assert!(airway.is_victor() && airway.is_jet());
        airway.kind = "J".to_string();
        assert!(!airway.is_victor() && airway.is_jet());
    }

    #[test]
    fn test_airway_position_is_bounding_center() {
        let airway = Airway {
            bounding: Rect::new(179.0, 0.0, -179.0, 2.0),
            ..Default::default()
        };
        let pos = airway.position();
        assert!((pos.lon.abs() - 180.0).abs() < 1e-9);
        assert_eq!(pos.lat, 1.0);
    }

    #[test]
    fn test_heliport() {
        let airport = Airport {
            helipads: 2,
            ..Default::default()
        };
        assert!(airport.is_heliport());
    }

    #[test]
    fn test_waypoint_airway_flags() {
        let waypoint = Waypoint {
            victor_airways: 1,
            ..Default::default()
        };
        assert!(waypoint.has_victor_airways());
        assert!(!waypoint.has_jet_airways());
    }
}
