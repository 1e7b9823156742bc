//! Screen picking over the already-populated viewport caches.
//!
//! Nothing here touches the datastore. Each candidate is projected to screen
//! coordinates and kept if its L1 pixel distance to the pick point is below
//! the radius. Lists are scanned back to front because later entries are
//! drawn on top; with equal distances they therefore rank first.

use std::collections::{HashMap, HashSet};

use crate::geo::{manhattan_distance, Pos};
use crate::model::{
    Airport, Helipad, Ils, KindMask, MapLayer, MapObject, Marker, Ndb, Parking, PickResult,
    Ranked, Vor, Waypoint,
};

/// Converts world positions to screen pixels.
pub trait Projector {
    /// Screen coordinates of `pos`, or `None` if it is not visible.
    fn world_to_screen(&self, pos: &Pos) -> Option<(i32, i32)>;
}

impl<F> Projector for F
where
    F: Fn(&Pos) -> Option<(i32, i32)>,
{
    fn world_to_screen(&self, pos: &Pos) -> Option<(i32, i32)> {
        self(pos)
    }
}

/// Parking spots and helipads of one airport diagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramFeatures {
    pub parkings: Vec<Parking>,
    pub helipads: Vec<Helipad>,
}

/// Cached lists a pick is evaluated against.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickSources<'a> {
    pub airports: &'a [Airport],
    pub vors: &'a [Vor],
    pub ndbs: &'a [Ndb],
    pub waypoints: &'a [Waypoint],
    pub markers: &'a [Marker],
    pub ils: &'a [Ils],
    pub diagrams: Option<&'a HashMap<i64, DiagramFeatures>>,
}

/// A pick point and radius together with the projection used.
pub struct ProximityIndex<'p, P: ?Sized> {
    projector: &'p P,
    x: i32,
    y: i32,
    radius: i32,
}

impl<'p, P: Projector + ?Sized> ProximityIndex<'p, P> {
    pub fn new(projector: &'p P, x: i32, y: i32, radius: i32) -> Self {
        Self {
            projector,
            x,
            y,
            radius,
        }
    }

    /// Screen distance of `pos` if it is strictly inside the radius.
    pub fn distance(&self, pos: &Pos) -> Option<i32> {
        let (sx, sy) = self.projector.world_to_screen(pos)?;
        let distance = manhattan_distance(sx, sy, self.x, self.y);
        (distance < self.radius).then_some(distance)
    }

    /// Collect every entity of `kinds` near the pick point.
    pub fn pick<'a>(
        &self,
        sources: PickSources<'a>,
        kinds: KindMask,
        layer: &MapLayer,
    ) -> PickResult<'a> {
        let mut result = PickResult::default();
        if self.radius <= 0 {
            return result;
        }
        let wanted = |mask: KindMask| kinds.intersects(mask) && layer.shows(mask);

        if wanted(KindMask::AIRPORT) {
            self.scan(sources.airports, &mut result.airports, |_| true);

            if layer.airport_diagram {
                for airport in sources.airports.iter().rev() {
                    let tower = airport.tower_position.and_then(|t| self.distance(&t));
                    if let Some(distance) = tower {
                        insert_sorted(&mut result.towers, Ranked { entity: airport, distance });
                    }
                }

                if let Some(diagrams) = sources.diagrams {
                    for airport in sources.airports.iter().rev() {
                        if let Some(features) = diagrams.get(&airport.id) {
                            self.scan(&features.parkings, &mut result.parkings, |_| true);
                            self.scan(&features.helipads, &mut result.helipads, |_| true);
                        }
                    }
                }
            }
        }

        if wanted(KindMask::VOR) {
            self.scan(sources.vors, &mut result.vors, |_| true);
        }
        if wanted(KindMask::NDB) {
            self.scan(sources.ndbs, &mut result.ndbs, |_| true);
        }

        let victor = wanted(KindMask::AIRWAY_V);
        let jet = wanted(KindMask::AIRWAY_J);
        if wanted(KindMask::WAYPOINT) {
            self.scan(sources.waypoints, &mut result.waypoints, |_| true);
        }
        if victor || jet {
            self.scan(sources.waypoints, &mut result.waypoints, |w| {
                (victor && w.has_victor_airways()) || (jet && w.has_jet_airways())
            });
        }

        if wanted(KindMask::MARKER) {
            self.scan(sources.markers, &mut result.markers, |_| true);
        }
        if wanted(KindMask::ILS) {
            self.scan(sources.ils, &mut result.ils, |_| true);
        }

        tracing::trace!(x = self.x, y = self.y, radius = self.radius, found = result.len(), "Pick");
        result
    }

    /// Rank `entries` back to front into `out`, skipping ids already in it.
    fn scan<'a, T: MapObject>(
        &self,
        entries: &'a [T],
        out: &mut Vec<Ranked<'a, T>>,
        include: impl Fn(&T) -> bool,
    ) {
        let mut seen: HashSet<i64> = out.iter().map(|r| r.entity.id()).collect();
        for entity in entries.iter().rev() {
            if !include(entity) || seen.contains(&entity.id()) {
                continue;
            }
            if let Some(distance) = self.distance(&entity.position()) {
                seen.insert(entity.id());
                insert_sorted(out, Ranked { entity, distance });
            }
        }
    }
}

/// Insert after every entry with a distance less than or equal to the new one.
fn insert_sorted<'a, T>(list: &mut Vec<Ranked<'a, T>>, ranked: Ranked<'a, T>) {
    let index = list.partition_point(|r| r.distance <= ranked.distance);
    list.insert(index, ranked);
}
