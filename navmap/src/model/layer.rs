//! Level-of-detail descriptor and per-kind cache compatibility keys.

use super::{KindMask, MapObjectKind};

/// Airport data tier used for a viewport fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataSource {
    /// Every airport, filtered by minimum runway length.
    #[default]
    All,
    /// Overview rows of airports with runways over 4000 ft.
    Medium,
    /// Overview rows of airports with runways over 8000 ft.
    Large,
}

/// Level of detail of the map at the current zoom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLayer {
    /// Kinds shown on this layer.
    pub visible: KindMask,
    pub data_source: DataSource,
    /// Feet; airports with shorter longest runways are omitted.
    pub min_runway_length: i32,
    /// Airport diagrams are drawn (towers, parking, helipads).
    pub airport_diagram: bool,
}

impl Default for MapLayer {
    fn default() -> Self {
        Self {
            visible: KindMask::ALL,
            data_source: DataSource::All,
            min_runway_length: 0,
            airport_diagram: false,
        }
    }
}

impl MapLayer {
    pub fn new(data_source: DataSource) -> Self {
        Self {
            data_source,
            ..Self::default()
        }
    }

    pub fn with_visible(mut self, visible: KindMask) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_min_runway_length(mut self, feet: i32) -> Self {
        self.min_runway_length = feet;
        self
    }

    pub fn with_airport_diagram(mut self, diagram: bool) -> Self {
        self.airport_diagram = diagram;
        self
    }

    /// Returns true if any of the given kinds is shown.
    pub fn shows(&self, kinds: KindMask) -> bool {
        self.visible.intersects(kinds)
    }

    /// The layer parameters a viewport fetch of `kind` depends on.
    pub fn query_key(&self, kind: MapObjectKind) -> QueryKey {
        match kind {
            MapObjectKind::Airport => QueryKey::Airport {
                data_source: self.data_source,
                min_runway_length: self.min_runway_length,
            },
            MapObjectKind::Airway => QueryKey::Airway,
            MapObjectKind::Airspace => QueryKey::Airspace,
            other => QueryKey::Point(other),
        }
    }
}

/// Layer parameters a cached list was fetched with.
///
/// Two keys are compatible when a list fetched for one can be reused for
/// the other without a new query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Airport statement variant and its bound runway length.
    Airport {
        data_source: DataSource,
        min_runway_length: i32,
    },
    /// Point navaids: one statement regardless of layer.
    Point(MapObjectKind),
    Airway,
    /// Airspace filter keys are tracked separately.
    Airspace,
}

impl QueryKey {
    pub fn is_compatible(&self, other: &QueryKey) -> bool {
        self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airport_key_depends_on_runway_length() {
        let a = MapLayer::new(DataSource::All).with_min_runway_length(2000);
        let b = MapLayer::new(DataSource::All).with_min_runway_length(4000);
        let key_a = a.query_key(MapObjectKind::Airport);
        assert!(key_a.is_compatible(&a.query_key(MapObjectKind::Airport)));
        assert!(!key_a.is_compatible(&b.query_key(MapObjectKind::Airport)));
    }

    #[test]
    fn test_airport_key_depends_on_data_source() {
        let all = MapLayer::new(DataSource::All).query_key(MapObjectKind::Airport);
        let large = MapLayer::new(DataSource::Large).query_key(MapObjectKind::Airport);
        assert!(!all.is_compatible(&large));
    }

    #[test]
    fn test_navaid_key_ignores_airport_parameters() {
        let a = MapLayer::new(DataSource::All).with_min_runway_length(2000);
        let b = MapLayer::new(DataSource::Large).with_airport_diagram(true);
        assert!(a
            .query_key(MapObjectKind::Vor)
            .is_compatible(&b.query_key(MapObjectKind::Vor)));
        assert!(!a
            .query_key(MapObjectKind::Vor)
            .is_compatible(&a.query_key(MapObjectKind::Ndb)));
    }

    #[test]
    fn test_shows() {
        let layer = MapLayer::default().with_visible(KindMask::VOR | KindMask::NDB);
        assert!(layer.shows(KindMask::VOR));
        assert!(!layer.shows(KindMask::AIRPORT));
    }
}
