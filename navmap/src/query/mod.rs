//! Map query layer.
//!
//! [`MapQuery`] answers the renderer's questions about navigation features:
//! what is inside the viewport, what has this id or ident, what is nearest
//! to a position and what is under the mouse. Viewport answers are kept per
//! kind in a [`SpatialCache`] and reused while the view stays inside the
//! overfetched area.
//!
//! # Error policy
//!
//! Nothing here returns an error. Failed statements and unreadable rows are
//! logged and behave like missing rows, so callers see empty lists or
//! `None`.
//!
//! # Example
//!
//! ```ignore
//! use navmap::{MapQuery, QueryConfig, SqliteDatastore, Rect, MapLayer};
//!
//! let db = SqliteDatastore::open(Path::new("navdata.sqlite"))?;
//! let mut query = MapQuery::new(db, QueryConfig::default());
//! let vors = query.vors(&Rect::new(8.0, 49.0, 10.0, 51.0), &MapLayer::default(), false);
//! ```

mod airspace_filter;
mod geometry;
mod memo;
mod overview;
mod proximity;
mod spatial_cache;
mod statements;

pub use airspace_filter::{sort_by_priority, statement_for, AirspaceFilterState};
pub use geometry::{decode as decode_geometry, GeometryCache, GeometryError, LineString};
pub use memo::{BoundedMemo, MemoStats};
pub use overview::RunwayOverviewCache;
pub use proximity::{DiagramFeatures, PickSources, Projector, ProximityIndex};
pub use spatial_cache::{FetchOrder, SpatialCache};
pub use statements::{rect_params, QueryBuilder, StatementKey, OVERVIEW_MIN_RUNWAY_LENGTH};

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::QueryConfig;
use crate::datastore::{Datastore, Param, Row, RowError, Value};
use crate::factory::{DefaultEntityFactory, EntityFactory};
use crate::geo::{Pos, Rect, ViewportNormalizer};
use crate::model::{
    Airport, Airspace, AirspaceFilter, Airway, AirwayWaypoint, DataSource, EntitySlice, Ils,
    KindMask, MapEntity, MapLayer, MapObject, MapObjectKind, Marker, Ndb, PickResult, Runway,
    SearchResult, Vor, Waypoint,
};

/// Row conversion function of an [`EntityFactory`].
type Convert<F, T> = fn(&F, &Row) -> Result<T, RowError>;

/// Pattern binding that matches any value of a `like` comparison.
const MATCH_ANY: &str = "%";

fn like_or_any(value: &str) -> &str {
    if value.is_empty() {
        MATCH_ANY
    } else {
        value
    }
}

/// Cached viewport queries and lookups over a navigation datastore.
///
/// All methods run synchronously on the caller's thread. Slices returned by
/// the viewport methods and the borrowed [`PickResult`] stay valid until the
/// next `&mut self` call.
pub struct MapQuery<D: Datastore, F: EntityFactory = DefaultEntityFactory> {
    config: QueryConfig,
    normalizer: ViewportNormalizer,
    db: D,
    factory: F,
    builder: QueryBuilder,

    airports: SpatialCache<Airport>,
    vors: SpatialCache<Vor>,
    ndbs: SpatialCache<Ndb>,
    waypoints: SpatialCache<Waypoint>,
    markers: SpatialCache<Marker>,
    ils: SpatialCache<Ils>,
    airways: SpatialCache<Airway>,
    airspaces: SpatialCache<Airspace>,
    airspace_filter: AirspaceFilterState,

    geometry: GeometryCache,
    runway_overview: RunwayOverviewCache,
    diagrams: HashMap<i64, DiagramFeatures>,
}

impl<D: Datastore> MapQuery<D> {
    /// Create a query layer using the standard column layout.
    pub fn new(db: D, config: QueryConfig) -> Self {
        Self::with_factory(db, config, DefaultEntityFactory::new())
    }
}

impl<D: Datastore, F: EntityFactory> MapQuery<D, F> {
    /// Create a query layer with a custom row factory.
    ///
    /// The configuration is clamped and every statement is prepared.
    pub fn with_factory(db: D, config: QueryConfig, factory: F) -> Self {
        let config = config.clamped();
        let mut query = Self {
            normalizer: config.normalizer(),
            builder: QueryBuilder::new(config.row_limit),
            geometry: GeometryCache::new(config.geometry_cache_size),
            runway_overview: RunwayOverviewCache::new(config.overview_cache_size),
            config,
            db,
            factory,
            airports: SpatialCache::new(),
            vors: SpatialCache::new(),
            ndbs: SpatialCache::new(),
            waypoints: SpatialCache::new(),
            markers: SpatialCache::new(),
            ils: SpatialCache::new(),
            airways: SpatialCache::new(),
            airspaces: SpatialCache::new(),
            airspace_filter: AirspaceFilterState::new(),
            diagrams: HashMap::new(),
        };
        query.reload();
        query
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn datastore(&self) -> &D {
        &self.db
    }

    /// Mutable access to the datastore.
    ///
    /// Replacing the connection through this handle is detected on the next
    /// query, which then reloads before running.
    pub fn datastore_mut(&mut self) -> &mut D {
        &mut self.db
    }

    /// Swap in a new datastore and reload; returns the previous one.
    pub fn replace_datastore(&mut self, db: D) -> D {
        self.builder.teardown(&mut self.db);
        let old = std::mem::replace(&mut self.db, db);
        self.reload();
        old
    }

    /// Tear down and re-prepare every statement and clear every cache.
    pub fn reload(&mut self) {
        self.builder.teardown(&mut self.db);
        let failed = self.builder.prepare_all(&mut self.db);

        self.airports.clear();
        self.vors.clear();
        self.ndbs.clear();
        self.waypoints.clear();
        self.markers.clear();
        self.ils.clear();
        self.airways.clear();
        self.airspaces.clear();
        self.airspace_filter.reset();
        self.geometry.clear();
        self.runway_overview.clear();
        self.diagrams.clear();

        tracing::info!(
            generation = self.db.generation(),
            prepared = self.builder.prepared_count(),
            failed,
            "Map query reloaded"
        );
    }

    fn ensure_current(&mut self) {
        if !self.builder.is_current(&self.db) {
            tracing::debug!("Datastore connection changed, reloading");
            self.reload();
        }
    }

    /// Run `key` and convert every row, skipping rows the factory rejects.
    fn fetch<T>(
        &mut self,
        key: StatementKey,
        params: &[Param<'_>],
        convert: Convert<F, T>,
    ) -> Vec<T> {
        let rows = self.builder.run(&mut self.db, key, params);
        rows.iter()
            .filter_map(|row| match convert(&self.factory, row) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    tracing::warn!(statement = ?key, error = %e, "Skipping unreadable row");
                    None
                }
            })
            .collect()
    }

    fn fetch_one<T>(
        &mut self,
        key: StatementKey,
        params: &[Param<'_>],
        convert: Convert<F, T>,
    ) -> Option<T> {
        self.fetch(key, params, convert).into_iter().next()
    }

    /// Run a by-rectangle statement once per antimeridian part of the inflated
    /// request.
    ///
    /// Entities with their own extent are kept only if it intersects the
    /// inflated rectangle.
    fn fetch_in_rect<T: MapObject>(
        &mut self,
        requested: &Rect,
        key: StatementKey,
        extra: &[Param<'_>],
        convert: Convert<F, T>,
    ) -> Vec<T> {
        let inflated = self.normalizer.inflate(requested);
        let rects = self.normalizer.split(&inflated);
        let mut fetched = Vec::new();

        for rect in rects.iter() {
            let mut params: Vec<Param<'_>> = rect_params(rect);
            params.extend(extra.iter().cloned());
            fetched.extend(self.fetch(key, &params, convert));
        }

        fetched.retain(|e: &T| e.bounding().map_or(true, |b| b.intersects(&inflated)));
        tracing::debug!(
            statement = ?key,
            kind = %T::KIND,
            rects = rects.len(),
            count = fetched.len(),
            "Fetched viewport"
        );
        fetched
    }

    // ========================================================================
    // Viewport
    // ========================================================================

    /// Airports in the viewport for the layer's data source.
    ///
    /// Full rows are filtered by the layer's minimum runway length and stored
    /// in reverse rating order, so the most important airports come last.
    pub fn airports(&mut self, rect: &Rect, layer: &MapLayer, lazy: bool) -> &[Airport] {
        self.ensure_current();
        let key = layer.query_key(MapObjectKind::Airport);
        if self.airports.update(rect, key, lazy, &self.normalizer) {
            let (statement, order, convert): (_, _, Convert<F, Airport>) = match layer.data_source
            {
                DataSource::All => (StatementKey::AirportByRect, FetchOrder::Prepend, F::airport),
                DataSource::Medium => (
                    StatementKey::AirportMediumByRect,
                    FetchOrder::Append,
                    F::airport_overview,
                ),
                DataSource::Large => (
                    StatementKey::AirportLargeByRect,
                    FetchOrder::Append,
                    F::airport_overview,
                ),
            };
            let extra: Vec<Param<'_>> = match layer.data_source {
                DataSource::All => vec![(":minlength", Value::from(layer.min_runway_length))],
                DataSource::Medium | DataSource::Large => Vec::new(),
            };
            let fetched = self.fetch_in_rect(rect, statement, &extra, convert);
            self.airports.fill(fetched, order);
        }
        self.airports.entries()
    }

    pub fn vors(&mut self, rect: &Rect, layer: &MapLayer, lazy: bool) -> &[Vor] {
        self.ensure_current();
        let key = layer.query_key(MapObjectKind::Vor);
        if self.vors.update(rect, key, lazy, &self.normalizer) {
            let fetched = self.fetch_in_rect(rect, StatementKey::VorByRect, &[], F::vor);
            self.vors.fill(fetched, FetchOrder::Append);
        }
        self.vors.entries()
    }

    pub fn ndbs(&mut self, rect: &Rect, layer: &MapLayer, lazy: bool) -> &[Ndb] {
        self.ensure_current();
        let key = layer.query_key(MapObjectKind::Ndb);
        if self.ndbs.update(rect, key, lazy, &self.normalizer) {
            let fetched = self.fetch_in_rect(rect, StatementKey::NdbByRect, &[], F::ndb);
            self.ndbs.fill(fetched, FetchOrder::Append);
        }
        self.ndbs.entries()
    }

    pub fn waypoints(&mut self, rect: &Rect, layer: &MapLayer, lazy: bool) -> &[Waypoint] {
        self.ensure_current();
        let key = layer.query_key(MapObjectKind::Waypoint);
        if self.waypoints.update(rect, key, lazy, &self.normalizer) {
            let fetched = self.fetch_in_rect(rect, StatementKey::WaypointByRect, &[], F::waypoint);
            self.waypoints.fill(fetched, FetchOrder::Append);
        }
        self.waypoints.entries()
    }

    pub fn markers(&mut self, rect: &Rect, layer: &MapLayer, lazy: bool) -> &[Marker] {
        self.ensure_current();
        let key = layer.query_key(MapObjectKind::Marker);
        if self.markers.update(rect, key, lazy, &self.normalizer) {
            let fetched = self.fetch_in_rect(rect, StatementKey::MarkerByRect, &[], F::marker);
            self.markers.fill(fetched, FetchOrder::Append);
        }
        self.markers.entries()
    }

    pub fn ils(&mut self, rect: &Rect, layer: &MapLayer, lazy: bool) -> &[Ils] {
        self.ensure_current();
        let key = layer.query_key(MapObjectKind::Ils);
        if self.ils.update(rect, key, lazy, &self.normalizer) {
            let fetched = self.fetch_in_rect(rect, StatementKey::IlsByRect, &[], F::ils);
            self.ils.fill(fetched, FetchOrder::Append);
        }
        self.ils.entries()
    }

    /// Airway segments in the viewport.
    ///
    /// A segment crossing the antimeridian matches both halves of a split
    /// request and is still returned once.
    pub fn airways(&mut self, rect: &Rect, layer: &MapLayer, lazy: bool) -> &[Airway] {
        self.ensure_current();
        let key = layer.query_key(MapObjectKind::Airway);
        if self.airways.update(rect, key, lazy, &self.normalizer) {
            let fetched = self.fetch_in_rect(rect, StatementKey::AirwayByRect, &[], F::airway);
            self.airways.fill(fetched, FetchOrder::Append);
        }
        self.airways.entries()
    }

    /// Airspace boundaries in the viewport, in drawing order.
    ///
    /// A different `filter` than on the previous call empties the list even
    /// for lazy calls.
    pub fn airspaces(
        &mut self,
        rect: &Rect,
        layer: &MapLayer,
        filter: &AirspaceFilter,
        lazy: bool,
    ) -> &[Airspace] {
        self.ensure_current();
        if self.airspace_filter.changed(filter) {
            self.airspaces.clear();
        }

        let key = layer.query_key(MapObjectKind::Airspace);
        if self.airspaces.update(rect, key, lazy, &self.normalizer) {
            let statement = statement_for(filter.altitude);
            let mut fetched = Vec::new();
            for pattern in filter.types.like_patterns() {
                let mut extra: Vec<Param<'_>> = vec![(":type", Value::from(pattern))];
                if let Some(alt) = filter.altitude.altitude() {
                    extra.push((":alt", Value::from(alt)));
                }
                fetched.extend(self.fetch_in_rect(rect, statement, &extra, F::airspace));
            }
            self.airspaces.fill(fetched, FetchOrder::Append);
            self.airspaces.sort_by_key(|a| a.kind.drawing_priority());
        }
        self.airspaces.entries()
    }

    /// Viewport list of any cached kind.
    ///
    /// Airspaces use the filter of the previous airspace fetch. Returns
    /// `None` for kinds without a viewport cache.
    pub fn entities_in_viewport(
        &mut self,
        kind: MapObjectKind,
        rect: &Rect,
        layer: &MapLayer,
        lazy: bool,
    ) -> Option<EntitySlice<'_>> {
        let slice = match kind {
            MapObjectKind::Airport => EntitySlice::Airports(self.airports(rect, layer, lazy)),
            MapObjectKind::Vor => EntitySlice::Vors(self.vors(rect, layer, lazy)),
            MapObjectKind::Ndb => EntitySlice::Ndbs(self.ndbs(rect, layer, lazy)),
            MapObjectKind::Waypoint => EntitySlice::Waypoints(self.waypoints(rect, layer, lazy)),
            MapObjectKind::Marker => EntitySlice::Markers(self.markers(rect, layer, lazy)),
            MapObjectKind::Ils => EntitySlice::Ils(self.ils(rect, layer, lazy)),
            MapObjectKind::Airway => EntitySlice::Airways(self.airways(rect, layer, lazy)),
            MapObjectKind::Airspace => {
                let filter = self.airspace_filter.current().copied().unwrap_or_default();
                EntitySlice::Airspaces(self.airspaces(rect, layer, &filter, lazy))
            }
            MapObjectKind::Parking | MapObjectKind::Helipad => return None,
        };
        Some(slice)
    }

    /// Number of fills of the viewport cache of `kind`.
    pub fn cache_rebuilds(&self, kind: MapObjectKind) -> u64 {
        match kind {
            MapObjectKind::Airport => self.airports.rebuilds(),
            MapObjectKind::Vor => self.vors.rebuilds(),
            MapObjectKind::Ndb => self.ndbs.rebuilds(),
            MapObjectKind::Waypoint => self.waypoints.rebuilds(),
            MapObjectKind::Marker => self.markers.rebuilds(),
            MapObjectKind::Ils => self.ils.rebuilds(),
            MapObjectKind::Airway => self.airways.rebuilds(),
            MapObjectKind::Airspace => self.airspaces.rebuilds(),
            MapObjectKind::Parking | MapObjectKind::Helipad => 0,
        }
    }

    // ========================================================================
    // By id
    // ========================================================================

    pub fn airport_by_id(&mut self, id: i64) -> Option<Airport> {
        self.ensure_current();
        self.fetch_one(StatementKey::AirportById, &[(":id", Value::from(id))], F::airport)
    }

    pub fn vor_by_id(&mut self, id: i64) -> Option<Vor> {
        self.ensure_current();
        self.fetch_one(StatementKey::VorById, &[(":id", Value::from(id))], F::vor)
    }

    pub fn ndb_by_id(&mut self, id: i64) -> Option<Ndb> {
        self.ensure_current();
        self.fetch_one(StatementKey::NdbById, &[(":id", Value::from(id))], F::ndb)
    }

    pub fn waypoint_by_id(&mut self, id: i64) -> Option<Waypoint> {
        self.ensure_current();
        self.fetch_one(StatementKey::WaypointById, &[(":id", Value::from(id))], F::waypoint)
    }

    pub fn ils_by_id(&mut self, id: i64) -> Option<Ils> {
        self.ensure_current();
        self.fetch_one(StatementKey::IlsById, &[(":id", Value::from(id))], F::ils)
    }

    pub fn airway_by_id(&mut self, id: i64) -> Option<Airway> {
        self.ensure_current();
        self.fetch_one(StatementKey::AirwayById, &[(":id", Value::from(id))], F::airway)
    }

    pub fn airspace_by_id(&mut self, id: i64) -> Option<Airspace> {
        self.ensure_current();
        self.fetch_one(StatementKey::AirspaceById, &[(":id", Value::from(id))], F::airspace)
    }

    /// Single entity by kind and id; `None` if missing or the kind has no id lookup.
    pub fn entity_by_id(&mut self, kind: MapObjectKind, id: i64) -> Option<MapEntity> {
        match kind {
            MapObjectKind::Airport => self.airport_by_id(id).map(MapEntity::Airport),
            MapObjectKind::Vor => self.vor_by_id(id).map(MapEntity::Vor),
            MapObjectKind::Ndb => self.ndb_by_id(id).map(MapEntity::Ndb),
            MapObjectKind::Waypoint => self.waypoint_by_id(id).map(MapEntity::Waypoint),
            MapObjectKind::Ils => self.ils_by_id(id).map(MapEntity::Ils),
            MapObjectKind::Airway => self.airway_by_id(id).map(MapEntity::Airway),
            MapObjectKind::Airspace => self.airspace_by_id(id).map(MapEntity::Airspace),
            MapObjectKind::Marker | MapObjectKind::Parking | MapObjectKind::Helipad => None,
        }
    }

    // ========================================================================
    // By ident
    // ========================================================================

    /// Entities of `kinds` matching an ident.
    ///
    /// An empty `region` matches every region. ILS are restricted to
    /// `airport` unless it is empty; airways match `ident` as their name.
    pub fn entities_by_ident(
        &mut self,
        kinds: KindMask,
        ident: &str,
        region: &str,
        airport: &str,
    ) -> SearchResult {
        self.ensure_current();
        let mut result = SearchResult::new();
        let by_region = |ident: &str, region: &str| -> Vec<Param<'static>> {
            vec![(":ident", ident.into()), (":region", like_or_any(region).into())]
        };

        if kinds.contains(KindMask::AIRPORT) {
            let params = [(":ident", Value::from(ident))];
            result.airports = self.fetch(StatementKey::AirportByIdent, &params, F::airport);
        }
        if kinds.contains(KindMask::VOR) {
            result.vors = self.fetch(StatementKey::VorByIdent, &by_region(ident, region), F::vor);
        }
        if kinds.contains(KindMask::NDB) {
            result.ndbs = self.fetch(StatementKey::NdbByIdent, &by_region(ident, region), F::ndb);
        }
        if kinds.contains(KindMask::WAYPOINT) {
            result.waypoints =
                self.fetch(StatementKey::WaypointByIdent, &by_region(ident, region), F::waypoint);
        }
        if kinds.contains(KindMask::ILS) {
            let params: [Param<'_>; 2] = [
                (":ident", ident.into()),
                (":airport", like_or_any(airport).into()),
            ];
            result.ils = self.fetch(StatementKey::IlsByIdent, &params, F::ils);
        }
        if kinds.intersects(KindMask::AIRWAY_V | KindMask::AIRWAY_J) {
            result.airways =
                self.fetch(StatementKey::AirwayByName, &[(":name", Value::from(ident))], F::airway);
        }
        result
    }

    /// Like [`entities_by_ident`](Self::entities_by_ident), with every list
    /// sorted by L1 distance in degrees to `near`. Airway segments are
    /// measured from the center of their bounding rectangle.
    ///
    /// With `max_distance`, entities farther away than it are dropped.
    pub fn entities_by_ident_near(
        &mut self,
        kinds: KindMask,
        ident: &str,
        region: &str,
        airport: &str,
        near: &Pos,
        max_distance: Option<f64>,
    ) -> SearchResult {
        fn by_distance<T: MapObject>(list: &mut Vec<T>, near: &Pos, max: Option<f64>) {
            let distance = |e: &T| e.position().manhattan_distance(near);
            list.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
            if let Some(max) = max {
                list.retain(|e| distance(e) <= max);
            }
        }

        let mut result = self.entities_by_ident(kinds, ident, region, airport);
        by_distance(&mut result.airports, near, max_distance);
        by_distance(&mut result.vors, near, max_distance);
        by_distance(&mut result.ndbs, near, max_distance);
        by_distance(&mut result.waypoints, near, max_distance);
        by_distance(&mut result.ils, near, max_distance);
        by_distance(&mut result.airways, near, max_distance);
        result
    }

    // ========================================================================
    // Nearest
    // ========================================================================

    /// Entity of `kind` nearest to `pos` by L1 distance in degrees.
    ///
    /// Only airports, VORs, NDBs and waypoints support this lookup.
    pub fn nearest(&mut self, kind: MapObjectKind, pos: &Pos) -> Option<MapEntity> {
        self.ensure_current();
        let params = [(":lonx", Value::from(pos.lon)), (":laty", Value::from(pos.lat))];
        match kind {
            MapObjectKind::Airport => self
                .fetch_one(StatementKey::AirportNearest, &params, F::airport)
                .map(MapEntity::Airport),
            MapObjectKind::Vor => self
                .fetch_one(StatementKey::VorNearest, &params, F::vor)
                .map(MapEntity::Vor),
            MapObjectKind::Ndb => self
                .fetch_one(StatementKey::NdbNearest, &params, F::ndb)
                .map(MapEntity::Ndb),
            MapObjectKind::Waypoint => self
                .fetch_one(StatementKey::WaypointNearest, &params, F::waypoint)
                .map(MapEntity::Waypoint),
            _ => None,
        }
    }

    // ========================================================================
    // Related entities
    // ========================================================================

    /// VOR a waypoint is based on.
    pub fn vor_for_waypoint(&mut self, waypoint_id: i64) -> Option<Vor> {
        self.ensure_current();
        self.fetch_one(StatementKey::VorByWaypointId, &[(":id", Value::from(waypoint_id))], F::vor)
    }

    /// NDB a waypoint is based on.
    pub fn ndb_for_waypoint(&mut self, waypoint_id: i64) -> Option<Ndb> {
        self.ensure_current();
        self.fetch_one(StatementKey::NdbByWaypointId, &[(":id", Value::from(waypoint_id))], F::ndb)
    }

    /// Airway segments starting or ending at a waypoint.
    pub fn airways_for_waypoint(&mut self, waypoint_id: i64) -> Vec<Airway> {
        self.ensure_current();
        let params = [(":id", Value::from(waypoint_id))];
        self.fetch(StatementKey::AirwayByWaypointId, &params, F::airway)
    }

    /// Waypoints on airways; empty arguments match anything.
    pub fn waypoints_for_airway(
        &mut self,
        airway_name: &str,
        waypoint_ident: &str,
    ) -> Vec<Waypoint> {
        self.ensure_current();
        let params: [Param<'_>; 2] = [
            (":waypoint", like_or_any(waypoint_ident).into()),
            (":airway", like_or_any(airway_name).into()),
        ];
        self.fetch(StatementKey::AirwayWaypointsByIdent, &params, F::waypoint)
    }

    /// Segment of `airway_name` connecting two waypoint idents in either
    /// direction.
    pub fn airway_by_name_and_waypoints(
        &mut self,
        airway_name: &str,
        ident1: &str,
        ident2: &str,
    ) -> Option<Airway> {
        if airway_name.is_empty() || ident1.is_empty() || ident2.is_empty() {
            return None;
        }
        self.ensure_current();
        let params: [Param<'_>; 3] = [
            (":airway", airway_name.into()),
            (":ident1", ident1.into()),
            (":ident2", ident2.into()),
        ];
        self.fetch_one(StatementKey::AirwayByNameAndWaypoints, &params, F::airway)
    }

    /// Ordered waypoints of an airway.
    ///
    /// Each segment contributes its start waypoint; the last segment of every
    /// fragment also contributes its end waypoint.
    pub fn airway_waypoints(&mut self, airway_name: &str) -> Vec<AirwayWaypoint> {
        self.ensure_current();
        let segments = self.fetch(
            StatementKey::AirwayWaypointsByName,
            &[(":name", Value::from(airway_name))],
            F::airway,
        );

        let mut waypoints = Vec::with_capacity(segments.len() + 1);
        for (i, segment) in segments.iter().enumerate() {
            let fragment_ends = segments
                .get(i + 1)
                .map_or(true, |next| next.fragment != segment.fragment);

            let mut ids = vec![segment.from_waypoint_id];
            if fragment_ends {
                ids.push(segment.to_waypoint_id);
            }

            for id in ids {
                let waypoint = self.waypoint_by_id(id).unwrap_or_else(|| {
                    tracing::warn!(airway = airway_name, waypoint_id = id, "No airway waypoint");
                    Waypoint::default()
                });
                waypoints.push(AirwayWaypoint {
                    airway_id: segment.id,
                    fragment: segment.fragment,
                    sequence: segment.sequence,
                    waypoint,
                });
            }
        }
        waypoints
    }

    // ========================================================================
    // Secondary caches
    // ========================================================================

    /// Decoded outline of an airspace boundary.
    ///
    /// Missing or corrupt geometry yields an empty outline.
    pub fn airspace_geometry(&mut self, boundary_id: i64) -> Arc<LineString> {
        self.ensure_current();
        let Self {
            geometry,
            builder,
            db,
            ..
        } = self;

        geometry.get_or_decode(boundary_id, || {
            let params = [(":id", Value::from(boundary_id))];
            builder
                .run(db, StatementKey::AirspaceGeometryById, &params)
                .into_iter()
                .next()
                .and_then(|row| row.blob("geometry").ok().map(<[u8]>::to_vec))
                .filter(|blob| !blob.is_empty())
        })
    }

    /// Runways longer than the overview threshold of one airport.
    pub fn runways_for_overview(&mut self, airport_id: i64) -> Arc<Vec<Runway>> {
        self.ensure_current();
        if self.runway_overview.contains(airport_id) {
            return self.runway_overview.get_or_fetch(airport_id, Vec::new);
        }

        let runways = self.fetch(
            StatementKey::RunwayOverviewByAirportId,
            &[(":id", Value::from(airport_id))],
            F::runway,
        );
        self.runway_overview.get_or_fetch(airport_id, || runways)
    }

    pub fn geometry_cache(&self) -> &GeometryCache {
        &self.geometry
    }

    pub fn runway_overview_cache(&self) -> &RunwayOverviewCache {
        &self.runway_overview
    }

    /// Register parking and helipads of an airport for diagram picking.
    pub fn set_diagram_features(&mut self, airport_id: i64, features: DiagramFeatures) {
        self.diagrams.insert(airport_id, features);
    }

    pub fn clear_diagram_features(&mut self) {
        self.diagrams.clear();
    }

    // ========================================================================
    // Picking
    // ========================================================================

    /// Entities drawn within `radius` pixels of a screen point.
    ///
    /// Reads the viewport caches only; never queries the datastore.
    pub fn pick<P: Projector + ?Sized>(
        &self,
        projector: &P,
        x: i32,
        y: i32,
        radius: i32,
        kinds: KindMask,
        layer: &MapLayer,
    ) -> PickResult<'_> {
        let sources = PickSources {
            airports: self.airports.entries(),
            vors: self.vors.entries(),
            ndbs: self.ndbs.entries(),
            waypoints: self.waypoints.entries(),
            markers: self.markers.entries(),
            ils: self.ils.entries(),
            diagrams: Some(&self.diagrams),
        };
        ProximityIndex::new(projector, x, y, radius).pick(sources, kinds, layer)
    }
}
