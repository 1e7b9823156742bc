//! NavMap - Cached map queries over a navigation database
//!
//! This library answers the questions a moving map asks while the user pans
//! and zooms: which airports, navaids, airways and airspaces are inside the
//! viewport, what is under the mouse pointer, and what matches an ident.
//!
//! Viewport answers are fetched for an enlarged rectangle and reused while
//! the view stays inside it. Rectangles crossing the antimeridian are split
//! into two range queries.
//!
//! # Modules
//!
//! - [`geo`]: positions, dateline-aware rectangles and viewport inflation
//! - [`datastore`]: the relational datastore seam and its SQLite implementation
//! - [`model`]: navigation entities, layers and result aggregates
//! - [`factory`]: row to entity conversion
//! - [`query`]: prepared statements, per-kind caches and [`MapQuery`]
//! - [`config`]: tunables and INI persistence
//! - [`debounce`]: the refresh timer for interactive panning
//! - [`logging`]: subscriber setup for binaries

pub mod config;
pub mod datastore;
pub mod debounce;
pub mod factory;
pub mod geo;
pub mod logging;
pub mod model;
pub mod query;

pub use config::{ConfigFileError, QueryConfig};
pub use datastore::{Datastore, DatastoreError, Row, SqliteDatastore, Value};
pub use debounce::RefreshDebouncer;
pub use factory::{DefaultEntityFactory, EntityFactory};
pub use geo::{Pos, Rect, ViewportNormalizer};
pub use model::{
    AirspaceFilter, AirspaceTypes, AltitudeFilter, DataSource, KindMask, MapEntity, MapLayer,
    MapObjectKind, PickResult, SearchResult,
};
pub use query::{DiagramFeatures, LineString, MapQuery, Projector};
