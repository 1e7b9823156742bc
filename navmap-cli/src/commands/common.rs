//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use navmap::config::config_file_path;
use navmap::{
    DataSource, KindMask, MapEntity, MapObjectKind, MapQuery, QueryConfig, SqliteDatastore,
};

use crate::error::CliError;

/// Map object kind selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ObjectKind {
    Airport,
    Vor,
    Ndb,
    Waypoint,
    Marker,
    Ils,
    Airway,
    Airspace,
}

impl From<ObjectKind> for MapObjectKind {
    fn from(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Airport => MapObjectKind::Airport,
            ObjectKind::Vor => MapObjectKind::Vor,
            ObjectKind::Ndb => MapObjectKind::Ndb,
            ObjectKind::Waypoint => MapObjectKind::Waypoint,
            ObjectKind::Marker => MapObjectKind::Marker,
            ObjectKind::Ils => MapObjectKind::Ils,
            ObjectKind::Airway => MapObjectKind::Airway,
            ObjectKind::Airspace => MapObjectKind::Airspace,
        }
    }
}

/// Union of the masks of `kinds`.
pub fn kind_mask(kinds: &[ObjectKind]) -> KindMask {
    kinds
        .iter()
        .map(|k| MapObjectKind::from(*k).mask())
        .fold(KindMask::empty(), |mask, m| mask | m)
}

/// Airport tier selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum AirportSource {
    /// Every airport with full detail
    #[default]
    All,
    /// Airports with runways over 4000 ft
    Medium,
    /// Airports with runways over 8000 ft
    Large,
}

impl From<AirportSource> for DataSource {
    fn from(source: AirportSource) -> Self {
        match source {
            AirportSource::All => DataSource::All,
            AirportSource::Medium => DataSource::Medium,
            AirportSource::Large => DataSource::Large,
        }
    }
}

/// Load the query configuration, from `path` or the default location.
pub fn load_config(path: Option<&Path>) -> Result<QueryConfig, CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    Ok(QueryConfig::load_from(&path)?)
}

/// Open the navigation database and prepare the query layer.
pub fn open_query(
    db: Option<&Path>,
    config: QueryConfig,
) -> Result<MapQuery<SqliteDatastore>, CliError> {
    let path: PathBuf = db.map(Path::to_path_buf).ok_or(CliError::NoDatabase)?;
    let datastore = SqliteDatastore::open(&path).map_err(CliError::Database)?;
    tracing::debug!(path = %path.display(), "Opened navigation database");
    Ok(MapQuery::new(datastore, config))
}

/// Print entities one per line, followed by a count.
pub fn print_entities<I>(entities: I)
where
    I: IntoIterator<Item = MapEntity>,
{
    let mut count = 0;
    for entity in entities {
        println!("{:<9} {}", entity.kind().name(), entity);
        count += 1;
    }
    println!("{} found", count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mask_union() {
        let mask = kind_mask(&[ObjectKind::Vor, ObjectKind::Ndb]);
        assert_eq!(mask, KindMask::VOR | KindMask::NDB);
        assert!(kind_mask(&[]).is_empty());
    }

    #[test]
    fn test_airway_kind_covers_both_airway_types() {
        let mask = kind_mask(&[ObjectKind::Airway]);
        assert!(mask.intersects(KindMask::AIRWAY_V | KindMask::AIRWAY_J));
    }

    #[test]
    fn test_open_without_database_fails() {
        let result = open_query(None, QueryConfig::default());
        assert!(matches!(result, Err(CliError::NoDatabase)));
    }

    #[test]
    fn test_load_missing_config_returns_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = load_config(Some(&temp.path().join("missing.ini"))).unwrap();
        assert_eq!(config, QueryConfig::default());
    }
}
