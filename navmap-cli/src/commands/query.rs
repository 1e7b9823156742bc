//! Query commands: viewport, ident, nearest and airway lookups.

use navmap::{
    AirspaceFilter, AirspaceTypes, AltitudeFilter, Datastore, MapEntity, MapLayer, MapObjectKind,
    MapQuery, Pos, Rect,
};

use super::common::{kind_mask, print_entities, AirportSource, ObjectKind};
use crate::error::CliError;

/// Arguments of the `rect` command.
#[derive(Debug, Clone)]
pub struct RectArgs {
    pub kind: ObjectKind,
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    pub source: AirportSource,
    pub min_runway: i32,
    pub below: Option<i32>,
    pub above: Option<i32>,
}

/// Print every object of one kind inside a rectangle.
///
/// A west bound greater than the east bound selects a rectangle crossing
/// the antimeridian.
pub fn run_rect<D: Datastore>(query: &mut MapQuery<D>, args: &RectArgs) -> Result<(), CliError> {
    if !(-90.0..=90.0).contains(&args.south) || !(-90.0..=90.0).contains(&args.north) {
        return Err(CliError::InvalidArgument(
            "latitudes must be within -90..90".to_string(),
        ));
    }
    if args.south > args.north {
        return Err(CliError::InvalidArgument(format!(
            "south {} is north of north {}",
            args.south, args.north
        )));
    }

    let rect = Rect::new(args.west, args.south, args.east, args.north);
    let layer = MapLayer::new(args.source.into()).with_min_runway_length(args.min_runway);
    let kind = MapObjectKind::from(args.kind);

    let entities = if kind == MapObjectKind::Airspace {
        let altitude = match (args.below, args.above) {
            (Some(_), Some(_)) => {
                return Err(CliError::InvalidArgument(
                    "--below and --above are exclusive".to_string(),
                ))
            }
            (Some(alt), None) => AltitudeFilter::Below(alt),
            (None, Some(alt)) => AltitudeFilter::Above(alt),
            (None, None) => AltitudeFilter::None,
        };
        let filter = AirspaceFilter::new(AirspaceTypes::all(), altitude);
        query
            .airspaces(&rect, &layer, &filter, false)
            .iter()
            .cloned()
            .map(MapEntity::Airspace)
            .collect()
    } else {
        query
            .entities_in_viewport(kind, &rect, &layer, false)
            .map(|slice| slice.to_entities())
            .unwrap_or_default()
    };

    print_entities(entities);
    Ok(())
}

/// Print objects matching an ident, optionally sorted by distance.
#[allow(clippy::too_many_arguments)]
pub fn run_ident<D: Datastore>(
    query: &mut MapQuery<D>,
    kinds: &[ObjectKind],
    ident: &str,
    region: &str,
    airport: &str,
    near: Option<Pos>,
    max_distance: Option<f64>,
) -> Result<(), CliError> {
    let mask = if kinds.is_empty() {
        kind_mask(&[
            ObjectKind::Airport,
            ObjectKind::Vor,
            ObjectKind::Ndb,
            ObjectKind::Waypoint,
            ObjectKind::Ils,
        ])
    } else {
        kind_mask(kinds)
    };

    let result = match near {
        Some(pos) => query.entities_by_ident_near(mask, ident, region, airport, &pos, max_distance),
        None => query.entities_by_ident(mask, ident, region, airport),
    };

    print_entities(result.entities());
    Ok(())
}

/// Print the object of one kind nearest to a position.
pub fn run_nearest<D: Datastore>(
    query: &mut MapQuery<D>,
    kind: ObjectKind,
    pos: Pos,
) -> Result<(), CliError> {
    let kind = MapObjectKind::from(kind);
    if !matches!(
        kind,
        MapObjectKind::Airport | MapObjectKind::Vor | MapObjectKind::Ndb | MapObjectKind::Waypoint
    ) {
        return Err(CliError::InvalidArgument(format!(
            "nearest supports airport, vor, ndb and waypoint, not {}",
            kind
        )));
    }

    print_entities(query.nearest(kind, &pos));
    Ok(())
}

/// Print the ordered waypoints of an airway.
pub fn run_airway<D: Datastore>(query: &mut MapQuery<D>, name: &str) -> Result<(), CliError> {
    let waypoints = query.airway_waypoints(name);
    if waypoints.is_empty() {
        println!("No airway named {}", name);
        return Ok(());
    }

    let mut fragment = None;
    for entry in &waypoints {
        if fragment != Some(entry.fragment) {
            println!("Fragment {}", entry.fragment);
            fragment = Some(entry.fragment);
        }
        println!(
            "  {:>3}  {:<6} {}",
            entry.sequence, entry.waypoint.ident, entry.waypoint.position
        );
    }
    Ok(())
}
