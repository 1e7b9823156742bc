//! Geographic primitives for chart queries.
//!
//! Provides positions and latitude/longitude rectangles that understand the
//! antimeridian, plus the L1 ("manhattan") distance helpers used for nearest
//! lookups and screen picking.
//!
//! Longitudes are degrees in `[-180, 180]`, latitudes degrees in `[-90, 90]`.
//! A rectangle whose `west` is greater than its `east` wraps across the ±180°
//! seam.

mod viewport;

pub use viewport::{QueryRects, ViewportNormalizer};

/// Smallest longitude.
pub const MIN_LON: f64 = -180.0;
/// Largest longitude.
pub const MAX_LON: f64 = 180.0;
/// Smallest latitude.
pub const MIN_LAT: f64 = -90.0;
/// Largest latitude.
pub const MAX_LAT: f64 = 90.0;

/// Tolerance used for rectangle containment comparisons.
const EPSILON: f64 = 1e-9;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pos {
    /// Longitude (x) in degrees
    pub lon: f64,
    /// Latitude (y) in degrees
    pub lat: f64,
}

impl Pos {
    /// Create a new position from longitude and latitude.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Approximate distance to another position as the sum of absolute
    /// coordinate differences in degrees.
    ///
    /// This is deliberately not a geodesic distance. Nearest-object lookups
    /// order candidates by this value, exactly like the datastore does.
    pub fn manhattan_distance(&self, other: &Pos) -> f64 {
        (self.lon - other.lon).abs() + (self.lat - other.lat).abs()
    }

    /// Returns true if both coordinates are finite and inside world bounds.
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (MIN_LON..=MAX_LON).contains(&self.lon)
            && (MIN_LAT..=MAX_LAT).contains(&self.lat)
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.lon, self.lat)
    }
}

/// L1 distance between two screen points in pixels, saturating at `i32::MAX`.
#[inline]
pub fn manhattan_distance(x1: i32, y1: i32, x2: i32, y2: i32) -> i32 {
    let distance = u64::from(x1.abs_diff(x2)) + u64::from(y1.abs_diff(y2));
    i32::try_from(distance).unwrap_or(i32::MAX)
}

/// Normalize a longitude into `[-180, 180]`.
///
/// Values already in range are returned unchanged, so `180.0` stays `180.0`.
pub fn normalize_lon(lon: f64) -> f64 {
    if (MIN_LON..=MAX_LON).contains(&lon) {
        lon
    } else {
        let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
        if wrapped == MIN_LON && lon > 0.0 {
            MAX_LON
        } else {
            wrapped
        }
    }
}

/// A latitude/longitude bounding rectangle.
///
/// `west > east` denotes a rectangle crossing the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Western longitude in degrees
    pub west: f64,
    /// Southern latitude in degrees
    pub south: f64,
    /// Eastern longitude in degrees
    pub east: f64,
    /// Northern latitude in degrees
    pub north: f64,
}

impl Rect {
    /// Create a rectangle from its four bounds.
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The whole world.
    pub const fn world() -> Self {
        Self::new(MIN_LON, MIN_LAT, MAX_LON, MAX_LAT)
    }

    /// A zero-area rectangle at a single position.
    pub const fn from_pos(pos: Pos) -> Self {
        Self::new(pos.lon, pos.lat, pos.lon, pos.lat)
    }

    /// Returns true if the rectangle wraps across the ±180° seam.
    pub fn crosses_dateline(&self) -> bool {
        self.west > self.east
    }

    /// Longitudinal extent in degrees, taking the seam into account.
    pub fn width(&self) -> f64 {
        if self.crosses_dateline() {
            self.east - self.west + 360.0
        } else {
            self.east - self.west
        }
    }

    /// Latitudinal extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Returns true if the rectangle spans all longitudes.
    pub fn spans_all_longitudes(&self) -> bool {
        self.width() >= 360.0 - EPSILON
    }

    /// Center of the rectangle, normalized to valid longitude.
    pub fn center(&self) -> Pos {
        Pos::new(
            normalize_lon(self.west + self.width() / 2.0),
            (self.south + self.north) / 2.0,
        )
    }

    /// Returns true if `pos` lies inside the rectangle (bounds inclusive).
    pub fn contains_pos(&self, pos: &Pos) -> bool {
        if pos.lat < self.south - EPSILON || pos.lat > self.north + EPSILON {
            return false;
        }
        if self.spans_all_longitudes() {
            return true;
        }
        if self.crosses_dateline() {
            pos.lon >= self.west - EPSILON || pos.lon <= self.east + EPSILON
        } else {
            pos.lon >= self.west - EPSILON && pos.lon <= self.east + EPSILON
        }
    }

    /// Returns true if `other` lies completely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        if other.south < self.south - EPSILON || other.north > self.north + EPSILON {
            return false;
        }
        if self.spans_all_longitudes() {
            return true;
        }
        if other.width() > self.width() + EPSILON {
            return false;
        }

        // Unwrap both longitude intervals so that this one starts at its west edge
        let start = self.west;
        let end = start + self.width();
        let mut other_start = other.west;
        if other_start < start - EPSILON {
            other_start += 360.0;
        }
        let other_end = other_start + other.width();
        other_start >= start - EPSILON && other_end <= end + EPSILON
    }

    /// Returns true if both rectangles share at least one point.
    pub fn intersects(&self, other: &Rect) -> bool {
        if other.south > self.north + EPSILON || other.north < self.south - EPSILON {
            return false;
        }
        if self.spans_all_longitudes() || other.spans_all_longitudes() {
            return true;
        }

        let start = self.west;
        let end = start + self.width();
        [-360.0, 0.0, 360.0].iter().any(|shift| {
            let other_start = other.west + shift;
            let other_end = other_start + other.width();
            other_start <= end + EPSILON && other_end >= start - EPSILON
        })
    }

    /// Clamp latitudes into `[-90, 90]` and longitudes into `[-180, 180]`.
    ///
    /// Clamping is idempotent.
    pub fn clamped(&self) -> Rect {
        Rect::new(
            self.west.clamp(MIN_LON, MAX_LON),
            self.south.clamp(MIN_LAT, MAX_LAT),
            self.east.clamp(MIN_LON, MAX_LON),
            self.north.clamp(MIN_LAT, MAX_LAT),
        )
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[W {:.4}, S {:.4}, E {:.4}, N {:.4}]",
            self.west, self.south, self.east, self.north
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_manhattan_distance() {
        let a = Pos::new(10.0, 50.0);
        let b = Pos::new(12.0, 47.0);
        assert_eq!(a.manhattan_distance(&b), 5.0);
        assert_eq!(b.manhattan_distance(&a), 5.0);
    }

    #[test]
    fn test_screen_manhattan_distance() {
        assert_eq!(manhattan_distance(0, 0, 3, -4), 7);
        assert_eq!(manhattan_distance(5, 5, 5, 5), 0);
    }

    #[test]
    fn test_screen_manhattan_distance_saturates() {
        assert_eq!(manhattan_distance(i32::MAX, 0, i32::MIN, 0), i32::MAX);
        assert_eq!(manhattan_distance(i32::MIN, i32::MIN, i32::MAX, i32::MAX), i32::MAX);
        assert_eq!(manhattan_distance(i32::MAX - 1, 0, i32::MAX, 0), 1);
    }

    #[test]
    fn test_normalize_lon() {
        assert_eq!(normalize_lon(180.0), 180.0);
        assert_eq!(normalize_lon(-180.0), -180.0);
        assert!((normalize_lon(181.3) - (-178.7)).abs() < 1e-9);
        assert!((normalize_lon(-181.0) - 179.0).abs() < 1e-9);
        assert_eq!(normalize_lon(540.0), 180.0);
    }

    #[test]
    fn test_width_across_dateline() {
        let rect = Rect::new(179.0, 0.0, -179.0, 1.0);
        assert!(rect.crosses_dateline());
        assert!((rect.width() - 2.0).abs() < 1e-9);
        let center = rect.center();
        assert!((center.lon.abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_plain() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains(&Rect::new(1.0, 1.0, 9.0, 9.0)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&Rect::new(-1.0, 1.0, 9.0, 9.0)));
        assert!(!outer.contains(&Rect::new(1.0, 1.0, 9.0, 11.0)));
    }

    #[test]
    fn test_contains_across_dateline() {
        let outer = Rect::new(170.0, -10.0, -170.0, 10.0);
        assert!(outer.contains(&Rect::new(175.0, 0.0, 179.0, 5.0)));
        assert!(outer.contains(&Rect::new(-179.0, 0.0, -175.0, 5.0)));
        assert!(outer.contains(&Rect::new(178.0, 0.0, -178.0, 5.0)));
        assert!(!outer.contains(&Rect::new(160.0, 0.0, 175.0, 5.0)));
        // A plain rectangle around Greenwich is not inside a Pacific rectangle
        assert!(!outer.contains(&Rect::new(-1.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_world_contains_everything() {
        let world = Rect::world();
        assert!(world.contains(&Rect::new(179.0, 0.0, -179.0, 1.0)));
        assert!(world.contains(&Rect::new(-10.0, -90.0, 10.0, 90.0)));
    }

    #[test]
    fn test_intersects_plain_and_wrapped() {
        let viewport = Rect::new(175.0, -5.0, 180.0, 5.0);
        let wrapped = Rect::new(178.0, -1.0, -178.0, 1.0);
        assert!(viewport.intersects(&wrapped));
        assert!(wrapped.intersects(&viewport));

        let east_side = Rect::new(-180.0, -5.0, -175.0, 5.0);
        assert!(east_side.intersects(&wrapped));

        let far_away = Rect::new(0.0, -5.0, 10.0, 5.0);
        assert!(!far_away.intersects(&wrapped));
        assert!(!far_away.intersects(&Rect::new(20.0, -5.0, 30.0, 5.0)));
    }

    #[test]
    fn test_intersects_requires_latitude_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 20.0, 10.0, 30.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_contains_pos() {
        let wrapped = Rect::new(170.0, -10.0, -170.0, 10.0);
        assert!(wrapped.contains_pos(&Pos::new(175.0, 0.0)));
        assert!(wrapped.contains_pos(&Pos::new(-175.0, 0.0)));
        assert!(!wrapped.contains_pos(&Pos::new(0.0, 0.0)));
        assert!(!wrapped.contains_pos(&Pos::new(175.0, 20.0)));
    }

    #[test]
    fn test_clamped_is_idempotent() {
        let rect = Rect::new(-200.0, -95.0, 190.0, 91.0);
        let once = rect.clamped();
        assert_eq!(once, Rect::world());
        assert_eq!(once.clamped(), once);
    }

    #[test]
    fn test_pos_is_valid() {
        assert!(Pos::new(180.0, 90.0).is_valid());
        assert!(!Pos::new(180.1, 0.0).is_valid());
        assert!(!Pos::new(f64::NAN, 0.0).is_valid());
    }
}
