//! Viewport inflation and antimeridian splitting.
//!
//! Every spatial query is run against an *inflated* copy of the requested
//! viewport so that small pans and zooms stay inside the area already
//! fetched. Inflated rectangles that wrap across the ±180° seam are split
//! into two plain rectangles because a `between` predicate on a longitude
//! column cannot express a wrapped range.
//!
//! ```text
//!   requested          inflated                    split
//!  ┌────────┐      ┌──────────────────┐      ┌────────┐│┌─────────┐
//!  │  179°  │ ───► │ 178.6° .. -178.6°│ ───► │ ..180° │││ -180°.. │
//!  └────────┘      └──────────────────┘      └────────┘│└─────────┘
//! ```

use super::{normalize_lon, Rect, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// One or two plain rectangles produced by [`ViewportNormalizer::split`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryRects {
    /// The rectangle does not cross the antimeridian.
    Single(Rect),
    /// Western part bounded at +180° and eastern part bounded at −180°.
    Split(Rect, Rect),
}

impl QueryRects {
    /// Number of rectangles (1 or 2).
    pub fn len(&self) -> usize {
        match self {
            QueryRects::Single(_) => 1,
            QueryRects::Split(_, _) => 2,
        }
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the contained rectangles in query order.
    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        let (first, second) = match self {
            QueryRects::Single(rect) => (rect, None),
            QueryRects::Split(west_of, east_of) => (west_of, Some(east_of)),
        };
        std::iter::once(first).chain(second)
    }
}

/// Inflates requested viewports and splits them at the antimeridian.
///
/// Constructed from the query configuration; there is no process-wide state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportNormalizer {
    factor: f64,
    increment: f64,
}

impl ViewportNormalizer {
    /// Create a normalizer.
    ///
    /// # Arguments
    ///
    /// * `factor` - Relative enlargement; the rectangle is scaled by `1 + factor`
    /// * `increment` - Degrees added to every edge after scaling
    pub fn new(factor: f64, increment: f64) -> Self {
        Self {
            factor: factor.max(0.0),
            increment: increment.max(0.0),
        }
    }

    /// Scale factor applied by [`inflate`](Self::inflate).
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Edge increment applied by [`inflate`](Self::inflate) in degrees.
    pub fn increment(&self) -> f64 {
        self.increment
    }

    /// Scale `rect` by `1 + factor` about its center and push every edge out
    /// by `increment` degrees.
    ///
    /// Latitudes are clamped to ±90°. Scaled longitudes wrap around the seam;
    /// the increment never pushes an edge beyond ±180°. A rectangle that
    /// grows to 360° or more becomes the full longitude range.
    pub fn inflate(&self, rect: &Rect) -> Rect {
        let rect = rect.clamped();
        let scale = 1.0 + self.factor;
        let center = rect.center();

        // Latitude: scale about the center, then widen, clamping at the poles
        let half_height = rect.height().max(0.0) * scale / 2.0;
        let south = (center.lat - half_height - self.increment).max(MIN_LAT);
        let north = (center.lat + half_height + self.increment).min(MAX_LAT);

        let scaled_width = rect.width() * scale;
        if rect.spans_all_longitudes() || scaled_width + 2.0 * self.increment >= 360.0 {
            return Rect::new(MIN_LON, south, MAX_LON, north);
        }

        let mut west = normalize_lon(center.lon - scaled_width / 2.0);
        let mut east = normalize_lon(center.lon + scaled_width / 2.0);

        // Keep the increment from crossing the seam
        west = if west - self.increment < MIN_LON {
            MIN_LON
        } else {
            west - self.increment
        };
        east = if east + self.increment > MAX_LON {
            MAX_LON
        } else {
            east + self.increment
        };

        Rect::new(west, south, east, north).clamped()
    }

    /// Split an already inflated rectangle at the antimeridian.
    ///
    /// Returns the rectangle unchanged if it does not wrap; otherwise a part
    /// bounded at +180° and a part bounded at −180°.
    pub fn split(&self, rect: &Rect) -> QueryRects {
        if rect.crosses_dateline() {
            let west_of = Rect::new(rect.west, rect.south, MAX_LON, rect.north);
            let east_of = Rect::new(MIN_LON, rect.south, rect.east, rect.north);
            QueryRects::Split(west_of, east_of)
        } else {
            QueryRects::Single(*rect)
        }
    }

    /// Inflate then split: the rectangles every spatial query is bound to.
    pub fn query_rects(&self, rect: &Rect) -> QueryRects {
        self.split(&self.inflate(rect))
    }
}

impl Default for ViewportNormalizer {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_RECT_INFLATION_FACTOR,
            crate::config::DEFAULT_RECT_INFLATION_INCREMENT,
        )
    }
}
