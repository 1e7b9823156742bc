//! Tunables for the map query layer.
//!
//! [`QueryConfig`] is an explicit value handed to [`crate::query::MapQuery`]
//! at construction and threaded into every sub-cache. Values read from a
//! configuration file are clamped into sane bounds rather than rejected.

mod file;

pub use file::{config_file_path, ConfigFileError};

// ==================== Defaults ====================

/// Default relative enlargement of query rectangles.
pub const DEFAULT_RECT_INFLATION_FACTOR: f64 = 0.3;

/// Default number of degrees added to every query rectangle edge.
pub const DEFAULT_RECT_INFLATION_INCREMENT: f64 = 0.1;

/// Default maximum number of rows returned by a single statement.
pub const DEFAULT_ROW_LIMIT: usize = 5000;

/// Default capacity of the airspace geometry cache (one unit per boundary).
pub const DEFAULT_GEOMETRY_CACHE_SIZE: u64 = 10_000;

/// Default capacity of the runway overview cache (one unit per airport).
pub const DEFAULT_OVERVIEW_CACHE_SIZE: u64 = 1_000;

// ==================== Bounds ====================

/// Smallest accepted inflation factor.
pub const MIN_RECT_INFLATION_FACTOR: f64 = 0.0;
/// Largest accepted inflation factor.
pub const MAX_RECT_INFLATION_FACTOR: f64 = 2.0;
/// Smallest accepted inflation increment in degrees.
pub const MIN_RECT_INFLATION_INCREMENT: f64 = 0.0;
/// Largest accepted inflation increment in degrees.
pub const MAX_RECT_INFLATION_INCREMENT: f64 = 5.0;
/// Smallest accepted row limit.
pub const MIN_ROW_LIMIT: usize = 1;
/// Largest accepted row limit.
pub const MAX_ROW_LIMIT: usize = 1_000_000;
/// Smallest accepted cache capacity.
pub const MIN_CACHE_SIZE: u64 = 1;
/// Largest accepted cache capacity.
pub const MAX_CACHE_SIZE: u64 = 1_000_000;

/// Configuration for the map query layer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// Query rectangles are scaled by `1 + rect_inflation_factor`.
    ///
    /// Default: 0.3
    pub rect_inflation_factor: f64,

    /// Degrees added to every query rectangle edge after scaling.
    ///
    /// Default: 0.1°
    pub rect_inflation_increment: f64,

    /// Row cap appended to every row-returning statement.
    ///
    /// Bounds latency and memory for pathological viewports.
    /// Default: 5000
    pub row_limit: usize,

    /// Capacity of the decoded airspace geometry cache.
    ///
    /// Default: 10000
    pub geometry_cache_size: u64,

    /// Capacity of the runway overview cache.
    ///
    /// Default: 1000
    pub overview_cache_size: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            rect_inflation_factor: DEFAULT_RECT_INFLATION_FACTOR,
            rect_inflation_increment: DEFAULT_RECT_INFLATION_INCREMENT,
            row_limit: DEFAULT_ROW_LIMIT,
            geometry_cache_size: DEFAULT_GEOMETRY_CACHE_SIZE,
            overview_cache_size: DEFAULT_OVERVIEW_CACHE_SIZE,
        }
    }
}

impl QueryConfig {
    /// Set the rectangle inflation factor.
    pub fn with_rect_inflation_factor(mut self, factor: f64) -> Self {
        self.rect_inflation_factor = factor;
        self
    }

    /// Set the rectangle inflation increment in degrees.
    pub fn with_rect_inflation_increment(mut self, increment: f64) -> Self {
        self.rect_inflation_increment = increment;
        self
    }

    /// Set the row limit.
    pub fn with_row_limit(mut self, row_limit: usize) -> Self {
        self.row_limit = row_limit;
        self
    }

    /// Set the geometry cache capacity.
    pub fn with_geometry_cache_size(mut self, size: u64) -> Self {
        self.geometry_cache_size = size;
        self
    }

    /// Set the overview cache capacity.
    pub fn with_overview_cache_size(mut self, size: u64) -> Self {
        self.overview_cache_size = size;
        self
    }

    /// Return a copy with every value clamped into its accepted range.
    ///
    /// Out-of-range values are logged and replaced by the nearest bound.
    /// Non-finite floating point values fall back to their defaults.
    pub fn clamped(&self) -> Self {
        Self {
            rect_inflation_factor: clamp_f64(
                "rect_inflation_factor",
                self.rect_inflation_factor,
                MIN_RECT_INFLATION_FACTOR,
                MAX_RECT_INFLATION_FACTOR,
                DEFAULT_RECT_INFLATION_FACTOR,
            ),
            rect_inflation_increment: clamp_f64(
                "rect_inflation_increment",
                self.rect_inflation_increment,
                MIN_RECT_INFLATION_INCREMENT,
                MAX_RECT_INFLATION_INCREMENT,
                DEFAULT_RECT_INFLATION_INCREMENT,
            ),
            row_limit: clamp_ord("row_limit", self.row_limit, MIN_ROW_LIMIT, MAX_ROW_LIMIT),
            geometry_cache_size: clamp_ord(
                "geometry_cache_size",
                self.geometry_cache_size,
                MIN_CACHE_SIZE,
                MAX_CACHE_SIZE,
            ),
            overview_cache_size: clamp_ord(
                "overview_cache_size",
                self.overview_cache_size,
                MIN_CACHE_SIZE,
                MAX_CACHE_SIZE,
            ),
        }
    }

    /// Build the viewport normalizer for these settings.
    pub fn normalizer(&self) -> crate::geo::ViewportNormalizer {
        crate::geo::ViewportNormalizer::new(
            self.rect_inflation_factor,
            self.rect_inflation_increment,
        )
    }
}

fn clamp_f64(key: &str, value: f64, min: f64, max: f64, default: f64) -> f64 {
    if !value.is_finite() {
        tracing::warn!(key, requested = value, default, "non-finite value, using default");
        default
    } else if value < min {
        tracing::warn!(key, requested = value, min, max, "value below minimum, clamping to {}", min);
        min
    } else if value > max {
        tracing::warn!(key, requested = value, min, max, "value above maximum, clamping to {}", max);
        max
    } else {
        value
    }
}

fn clamp_ord<T>(key: &str, value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    if value < min {
        tracing::warn!(
            key,
            requested = %value,
            min = %min,
            max = %max,
            "value below minimum, clamping to {}",
            min
        );
        min
    } else if value > max {
        tracing::warn!(
            key,
            requested = %value,
            min = %min,
            max = %max,
            "value above maximum, clamping to {}",
            max
        );
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueryConfig::default();
        assert_eq!(config.rect_inflation_factor, 0.3);
        assert_eq!(config.rect_inflation_increment, 0.1);
        assert_eq!(config.row_limit, 5000);
        assert_eq!(config.geometry_cache_size, 10_000);
        assert_eq!(config.overview_cache_size, 1_000);
    }

    #[test]
    fn test_builder_pattern() {
        let config = QueryConfig::default()
            .with_rect_inflation_factor(0.5)
            .with_rect_inflation_increment(0.2)
            .with_row_limit(100)
            .with_geometry_cache_size(20)
            .with_overview_cache_size(30);

        assert_eq!(config.rect_inflation_factor, 0.5);
        assert_eq!(config.rect_inflation_increment, 0.2);
        assert_eq!(config.row_limit, 100);
        assert_eq!(config.geometry_cache_size, 20);
        assert_eq!(config.overview_cache_size, 30);
    }

    #[test]
    fn test_clamped_keeps_valid_values() {
        let config = QueryConfig::default();
        assert_eq!(config.clamped(), config);
    }

    #[test]
    fn test_clamped_limits_out_of_range_values() {
        let config = QueryConfig::default()
            .with_rect_inflation_factor(-1.0)
            .with_rect_inflation_increment(50.0)
            .with_row_limit(0)
            .with_geometry_cache_size(u64::MAX)
            .with_overview_cache_size(0)
            .clamped();

        assert_eq!(config.rect_inflation_factor, MIN_RECT_INFLATION_FACTOR);
        assert_eq!(config.rect_inflation_increment, MAX_RECT_INFLATION_INCREMENT);
        assert_eq!(config.row_limit, MIN_ROW_LIMIT);
        assert_eq!(config.geometry_cache_size, MAX_CACHE_SIZE);
        assert_eq!(config.overview_cache_size, MIN_CACHE_SIZE);
    }

    #[test]
    fn test_clamped_replaces_non_finite_values() {
        let config = QueryConfig::default()
            .with_rect_inflation_factor(f64::NAN)
            .clamped();
        assert_eq!(config.rect_inflation_factor, DEFAULT_RECT_INFLATION_FACTOR);
    }

    #[test]
    fn test_clamped_is_idempotent() {
        let once = QueryConfig::default().with_row_limit(10_000_000).clamped();
        assert_eq!(once.clamped(), once);
    }

    #[test]
    fn test_normalizer_uses_config_values() {
        let normalizer = QueryConfig::default()
            .with_rect_inflation_factor(0.5)
            .normalizer();
        assert_eq!(normalizer.factor(), 0.5);
        assert_eq!(normalizer.increment(), 0.1);
    }
}
