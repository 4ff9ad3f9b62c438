//! Fixed payloads for the documented load and resampling scenarios.

/// Ocean-negative grid; loads without a sign flip.
pub const NEGATIVE_BATHY_JSON: &str =
    r#"{"lon":[-25,-24.5],"lat":[62,62.25],"z":[[-2000,-2100],[-1900,-2050]]}"#;

/// Positive-down grid; every value is negated on load.
pub const POSITIVE_BATHY_JSON: &str =
    r#"{"lon":[-25,-24.5],"lat":[62,62.25],"z":[[2000,2100],[1900,2050]]}"#;

/// Land and ocean in one grid.
pub const MIXED_BATHY_JSON: &str =
    r#"{"lon":[-25,-24.5,-24],"lat":[62,62.25],"z":[[-2000,-10,150],[-1900,0,320]]}"#;

/// Second row is one cell short.
pub const RAGGED_BATHY_JSON: &str = r#"{"lon":[0,1],"lat":[0,1],"z":[[1,2],[3]]}"#;

/// `z` is not an array of arrays.
pub const MALFORMED_BATHY_JSON: &str = r#"{"lon":[0,1],"lat":[0,1],"z":"deep"}"#;

/// Resampling scenario: source and target longitudes.
pub mod resampling {
    pub const SOURCE_LON: [f64; 3] = [-10.0, -5.0, 0.0];
    pub const SOURCE_LAT: [f64; 2] = [70.0, 75.0];
    pub const TARGET_LON: [f64; 5] = [-10.0, -7.0, -4.0, -1.0, 2.0];
    /// Expected source longitude for each target longitude.
    pub const EXPECTED_LON: [f64; 5] = [-10.0, -5.0, -5.0, 0.0, 0.0];
}

/// Bounding boxes as `(min_lon, min_lat, max_lon, max_lat)`.
pub mod bbox {
    pub const NORDIC_SEAS: (f64, f64, f64, f64) = (-30.0, 60.0, 20.0, 80.0);
    pub const ICELAND_BASIN: (f64, f64, f64, f64) = (-30.0, 58.0, -15.0, 64.0);
    /// Zero span in both directions.
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);
}
