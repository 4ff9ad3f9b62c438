//! Named colour-stop sets.
//!
//! Ramps run from the low end of the data range to the high end, so for
//! bathymetry the first stop is the deepest water.

/// Deep ocean (dark) to shelf (pale).
pub const DEEP: &[&str] = &[
    "#281a2c", "#3e3e7a", "#3f5c99", "#3f88a0", "#5bb5a3", "#a5dba5", "#fdfecc",
];

/// Land elevation: lowland green to high ground and snow.
pub const TOPO: &[&str] = &[
    "#dfe8c4", "#b7c98a", "#8fa85c", "#a68a5b", "#7a5c3a", "#f2f2f2",
];

/// Sea temperature.
pub const THERMAL: &[&str] = &[
    "#042333", "#2c3395", "#744992", "#b15f82", "#eb7958", "#fbb43d", "#e8fa5b",
];

/// Salinity.
pub const HALINE: &[&str] = &[
    "#2a186c", "#14439c", "#206e8b", "#3c9387", "#5ab978", "#aad85c", "#fdef9a",
];

/// Sea-ice concentration.
pub const ICE: &[&str] = &[
    "#040613", "#292851", "#3f4b96", "#427bb7", "#61a8c7", "#9cd4da", "#eafdfd",
];

/// Wind / current speed.
pub const SPEED: &[&str] = &[
    "#fffdcd", "#e1cd73", "#aaac20", "#5f920c", "#187328", "#144b2a", "#172313",
];

pub const VIRIDIS: &[&str] = &[
    "#440154", "#414487", "#2a788e", "#22a884", "#7ad151", "#fde725",
];

/// Look up a preset by name (case-insensitive).
pub fn preset_stops(name: &str) -> Option<&'static [&'static str]> {
    match name.to_lowercase().as_str() {
        "deep" | "bathymetry" => Some(DEEP),
        "topo" | "land" => Some(TOPO),
        "thermal" | "temperature" => Some(THERMAL),
        "haline" | "salinity" => Some(HALINE),
        "ice" => Some(ICE),
        "speed" => Some(SPEED),
        "viridis" => Some(VIRIDIS),
        _ => None,
    }
}

/// Names of all presets.
pub fn preset_names() -> &'static [&'static str] {
    &["deep", "topo", "thermal", "haline", "ice", "speed", "viridis"]
}
