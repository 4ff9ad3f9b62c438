//! Configuration for the grid processor.

use serde::{Deserialize, Serialize};

/// Pre-downsampled variant first, full resolution second.
pub const DEFAULT_SOURCES: &[&str] = &["bathy_RTopo_ds.json", "bathy_RTopo.json"];

/// Configuration for the grid processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridProcessorConfig {
    /// Maximum number of bathymetry points kept after loading.
    pub point_budget: usize,

    /// Number of resampling index maps kept per resampler.
    pub index_cache_capacity: usize,

    /// Sources larger than this are skipped with a warning.
    pub max_source_bytes: u64,

    /// Depths at or above this value (metres, negative down) count as dry.
    pub dry_threshold_m: f32,

    /// Bathymetry sources tried in order until one loads.
    pub source_order: Vec<String>,
}

impl Default for GridProcessorConfig {
    fn default() -> Self {
        Self {
            point_budget: 250_000,
            index_cache_capacity: 24,
            max_source_bytes: 256 * 1024 * 1024,
            dry_threshold_m: -0.5,
            source_order: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GridProcessorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("BATHY_POINT_BUDGET") {
            if let Ok(budget) = val.parse() {
                config.point_budget = budget;
            }
        }

        if let Ok(val) = std::env::var("INDEX_CACHE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                config.index_cache_capacity = capacity;
            }
        }

        if let Ok(val) = std::env::var("BATHY_MAX_SOURCE_BYTES") {
            if let Ok(bytes) = val.parse() {
                config.max_source_bytes = bytes;
            }
        }

        if let Ok(val) = std::env::var("BATHY_DRY_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.dry_threshold_m = threshold;
            }
        }

        if let Ok(val) = std::env::var("BATHY_SOURCES") {
            let sources: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !sources.is_empty() {
                config.source_order = sources;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.point_budget < 4 {
            return Err("point_budget must be >= 4".to_string());
        }

        if self.index_cache_capacity == 0 {
            return Err("index_cache_capacity must be > 0".to_string());
        }

        if self.max_source_bytes == 0 {
            return Err("max_source_bytes must be > 0".to_string());
        }

        if !self.dry_threshold_m.is_finite() || self.dry_threshold_m > 0.0 {
            return Err("dry_threshold_m must be a finite value <= 0".to_string());
        }

        Ok(())
    }
}
