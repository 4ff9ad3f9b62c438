//! Nearest-neighbour resampling onto the bathymetry grid.
//!
//! A field defined on its own lon/lat axes is mapped onto the target grid
//! through a precomputed [`IndexMap`]: one nearest source column per target
//! longitude and one nearest source row per target latitude. Building the
//! map costs O(target) binary searches; applying it is a plain gather.

use std::sync::Arc;

use ocean_common::{BoundedCache, BoundingBox, CacheStats, CoordinateAxis, ValueGrid};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GridProcessorConfig;
use crate::error::Result;
use crate::normalize::Bathymetry;

// ============================================================================
// Index maps
// ============================================================================

/// Nearest source index for every target column and row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    pub lon: Vec<usize>,
    pub lat: Vec<usize>,
}

impl IndexMap {
    /// Build the map from source axes onto target axes.
    pub fn build(
        source_lon: &CoordinateAxis,
        source_lat: &CoordinateAxis,
        target_lon: &CoordinateAxis,
        target_lat: &CoordinateAxis,
    ) -> Self {
        Self {
            lon: nearest_indices(source_lon, target_lon),
            lat: nearest_indices(source_lat, target_lat),
        }
    }

    pub fn width(&self) -> usize {
        self.lon.len()
    }

    pub fn height(&self) -> usize {
        self.lat.len()
    }
}

fn nearest_indices(source: &CoordinateAxis, target: &CoordinateAxis) -> Vec<usize> {
    target
        .values()
        .iter()
        .map(|&t| source.nearest_index(t))
        .collect()
}

// ============================================================================
// Masking
// ============================================================================

/// Per-field masking flags.
///
/// Rules are evaluated in a fixed order: non-finite source value, zero as
/// missing, outside the declared bounds, then zero on a dry bathymetry cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskRules {
    /// Treat an exact 0 as missing (land-filled exports).
    pub zero_as_missing: bool,
    /// Mask exact zeros whose co-located bathymetry cell is dry.
    pub mask_dry: bool,
    /// Declared data extent; target cells outside it are missing.
    pub bounds: Option<BoundingBox>,
}

#[inline]
fn mask_cell(value: f32, lon: f64, lat: f64, dry: bool, rules: &MaskRules) -> f32 {
    if !value.is_finite() {
        return f32::NAN;
    }
    if rules.zero_as_missing && value == 0.0 {
        return f32::NAN;
    }
    if let Some(bounds) = &rules.bounds {
        if !bounds.contains(lon, lat) {
            return f32::NAN;
        }
    }
    // Non-zero values are never masked by bathymetry.
    if rules.mask_dry && value == 0.0 && dry {
        return f32::NAN;
    }
    value
}

/// Gather `source` through `map` onto the target axes and apply `rules`.
///
/// `seabed` supplies the target geometry depths and the dry threshold; it is
/// only consulted for the dry-cell rule.
pub fn resample_scalar(
    source: &ValueGrid,
    map: &IndexMap,
    target_lon: &CoordinateAxis,
    target_lat: &CoordinateAxis,
    rules: &MaskRules,
    seabed: Option<(&[f32], f32)>,
) -> Vec<f32> {
    let width = target_lon.len();
    let mut out = Vec::with_capacity(width * target_lat.len());

    for (j, &lat) in target_lat.values().iter().enumerate() {
        let src_row = source.row(map.lat[j]);
        for (i, &lon) in target_lon.values().iter().enumerate() {
            let value = src_row[map.lon[i]];
            let dry = is_dry(seabed, j * width + i);
            out.push(mask_cell(value, lon, lat, dry, rules));
        }
    }
    out
}

/// Masks applied to a field already on the target axes.
fn mask_in_place(
    values: &[f32],
    target_lon: &CoordinateAxis,
    target_lat: &CoordinateAxis,
    rules: &MaskRules,
    seabed: Option<(&[f32], f32)>,
) -> Vec<f32> {
    let width = target_lon.len();
    let mut out = Vec::with_capacity(values.len());
    for (j, &lat) in target_lat.values().iter().enumerate() {
        for (i, &lon) in target_lon.values().iter().enumerate() {
            let idx = j * width + i;
            out.push(mask_cell(values[idx], lon, lat, is_dry(seabed, idx), rules));
        }
    }
    out
}

#[inline]
fn is_dry(seabed: Option<(&[f32], f32)>, idx: usize) -> bool {
    match seabed {
        Some((depths, threshold)) => depths.get(idx).is_some_and(|&d| d >= threshold),
        None => false,
    }
}

// ============================================================================
// Resampler
// ============================================================================

/// A scalar field with an identity used for cache keys.
#[derive(Debug, Clone)]
pub struct ScalarField {
    /// Source identity, e.g. the file or array path plus variable.
    pub id: String,
    pub grid: ValueGrid,
    pub rules: MaskRules,
}

impl ScalarField {
    pub fn new(id: impl Into<String>, grid: ValueGrid) -> Self {
        Self {
            id: id.into(),
            grid,
            rules: MaskRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: MaskRules) -> Self {
        self.rules = rules;
        self
    }
}

/// Resamples fields onto a bathymetry grid, caching index maps per
/// (source, target) pair.
pub struct Resampler {
    maps: BoundedCache<String, Arc<IndexMap>>,
    dry_threshold: f32,
}

impl Resampler {
    pub fn new(config: &GridProcessorConfig) -> Self {
        Self {
            maps: BoundedCache::new(config.index_cache_capacity),
            dry_threshold: config.dry_threshold_m,
        }
    }

    /// Resample `field` onto `target`'s grid.
    ///
    /// A field whose shape already matches the target is used directly, so
    /// unmasked values come back bit-identical.
    pub fn resample(&mut self, field: &ScalarField, target: &Bathymetry) -> Result<ValueGrid> {
        let seabed = field
            .rules
            .mask_dry
            .then(|| (target.z(), self.dry_threshold));

        let values = if field.grid.matches_shape(target.lon(), target.lat()) {
            mask_in_place(field.grid.values(), target.lon(), target.lat(), &field.rules, seabed)
        } else {
            let map = self.index_map(&field.id, field.grid.lon(), field.grid.lat(), target);
            resample_scalar(
                &field.grid,
                &map,
                target.lon(),
                target.lat(),
                &field.rules,
                seabed,
            )
        };

        Ok(target.geometry().with_values(values)?)
    }

    /// Cached index map from a source grid onto `target`.
    pub fn index_map(
        &mut self,
        source_id: &str,
        source_lon: &CoordinateAxis,
        source_lat: &CoordinateAxis,
        target: &Bathymetry,
    ) -> Arc<IndexMap> {
        let key = format!(
            "{}|{}|{}|{}",
            source_id,
            axis_signature(source_lon),
            axis_signature(source_lat),
            target.cache_key()
        );
        let map = self.maps.get_or_insert_with(key, || {
            debug!(source = %source_id, target = %target.id(), "Building resampling index map");
            Arc::new(IndexMap::build(source_lon, source_lat, target.lon(), target.lat()))
        });
        Arc::clone(map)
    }

    pub fn stats(&self) -> CacheStats {
        self.maps.stats()
    }
}

fn axis_signature(axis: &CoordinateAxis) -> String {
    format!("{}:{:016x}", axis.len(), axis.signature())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocean_common::GridPayload;

    fn axis(name: &'static str, values: &[f64]) -> CoordinateAxis {
        CoordinateAxis::new(name, values.to_vec()).unwrap()
    }

    fn bathy(lon: &[f64], lat: &[f64], depth: f64) -> Bathymetry {
        let rows = vec![vec![depth; lon.len()]; lat.len()];
        let payload = GridPayload::from_rows(lon.to_vec(), lat.to_vec(), rows);
        crate::normalize_bathymetry(payload, "bathy", &GridProcessorConfig::default()).unwrap()
    }

    #[test]
    fn test_index_map_nearest_longitudes() {
        let source = axis("lon", &[-10.0, -5.0, 0.0]);
        let target = axis("lon", &[-10.0, -7.0, -4.0, -1.0, 2.0]);
        let lat = axis("lat", &[70.0, 75.0]);
        let map = IndexMap::build(&source, &lat, &target, &lat);
        assert_eq!(map.lon, vec![0, 1, 1, 2, 2]);
        assert_eq!(map.lat, vec![0, 1]);
    }

    #[test]
    fn test_non_finite_always_masked() {
        let all_flags = MaskRules {
            zero_as_missing: true,
            mask_dry: true,
            bounds: Some(BoundingBox::new(-180.0, -90.0, 180.0, 90.0)),
        };
        for rules in [MaskRules::default(), all_flags] {
            assert!(mask_cell(f32::NAN, 0.0, 0.0, false, &rules).is_nan());
            assert!(mask_cell(f32::INFINITY, 0.0, 0.0, true, &rules).is_nan());
        }
    }

    #[test]
    fn test_dry_rule_only_masks_zero() {
        let rules = MaskRules {
            mask_dry: true,
            ..Default::default()
        };
        assert!(mask_cell(0.0, 0.0, 0.0, true, &rules).is_nan());
        assert_eq!(mask_cell(0.0, 0.0, 0.0, false, &rules), 0.0);
        assert_eq!(mask_cell(3.5, 0.0, 0.0, true, &rules), 3.5);
    }

    #[test]
    fn test_bounds_rule() {
        let rules = MaskRules {
            bounds: Some(BoundingBox::new(-5.0, 60.0, 5.0, 70.0)),
            ..Default::default()
        };
        assert_eq!(mask_cell(1.0, 0.0, 65.0, false, &rules), 1.0);
        assert!(mask_cell(1.0, 10.0, 65.0, false, &rules).is_nan());
    }

    #[test]
    fn test_identity_resample_is_bit_identical() {
        let lon = [0.0, 1.0, 2.0];
        let lat = [10.0, 11.0];
        let target = bathy(&lon, &lat, -100.0);
        let values = vec![0.1f32, -0.0, 7.25, 1e-30, 3.0, f32::MAX];
        let grid = ValueGrid::from_flat(axis("lon", &lon), axis("lat", &lat), values.clone()).unwrap();

        let mut resampler = Resampler::new(&GridProcessorConfig::default());
        let out = resampler.resample(&ScalarField::new("f", grid), &target).unwrap();
        for (a, b) in out.values().iter().zip(&values) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        // No index map needed
        assert_eq!(resampler.stats().entries, 0);
    }

    #[test]
    fn test_index_map_is_cached() {
        let target = bathy(&[-10.0, -7.0, -4.0, -1.0, 2.0], &[70.0, 75.0], -500.0);
        let grid = ValueGrid::from_flat(
            axis("lon", &[-10.0, -5.0, 0.0]),
            axis("lat", &[70.0, 75.0]),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();
        let field = ScalarField::new("sst", grid);

        let mut resampler = Resampler::new(&GridProcessorConfig::default());
        let first = resampler.resample(&field, &target).unwrap();
        let second = resampler.resample(&field, &target).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.row(0), &[1.0, 2.0, 2.0, 3.0, 3.0]);

        let stats = resampler.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_index_map_keyed_on_interior_coordinates() {
        let target = bathy(&[-10.0, -7.0, -4.0, -1.0, 2.0], &[70.0, 75.0], -500.0);
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let even = ValueGrid::from_flat(
            axis("lon", &[-10.0, -5.0, 0.0]),
            axis("lat", &[70.0, 75.0]),
            values.clone(),
        )
        .unwrap();
        // Same id, same ends and length; only the middle longitude moves.
        let skewed = ValueGrid::from_flat(
            axis("lon", &[-10.0, -2.0, 0.0]),
            axis("lat", &[70.0, 75.0]),
            values,
        )
        .unwrap();

        let mut resampler = Resampler::new(&GridProcessorConfig::default());
        let first = resampler.resample(&ScalarField::new("sst", even), &target).unwrap();
        let second = resampler.resample(&ScalarField::new("sst", skewed), &target).unwrap();

        assert_eq!(first.row(0), &[1.0, 2.0, 2.0, 3.0, 3.0]);
        assert_eq!(second.row(0), &[1.0, 1.0, 2.0, 2.0, 3.0]);
        assert_eq!(resampler.stats().misses, 2);
    }
}
