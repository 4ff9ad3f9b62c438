//! Resampling scenarios against a bathymetry target.

use grid_processor::{
    normalize_bathymetry, Bathymetry, GridProcessorConfig, MaskRules, Resampler, ScalarField,
};
use ocean_common::{BoundingBox, CoordinateAxis, GridPayload, ValueGrid};
use test_utils::fixtures::resampling::{EXPECTED_LON, SOURCE_LAT, SOURCE_LON, TARGET_LON};
use test_utils::{assert_missing, indexed_values};

fn target(lon: &[f64], lat: &[f64], depths: Vec<Vec<f64>>) -> Bathymetry {
    let payload = GridPayload::from_rows(lon.to_vec(), lat.to_vec(), depths);
    normalize_bathymetry(payload, "target", &GridProcessorConfig::default()).unwrap()
}

fn field(lon: &[f64], lat: &[f64], values: Vec<f32>) -> ValueGrid {
    ValueGrid::from_flat(
        CoordinateAxis::new("lon", lon.to_vec()).unwrap(),
        CoordinateAxis::new("lat", lat.to_vec()).unwrap(),
        values,
    )
    .unwrap()
}

#[test]
fn test_nearest_longitude_assignment() {
    // Encode each source longitude into the field value.
    let values: Vec<f32> = SOURCE_LAT
        .iter()
        .flat_map(|_| SOURCE_LON.iter().map(|&x| x as f32))
        .collect();
    let grid = field(&SOURCE_LON, &SOURCE_LAT, values);
    let bathy = target(&TARGET_LON, &SOURCE_LAT, vec![vec![-1000.0; 5]; 2]);

    let mut resampler = Resampler::new(&GridProcessorConfig::default());
    let out = resampler.resample(&ScalarField::new("lonfield", grid), &bathy).unwrap();

    for j in 0..2 {
        let row: Vec<f64> = out.row(j).iter().map(|&v| v as f64).collect();
        assert_eq!(row, EXPECTED_LON.to_vec());
    }
}

#[test]
fn test_zero_as_missing_flag() {
    let lon = [0.0, 1.0];
    let lat = [70.0];
    let bathy = target(&lon, &lat, vec![vec![-500.0, -500.0]]);
    let grid = field(&lon, &lat, vec![0.0, 35.0]);
    let mut resampler = Resampler::new(&GridProcessorConfig::default());

    let masked = ScalarField::new("salt", grid.clone()).with_rules(MaskRules {
        zero_as_missing: true,
        ..Default::default()
    });
    let out = resampler.resample(&masked, &bathy).unwrap();
    assert_missing!(out.values()[0]);
    assert_eq!(out.values()[1], 35.0);

    let plain = ScalarField::new("salt", grid);
    let out = resampler.resample(&plain, &bathy).unwrap();
    assert_eq!(out.values()[0], 0.0);
}

#[test]
fn test_dry_mask_uses_bathymetry() {
    let lon = [0.0, 1.0, 2.0];
    let lat = [70.0];
    // Middle cell is land, right cell is ocean.
    let bathy = target(&lon, &lat, vec![vec![150.0, -0.1, -300.0]]);
    let grid = field(&lon, &lat, vec![0.0, 0.0, 0.0]);
    let rules = MaskRules {
        mask_dry: true,
        ..Default::default()
    };

    let mut resampler = Resampler::new(&GridProcessorConfig::default());
    let out = resampler
        .resample(&ScalarField::new("ice", grid).with_rules(rules.clone()), &bathy)
        .unwrap();
    assert_missing!(out.values()[0]);
    assert_missing!(out.values()[1]);
    assert_eq!(out.values()[2], 0.0);

    // Non-zero values on land survive.
    let grid = field(&lon, &lat, vec![4.0, 0.5, 0.0]);
    let out = resampler
        .resample(&ScalarField::new("ice2", grid).with_rules(rules), &bathy)
        .unwrap();
    assert_eq!(out.values()[0], 4.0);
    assert_eq!(out.values()[1], 0.5);
}

#[test]
fn test_declared_bounds_clip_target_cells() {
    let source_lon = [-10.0, 0.0];
    let source_lat = [60.0, 70.0];
    let grid = field(&source_lon, &source_lat, indexed_values(2, 2));
    let bathy = target(&[-20.0, -10.0, 0.0], &[60.0, 70.0], vec![vec![-100.0; 3]; 2]);

    let rules = MaskRules {
        bounds: Some(BoundingBox::new(-10.0, 60.0, 0.0, 70.0)),
        ..Default::default()
    };
    let mut resampler = Resampler::new(&GridProcessorConfig::default());
    let out = resampler
        .resample(&ScalarField::new("clip", grid).with_rules(rules), &bathy)
        .unwrap();

    // lon -20 is outside the declared box even though the nearest source
    // column exists.
    assert_missing!(out.get(0, 0).unwrap());
    assert_eq!(out.get(1, 0), Some(0.0));
    assert_eq!(out.get(2, 1), Some(1001.0));
}

#[test]
fn test_index_cache_is_bounded() {
    let config = GridProcessorConfig {
        index_cache_capacity: 2,
        ..Default::default()
    };
    let bathy = target(&[0.0, 1.0, 2.0], &[0.0, 1.0], vec![vec![-10.0; 3]; 2]);
    let mut resampler = Resampler::new(&config);
    for k in 0..5 {
        let grid = field(&[0.0, 2.0], &[0.0, 1.0], vec![1.0; 4]);
        resampler
            .resample(&ScalarField::new(format!("field-{}", k), grid), &bathy)
            .unwrap();
    }
    let stats = resampler.stats();
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.evictions, 3);
}
