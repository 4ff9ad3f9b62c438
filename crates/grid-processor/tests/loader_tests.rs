//! File-backed loader tests.

use grid_processor::{
    BathymetryLoader, BathymetryOrigin, FileGridSource, GridProcessorConfig,
};
use ocean_common::LoadStatus;
use test_utils::fixtures::{NEGATIVE_BATHY_JSON, POSITIVE_BATHY_JSON};
use test_utils::{bathymetry_payload, temp_test_dir, write_payload, write_source};

fn config(sources: &[&str]) -> GridProcessorConfig {
    GridProcessorConfig {
        source_order: sources.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_prefers_first_source() {
    let dir = temp_test_dir();
    write_source(dir.path(), "ds.json", NEGATIVE_BATHY_JSON);
    write_source(dir.path(), "full.json", POSITIVE_BATHY_JSON);

    let loader = BathymetryLoader::new(FileGridSource::new(dir.path()), config(&["ds.json", "full.json"]));
    let loaded = loader.load().await.into_loaded().unwrap();
    assert_eq!(loaded.origin, BathymetryOrigin::Source("ds.json".into()));
    assert!(!loaded.bathymetry.was_flipped());
}

#[tokio::test]
async fn test_missing_first_source_falls_through() {
    let dir = temp_test_dir();
    write_source(dir.path(), "full.json", POSITIVE_BATHY_JSON);

    let loader = BathymetryLoader::new(FileGridSource::new(dir.path()), config(&["ds.json", "full.json"]));
    let loaded = loader.load().await.into_loaded().unwrap();
    assert_eq!(loaded.origin, BathymetryOrigin::Source("full.json".into()));
    assert_eq!(loaded.bathymetry.depth(0, 0), Some(-2000.0));
    assert_eq!(loaded.status, LoadStatus::Ready);
}

#[tokio::test]
async fn test_nothing_loads_gives_synthetic_with_failed_status() {
    let dir = temp_test_dir();
    write_source(dir.path(), "ds.json", "not json");

    let loader = BathymetryLoader::new(FileGridSource::new(dir.path()), config(&["ds.json", "full.json"]));
    let loaded = loader.load().await.into_loaded().unwrap();
    assert_eq!(loaded.origin, BathymetryOrigin::Synthetic);
    match &loaded.status {
        LoadStatus::Failed(reason) => {
            assert!(reason.contains("ds.json"));
            assert!(reason.contains("full.json"));
        }
        other => panic!("unexpected status {:?}", other),
    }
}

#[tokio::test]
async fn test_large_source_is_downsampled_on_load() {
    let dir = temp_test_dir();
    write_payload(dir.path(), "big.json", &bathymetry_payload(120, 90, 3500.0, 600.0));

    let cfg = GridProcessorConfig {
        point_budget: 1_000,
        ..config(&["big.json"])
    };
    let loaded = BathymetryLoader::new(FileGridSource::new(dir.path()), cfg)
        .load()
        .await
        .into_loaded()
        .unwrap();
    assert!(loaded.bathymetry.was_downsampled());
    assert!(loaded.bathymetry.width() * loaded.bathymetry.height() <= 1_000);
    assert!(loaded.bathymetry.has_signed_data());
}

#[tokio::test]
async fn test_cancelled_tracker_discards_result() {
    let dir = temp_test_dir();
    write_source(dir.path(), "ds.json", NEGATIVE_BATHY_JSON);
    let loader = BathymetryLoader::new(FileGridSource::new(dir.path()), config(&["ds.json"]));

    let tracker = loader.tracker().clone();
    let mut load = tokio_test::task::spawn(loader.load());
    // Start the load, then tear the view down before it can finish.
    if load.poll().is_pending() {
        tracker.cancel();
        let outcome = loop {
            if let std::task::Poll::Ready(outcome) = load.poll() {
                break outcome;
            }
            tokio::task::yield_now().await;
        };
        assert!(outcome.is_cancelled());
    }
}
