//! Asynchronous bathymetry loading with source fallback.
//!
//! Sources are tried in configured order. Oversized, missing or malformed
//! sources are skipped with a warning; when none loads the synthetic grid is
//! used instead. Loads are last-request-wins: a load whose ticket went stale
//! while it was waiting returns [`LoadOutcome::Cancelled`] and its result is
//! dropped.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ocean_common::{GridPayload, LoadStatus, LoadTicket, RequestTracker};
use tracing::{debug, info, instrument, warn};

use crate::config::GridProcessorConfig;
use crate::error::{GridProcessorError, Result};
use crate::normalize::{normalize_bathymetry, Bathymetry};
use crate::synthetic::synthetic_bathymetry;

/// Something that can hand out named grid files.
#[async_trait]
pub trait GridSource: Send + Sync {
    /// Size of `name` in bytes, if it can be known without fetching.
    async fn size_hint(&self, name: &str) -> Result<Option<u64>>;

    /// Fetch the raw bytes of `name`.
    async fn fetch(&self, name: &str) -> Result<Vec<u8>>;
}

/// Grid files in a local directory.
#[derive(Debug, Clone)]
pub struct FileGridSource {
    root: PathBuf,
}

impl FileGridSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl GridSource for FileGridSource {
    async fn size_hint(&self, name: &str) -> Result<Option<u64>> {
        let metadata = tokio::fs::metadata(self.root.join(name)).await?;
        Ok(Some(metadata.len()))
    }

    async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.root.join(name)).await?)
    }
}

/// Where a loaded grid came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BathymetryOrigin {
    Source(String),
    Synthetic,
}

/// A grid ready to apply, with the status to show for it.
#[derive(Debug, Clone)]
pub struct LoadedBathymetry {
    pub bathymetry: Bathymetry,
    pub origin: BathymetryOrigin,
    pub status: LoadStatus,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(LoadedBathymetry),
    /// Superseded or cancelled; nothing to apply.
    Cancelled,
    /// Not even the synthetic grid could be built.
    Failed(String),
}

impl LoadOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadOutcome::Cancelled)
    }

    pub fn into_loaded(self) -> Option<LoadedBathymetry> {
        match self {
            LoadOutcome::Loaded(loaded) => Some(loaded),
            LoadOutcome::Cancelled | LoadOutcome::Failed(_) => None,
        }
    }
}

/// Loads bathymetry from a [`GridSource`].
pub struct BathymetryLoader<S> {
    source: S,
    config: GridProcessorConfig,
    tracker: RequestTracker,
}

impl<S: GridSource> BathymetryLoader<S> {
    pub fn new(source: S, config: GridProcessorConfig) -> Self {
        Self::with_tracker(source, config, RequestTracker::new())
    }

    /// Share a tracker with the consuming view so it can cancel loads.
    pub fn with_tracker(source: S, config: GridProcessorConfig, tracker: RequestTracker) -> Self {
        Self {
            source,
            config,
            tracker,
        }
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    /// Cancel every outstanding load.
    pub fn cancel(&self) {
        self.tracker.cancel();
    }

    /// Load the first usable source, falling back to the synthetic grid.
    ///
    /// Source errors never escape: they become a [`LoadStatus::Failed`]
    /// next to the synthetic grid.
    #[instrument(skip(self), fields(sources = self.config.source_order.len()))]
    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.tracker.begin();
        let mut failures = Vec::new();

        for name in &self.config.source_order {
            match self.try_source(name, &ticket).await {
                Ok(bathymetry) => {
                    if ticket.is_cancelled() {
                        return LoadOutcome::Cancelled;
                    }
                    info!(
                        source = %name,
                        width = bathymetry.width(),
                        height = bathymetry.height(),
                        flipped = bathymetry.was_flipped(),
                        downsampled = bathymetry.was_downsampled(),
                        "Loaded bathymetry"
                    );
                    return LoadOutcome::Loaded(LoadedBathymetry {
                        bathymetry,
                        origin: BathymetryOrigin::Source(name.clone()),
                        status: LoadStatus::Ready,
                    });
                }
                Err(GridProcessorError::Cancelled) => {
                    debug!(source = %name, "Bathymetry load superseded");
                    return LoadOutcome::Cancelled;
                }
                Err(e) => {
                    warn!(source = %name, error = %e, kind = ?e.kind(), "Skipping bathymetry source");
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }

        if ticket.is_cancelled() {
            return LoadOutcome::Cancelled;
        }

        let reason = if failures.is_empty() {
            "no bathymetry sources configured".to_string()
        } else {
            failures.join("; ")
        };
        warn!(reason = %reason, "Falling back to synthetic bathymetry");

        match synthetic_bathymetry() {
            Ok(bathymetry) => LoadOutcome::Loaded(LoadedBathymetry {
                bathymetry,
                origin: BathymetryOrigin::Synthetic,
                status: LoadStatus::Failed(reason),
            }),
            Err(e) => {
                warn!(error = %e, "Synthetic bathymetry unavailable");
                LoadOutcome::Failed(format!("{}; synthetic: {}", reason, e))
            }
        }
    }

    async fn try_source(&self, name: &str, ticket: &LoadTicket) -> Result<Bathymetry> {
        let size = self.source.size_hint(name).await?;
        if ticket.is_cancelled() {
            return Err(GridProcessorError::Cancelled);
        }
        if let Some(size) = size {
            if size > self.config.max_source_bytes {
                return Err(GridProcessorError::ResourceTooLarge {
                    name: name.to_string(),
                    size,
                    limit: self.config.max_source_bytes,
                });
            }
        }

        let bytes = self.source.fetch(name).await?;
        if ticket.is_cancelled() {
            return Err(GridProcessorError::Cancelled);
        }
        debug!(source = %name, bytes = bytes.len(), "Fetched bathymetry source");

        let payload = GridPayload::from_slice(&bytes)?;
        normalize_bathymetry(payload, name, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MemorySource {
        files: HashMap<String, Vec<u8>>,
        cancel_on_fetch: Option<RequestTracker>,
    }

    impl MemorySource {
        fn new(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                    .collect(),
                cancel_on_fetch: None,
            }
        }
    }

    #[async_trait]
    impl GridSource for MemorySource {
        async fn size_hint(&self, name: &str) -> Result<Option<u64>> {
            Ok(self.files.get(name).map(|b| b.len() as u64))
        }

        async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
            if let Some(tracker) = &self.cancel_on_fetch {
                let _newer = tracker.begin();
            }
            self.files
                .get(name)
                .cloned()
                .ok_or_else(|| GridProcessorError::load_failed(format!("{} not found", name)))
        }
    }

    const SMALL: &str = r#"{"lon":[-25,-24.5],"lat":[62,62.25],"z":[[-2000,-2100],[-1900,-2050]]}"#;

    #[tokio::test]
    async fn test_falls_back_to_second_source() {
        let source = MemorySource::new(&[("bathy_RTopo.json", SMALL)]);
        let loader = BathymetryLoader::new(source, GridProcessorConfig::default());
        let loaded = loader.load().await.into_loaded().unwrap();
        assert_eq!(loaded.origin, BathymetryOrigin::Source("bathy_RTopo.json".into()));
        assert_eq!(loaded.status, LoadStatus::Ready);
    }

    #[tokio::test]
    async fn test_all_sources_fail_gives_synthetic() {
        let source = MemorySource::new(&[("bathy_RTopo_ds.json", "{\"lon\": 3}")]);
        let loader = BathymetryLoader::new(source, GridProcessorConfig::default());
        let loaded = loader.load().await.into_loaded().unwrap();
        assert_eq!(loaded.origin, BathymetryOrigin::Synthetic);
        assert!(loaded.status.is_failed());
        assert!(!loaded.bathymetry.has_signed_data());
    }

    #[tokio::test]
    async fn test_oversized_source_skipped() {
        let source = MemorySource::new(&[("bathy_RTopo_ds.json", SMALL), ("bathy_RTopo.json", SMALL)]);
        let config = GridProcessorConfig {
            max_source_bytes: 10,
            ..Default::default()
        };
        let loaded = BathymetryLoader::new(source, config).load().await.into_loaded().unwrap();
        assert_eq!(loaded.origin, BathymetryOrigin::Synthetic);
        match loaded.status {
            LoadStatus::Failed(reason) => assert!(reason.contains("limit")),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_superseded_load_is_cancelled() {
        let tracker = RequestTracker::new();
        let mut source = MemorySource::new(&[("bathy_RTopo_ds.json", SMALL)]);
        source.cancel_on_fetch = Some(tracker.clone());
        let loader = BathymetryLoader::with_tracker(source, GridProcessorConfig::default(), tracker);
        assert!(loader.load().await.is_cancelled());
    }
}
