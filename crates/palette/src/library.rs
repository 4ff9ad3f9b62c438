//! Palette cache owned by a compositor instance.

use std::collections::HashMap;

use ocean_common::{BoundedCache, CacheStats};
use tracing::debug;

use crate::error::{PaletteError, Result};
use crate::palette::Palette;
use crate::presets::preset_stops;

/// Default number of built palettes kept around.
pub const DEFAULT_LIBRARY_CAPACITY: usize = 16;

/// Builds palettes on first use and keeps a bounded number of them.
///
/// Custom stop sets registered with [`PaletteLibrary::register`] shadow the
/// presets of the same name.
pub struct PaletteLibrary {
    custom: HashMap<String, Vec<String>>,
    cache: BoundedCache<String, Palette>,
}

impl PaletteLibrary {
    pub fn new(capacity: usize) -> Self {
        Self {
            custom: HashMap::new(),
            cache: BoundedCache::new(capacity),
        }
    }

    /// Register (or replace) a named stop set. Invalid stops are rejected
    /// up front so `get` cannot fail on them later.
    pub fn register(&mut self, name: &str, stops: &[&str]) -> Result<()> {
        Palette::from_stops(stops)?;
        let key = name.to_lowercase();
        self.custom
            .insert(key.clone(), stops.iter().map(|s| s.to_string()).collect());
        self.cache.clear();
        debug!(palette = %key, stops = stops.len(), "Registered custom palette");
        Ok(())
    }

    /// Get the 256-entry palette for `name`.
    pub fn get(&mut self, name: &str) -> Result<Palette> {
        let key = name.to_lowercase();
        if let Some(palette) = self.cache.get(&key) {
            return Ok(palette.clone());
        }

        let palette = match self.custom.get(&key) {
            Some(stops) => {
                let refs: Vec<&str> = stops.iter().map(String::as_str).collect();
                Palette::from_stops(&refs)?
            }
            None => {
                let stops = preset_stops(&key)
                    .ok_or_else(|| PaletteError::UnknownPalette(name.to_string()))?;
                Palette::from_stops(stops)?
            }
        };

        self.cache.insert(key, palette.clone());
        Ok(palette)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for PaletteLibrary {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY_CAPACITY)
    }
}
