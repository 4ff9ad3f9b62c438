//! Piecewise-linear colour ramps.

use std::sync::Arc;

use crate::color::Rgb;
use crate::error::{PaletteError, Result};

/// Number of entries in a standard palette.
pub const PALETTE_SIZE: usize = 256;

/// Spread `n` samples evenly along the piecewise-linear path through `stops`.
///
/// Each consecutive stop pair spans `1 / (stops - 1)` of the [0, 1] range.
/// Always returns exactly `n` colours; `n == 1` returns the first stop.
pub fn make_linear_palette(stops: &[&str], n: usize) -> Result<Vec<Rgb>> {
    let colors = stops
        .iter()
        .map(|s| Rgb::from_hex(s))
        .collect::<Result<Vec<_>>>()?;
    interpolate_stops(&colors, n)
}

pub(crate) fn interpolate_stops(stops: &[Rgb], n: usize) -> Result<Vec<Rgb>> {
    let first = *stops.first().ok_or(PaletteError::NoStops)?;

    if n == 1 || stops.len() == 1 {
        return Ok(vec![first; n]);
    }

    let segments = stops.len() - 1;
    let out = (0..n)
        .map(|k| {
            let t = k as f64 / (n - 1) as f64;
            let pos = t * segments as f64;
            let seg = (pos.floor() as usize).min(segments - 1);
            stops[seg].lerp(&stops[seg + 1], pos - seg as f64)
        })
        .collect();
    Ok(out)
}

/// An immutable palette, cheap to clone and share across renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Arc<[Rgb]>,
}

impl Palette {
    /// Build a standard 256-entry palette from hex control points.
    pub fn from_stops(stops: &[&str]) -> Result<Self> {
        Ok(Self::from_colors(make_linear_palette(stops, PALETTE_SIZE)?))
    }

    pub fn from_colors(colors: Vec<Rgb>) -> Self {
        Self {
            colors: colors.into(),
        }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour at a position in [0, 1] (clamped; NaN maps to the first entry).
    pub fn sample(&self, fraction: f64) -> Rgb {
        let last = self.colors.len().saturating_sub(1);
        let f = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.colors[(f * last as f64).round() as usize]
    }

    /// Index of the palette entry closest to `color`.
    pub fn nearest_index(&self, color: &Rgb) -> usize {
        self.colors
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.distance_sq(color))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// `count` evenly spaced entries, first and last included.
    pub fn pick_evenly(&self, count: usize) -> Vec<Rgb> {
        match count {
            0 => Vec::new(),
            1 => vec![self.sample(0.0)],
            _ => (0..count)
                .map(|k| self.sample(k as f64 / (count - 1) as f64))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_length() {
        for n in [0, 1, 2, 7, 256, 1000] {
            let p = make_linear_palette(&["#000000", "#ffffff"], n).unwrap();
            assert_eq!(p.len(), n);
        }
    }

    #[test]
    fn test_single_entry_is_first_stop() {
        let p = make_linear_palette(&["#123456", "#ffffff", "#000000"], 1).unwrap();
        assert_eq!(p, vec![Rgb::new(0x12, 0x34, 0x56)]);
    }

    #[test]
    fn test_endpoints_and_midpoint() {
        let p = make_linear_palette(&["#000000", "#ff0000", "#ffffff"], 5).unwrap();
        assert_eq!(p[0], Rgb::new(0, 0, 0));
        assert_eq!(p[2], Rgb::new(255, 0, 0));
        assert_eq!(p[4], Rgb::new(255, 255, 255));
        // Quarter of the way: halfway along the first segment
        assert_eq!(p[1], Rgb::new(128, 0, 0));
    }

    #[test]
    fn test_no_stops_is_error() {
        assert_eq!(make_linear_palette(&[], 4), Err(PaletteError::NoStops));
    }

    #[test]
    fn test_invalid_hex_propagates() {
        assert!(matches!(
            make_linear_palette(&["#000000", "nope"], 4),
            Err(PaletteError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_nearest_index() {
        let palette = Palette::from_stops(&["#000000", "#ffffff"]).unwrap();
        assert_eq!(palette.len(), PALETTE_SIZE);
        assert_eq!(palette.nearest_index(&Rgb::new(0, 0, 0)), 0);
        assert_eq!(palette.nearest_index(&Rgb::new(255, 255, 255)), 255);
        assert_eq!(palette.nearest_index(&Rgb::new(100, 100, 100)), 100);
    }
}
