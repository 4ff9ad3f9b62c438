//! Renderer colorscales: ordered `[fraction, cssColor]` pairs over [0, 1].

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::palette::Palette;

/// One `[fraction, "rgb(r,g,b)"]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorscaleStop(pub f64, pub String);

/// A value-fraction to colour mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Colorscale {
    pub stops: Vec<ColorscaleStop>,
}

impl Colorscale {
    /// Continuous scale: palette entry `k` of `N` sits at `k / (N - 1)`.
    pub fn from_palette(palette: &Palette) -> Self {
        let n = palette.len();
        let stops = match n {
            0 => Vec::new(),
            1 => {
                let css = palette.colors()[0].to_css();
                vec![ColorscaleStop(0.0, css.clone()), ColorscaleStop(1.0, css)]
            }
            _ => palette
                .colors()
                .iter()
                .enumerate()
                .map(|(k, c)| ColorscaleStop(k as f64 / (n - 1) as f64, c.to_css()))
                .collect(),
        };
        Self { stops }
    }

    /// `n` equal-width flat bands using evenly picked palette entries.
    ///
    /// Each band emits a doubled stop pair so it renders as a solid block.
    pub fn discrete(palette: &Palette, n: usize) -> Self {
        if n == 0 {
            return Self::default();
        }
        let colors = palette.pick_evenly(n);
        let edges: Vec<f64> = (0..=n).map(|k| k as f64 / n as f64).collect();
        Self::from_bands(&edges, &colors)
    }

    /// Flat bands bounded by physical values, e.g. depth bands in metres.
    ///
    /// `edges` inside `(cmin, cmax)` split the range; band colours are picked
    /// evenly from the palette from `cmin` upward. A collapsed range gives a
    /// single flat colour.
    pub fn banded(palette: &Palette, edges: &[f64], cmin: f64, cmax: f64) -> Self {
        if !(cmax > cmin) {
            let color = palette.sample(0.0);
            return Self::from_bands(&[0.0, 1.0], &[color]);
        }

        let mut inner: Vec<f64> = edges
            .iter()
            .copied()
            .filter(|e| e.is_finite() && *e > cmin && *e < cmax)
            .collect();
        inner.sort_by(|a, b| a.total_cmp(b));
        inner.dedup();

        let span = cmax - cmin;
        let mut fractions = Vec::with_capacity(inner.len() + 2);
        fractions.push(0.0);
        fractions.extend(inner.iter().map(|e| (e - cmin) / span));
        fractions.push(1.0);

        let colors = palette.pick_evenly(fractions.len() - 1);
        Self::from_bands(&fractions, &colors)
    }

    /// Doubled stops: band `k` runs from `edges[k]` to `edges[k + 1]` in `colors[k]`.
    fn from_bands(edges: &[f64], colors: &[Rgb]) -> Self {
        let stops = colors
            .iter()
            .zip(edges.windows(2))
            .flat_map(|(color, w)| {
                let css = color.to_css();
                [ColorscaleStop(w[0], css.clone()), ColorscaleStop(w[1], css)]
            })
            .collect();
        Self { stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}
