//! Decode raster overlays back into values.
//!
//! Overlays ship as pre-rendered images georeferenced by a bounding box.
//! Each target cell looks up the nearest pixel; nearly transparent pixels
//! are missing, anything else is matched against a palette.

use std::collections::HashMap;

use image::RgbaImage;
use ocean_common::{BoundingBox, CoordinateAxis, ValueGrid};
use palette::{Palette, Rgb};
use tracing::debug;

use crate::error::{GridProcessorError, Result};

/// Pixels with alpha below this are missing.
pub const ALPHA_THRESHOLD: u8 = 10;

/// How a pixel colour becomes a value.
#[derive(Debug, Clone)]
pub enum RasterDecode {
    /// Index of the nearest palette entry.
    PaletteIndex(Palette),
    /// Nearest palette entry `k` mapped to `vmin + k / (N - 1) * (vmax - vmin)`.
    ReverseMap { palette: Palette, vmin: f64, vmax: f64 },
}

impl RasterDecode {
    fn palette(&self) -> &Palette {
        match self {
            Self::PaletteIndex(palette) => palette,
            Self::ReverseMap { palette, .. } => palette,
        }
    }

    fn value_of(&self, index: usize) -> f32 {
        match self {
            Self::PaletteIndex(_) => index as f32,
            Self::ReverseMap { palette, vmin, vmax } => {
                let n = palette.len();
                let t = if n > 1 { index as f64 / (n - 1) as f64 } else { 0.0 };
                (vmin + t * (vmax - vmin)) as f32
            }
        }
    }
}

/// Sample `image` onto the `x` by `y` target axes.
///
/// `bbox` is the image extent: the left column sits at `min_lon`, the top
/// row at `max_lat` (or the shallowest depth for lon/depth sections).
/// Target cells outside the box are missing.
pub fn sample_raster(
    image: &RgbaImage,
    bbox: &BoundingBox,
    x: &CoordinateAxis,
    y: &CoordinateAxis,
    decode: &RasterDecode,
) -> Result<ValueGrid> {
    if bbox.is_degenerate() {
        return Err(GridProcessorError::degenerate(format!(
            "raster box {} has zero span",
            bbox.cache_key()
        )));
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(GridProcessorError::degenerate("raster image is empty"));
    }
    if decode.palette().is_empty() {
        return Err(GridProcessorError::degenerate("decode palette is empty"));
    }

    let mut memo: HashMap<Rgb, usize> = HashMap::new();
    let mut values = Vec::with_capacity(x.len() * y.len());
    let mut missing = 0usize;

    for &cy in y.values() {
        for &cx in x.values() {
            if !bbox.contains(cx, cy) {
                values.push(f32::NAN);
                missing += 1;
                continue;
            }

            let fx = (cx - bbox.min_lon) / bbox.width();
            let fy = (bbox.max_lat - cy) / bbox.height();
            let px = (fx * (width - 1) as f64).round() as u32;
            let py = (fy * (height - 1) as f64).round() as u32;
            let pixel = image.get_pixel(px.min(width - 1), py.min(height - 1));

            let [r, g, b, a] = pixel.0;
            if a < ALPHA_THRESHOLD {
                values.push(f32::NAN);
                missing += 1;
                continue;
            }

            let color = Rgb::new(r, g, b);
            let index = *memo
                .entry(color)
                .or_insert_with(|| decode.palette().nearest_index(&color));
            values.push(decode.value_of(index));
        }
    }

    debug!(
        width,
        height,
        cells = values.len(),
        missing,
        distinct_colors = memo.len(),
        "Sampled raster overlay"
    );

    Ok(ValueGrid::from_flat(x.clone(), y.clone(), values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gray() -> Palette {
        Palette::from_stops(&["#000000", "#ffffff"]).unwrap()
    }

    fn image_2x2() -> RgbaImage {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(0, 1, Rgba([128, 128, 128, 255]));
        img.put_pixel(1, 1, Rgba([10, 10, 10, 5]));
        img
    }

    fn axes() -> (CoordinateAxis, CoordinateAxis) {
        (
            CoordinateAxis::new("lon", vec![0.0, 10.0]).unwrap(),
            CoordinateAxis::new("lat", vec![60.0, 70.0]).unwrap(),
        )
    }

    #[test]
    fn test_palette_index_decode() {
        let (lon, lat) = axes();
        let bbox = BoundingBox::new(0.0, 60.0, 10.0, 70.0);
        let grid =
            sample_raster(&image_2x2(), &bbox, &lon, &lat, &RasterDecode::PaletteIndex(gray()))
                .unwrap();
        // Row 0 of the grid is lat 60, the bottom image row.
        assert_eq!(grid.get(0, 0), Some(128.0));
        assert!(grid.get(1, 0).unwrap().is_nan());
        assert_eq!(grid.get(0, 1), Some(0.0));
        assert_eq!(grid.get(1, 1), Some(255.0));
    }

    #[test]
    fn test_reverse_map_decode() {
        let (lon, lat) = axes();
        let bbox = BoundingBox::new(0.0, 60.0, 10.0, 70.0);
        let decode = RasterDecode::ReverseMap {
            palette: gray(),
            vmin: -2.0,
            vmax: 8.0,
        };
        let grid = sample_raster(&image_2x2(), &bbox, &lon, &lat, &decode).unwrap();
        assert_eq!(grid.get(0, 1), Some(-2.0));
        assert_eq!(grid.get(1, 1), Some(8.0));
    }

    #[test]
    fn test_outside_box_missing() {
        let lon = CoordinateAxis::new("lon", vec![0.0, 20.0]).unwrap();
        let lat = CoordinateAxis::new("lat", vec![65.0]).unwrap();
        let bbox = BoundingBox::new(0.0, 60.0, 10.0, 70.0);
        let grid =
            sample_raster(&image_2x2(), &bbox, &lon, &lat, &RasterDecode::PaletteIndex(gray()))
                .unwrap();
        assert!(grid.get(0, 0).unwrap().is_finite());
        assert!(grid.get(1, 0).unwrap().is_nan());
    }

    #[test]
    fn test_degenerate_box() {
        let (lon, lat) = axes();
        let bbox = BoundingBox::new(5.0, 60.0, 5.0, 70.0);
        let err = sample_raster(&image_2x2(), &bbox, &lon, &lat, &RasterDecode::PaletteIndex(gray()))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::DegenerateInput);
    }
}
