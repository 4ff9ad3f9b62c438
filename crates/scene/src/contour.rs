//! Per-surface contour parameters.
//!
//! The renderer draws the isolines itself; a surface only declares which
//! levels to draw and how.

use serde::{Deserialize, Serialize};

/// Contour levels `start, start + size, ... <= end` and their line style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourSpec {
    pub show: bool,
    pub start: f64,
    pub end: f64,
    pub size: f64,
    pub color: String,
    pub width: f32,
}

/// Contours along the surface's colour values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceContours {
    pub z: ContourSpec,
}

const DEFAULT_COLOR: &str = "rgb(30,30,30)";
const DEFAULT_WIDTH: f32 = 1.5;

impl ContourSpec {
    /// `count` evenly spaced levels strictly inside `[cmin, cmax]`.
    pub fn from_count(cmin: f64, cmax: f64, count: usize) -> Option<Self> {
        if count == 0 || !(cmax > cmin) {
            return None;
        }
        let size = (cmax - cmin) / (count + 1) as f64;
        Some(Self::styled(cmin + size, cmax - size, size))
    }

    /// Levels on multiples of `interval` inside `[cmin, cmax]`.
    pub fn from_interval(cmin: f64, cmax: f64, interval: f64) -> Option<Self> {
        let levels = generate_contour_levels(cmin, cmax, interval);
        let (first, last) = (*levels.first()?, *levels.last()?);
        Some(Self::styled(first, last, interval))
    }

    fn styled(start: f64, end: f64, size: f64) -> Self {
        Self {
            show: true,
            start,
            end,
            size,
            color: DEFAULT_COLOR.to_string(),
            width: DEFAULT_WIDTH,
        }
    }

    pub fn with_style(mut self, color: impl Into<String>, width: f32) -> Self {
        self.color = color.into();
        self.width = width;
        self
    }

    /// Levels drawn with these settings.
    pub fn levels(&self) -> Vec<f64> {
        if !(self.size > 0.0) || self.end < self.start {
            return Vec::new();
        }
        let n = ((self.end - self.start) / self.size + 1e-9).floor() as usize;
        (0..=n).map(|k| self.start + k as f64 * self.size).collect()
    }

    pub fn into_surface(self) -> SurfaceContours {
        SurfaceContours { z: self }
    }
}

/// Levels on multiples of `interval` between `min_value` and `max_value`.
pub fn generate_contour_levels(min_value: f64, max_value: f64, interval: f64) -> Vec<f64> {
    if !(interval > 0.0) || !(max_value > min_value) {
        return vec![];
    }

    // First multiple of interval at or above min_value
    let first = (min_value / interval).ceil() as i64;
    let last = (max_value / interval).floor() as i64;

    (first..=last).map(|k| k as f64 * interval).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_levels() {
        assert_eq!(generate_contour_levels(-3.5, 6.0, 2.0), vec![-2.0, 0.0, 2.0, 4.0, 6.0]);
        assert!(generate_contour_levels(5.0, 5.0, 1.0).is_empty());
        assert!(generate_contour_levels(0.0, 5.0, 0.0).is_empty());
    }

    #[test]
    fn test_from_count() {
        let spec = ContourSpec::from_count(0.0, 10.0, 4).unwrap();
        assert_eq!(spec.levels(), vec![2.0, 4.0, 6.0, 8.0]);
        assert!(ContourSpec::from_count(1.0, 1.0, 4).is_none());
    }

    #[test]
    fn test_from_interval() {
        let spec = ContourSpec::from_interval(34.1, 35.2, 0.25).unwrap();
        assert_eq!(spec.start, 34.25);
        assert_eq!(spec.end, 35.0);
        assert_eq!(spec.levels().len(), 4);
        assert!(ContourSpec::from_interval(34.1, 34.2, 0.25).is_none());
    }

    #[test]
    fn test_serialises_under_z() {
        let spec = ContourSpec::from_count(0.0, 1.0, 1).unwrap().with_style("white", 2.0);
        let json = serde_json::to_value(spec.into_surface()).unwrap();
        assert_eq!(json["z"]["show"], true);
        assert_eq!(json["z"]["color"], "white");
    }
}
