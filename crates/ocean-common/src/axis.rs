//! Monotonic coordinate axes.
//!
//! Longitude, latitude and depth arrays may run in either direction. Every
//! lookup that maps a physical coordinate onto an array position goes through
//! [`CoordinateAxis`] so the ascending/descending handling lives in one place.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Direction in which axis values change with increasing index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisDirection {
    Ascending,
    Descending,
}

/// A strictly monotonic 1D coordinate array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateAxis {
    values: Vec<f64>,
    direction: AxisDirection,
}

impl CoordinateAxis {
    /// Validate and wrap a coordinate array.
    ///
    /// A single-element axis is accepted and treated as ascending.
    pub fn new(name: &'static str, values: Vec<f64>) -> GridResult<Self> {
        if values.is_empty() {
            return Err(GridError::EmptyAxis(name));
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(GridError::NonFiniteCoordinate { axis: name, index });
        }

        let direction = if values.len() < 2 || values[1] > values[0] {
            AxisDirection::Ascending
        } else {
            AxisDirection::Descending
        };

        let monotonic = values.windows(2).all(|w| match direction {
            AxisDirection::Ascending => w[1] > w[0],
            AxisDirection::Descending => w[1] < w[0],
        });
        if !monotonic {
            return Err(GridError::NotMonotonic(name));
        }

        Ok(Self { values, direction })
    }

    /// Evenly spaced axis from `start` to `end` inclusive.
    pub fn linspace(name: &'static str, start: f64, end: f64, count: usize) -> GridResult<Self> {
        let values = match count {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (count - 1) as f64;
                (0..count).map(|i| start + step * i as f64).collect()
            }
        };
        Self::new(name, values)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn direction(&self) -> AxisDirection {
        self.direction
    }

    pub fn first(&self) -> f64 {
        self.values[0]
    }

    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Minimum and maximum coordinate, independent of direction.
    pub fn bounds(&self) -> (f64, f64) {
        match self.direction {
            AxisDirection::Ascending => (self.first(), self.last()),
            AxisDirection::Descending => (self.last(), self.first()),
        }
    }

    pub fn span(&self) -> f64 {
        let (min, max) = self.bounds();
        max - min
    }

    pub fn contains(&self, value: f64) -> bool {
        let (min, max) = self.bounds();
        value >= min && value <= max
    }

    /// Position of `value` between the first (0) and last (1) coordinate.
    ///
    /// Clamped to [0, 1]. Returns NaN for a zero-span axis or a non-finite value.
    pub fn to_fraction(&self, value: f64) -> f64 {
        let span = self.last() - self.first();
        if span == 0.0 || !value.is_finite() {
            return f64::NAN;
        }
        ((value - self.first()) / span).clamp(0.0, 1.0)
    }

    /// Continuous (fractional) index of `value`, interpolating linearly within
    /// the bracketing segment. `None` if the value lies outside the axis.
    pub fn to_index(&self, value: f64) -> Option<f64> {
        if !value.is_finite() || !self.contains(value) {
            return None;
        }
        if self.values.len() == 1 {
            return Some(0.0);
        }

        let lower = self.segment_start(value);
        let a = self.values[lower];
        let b = self.values[lower + 1];
        Some(lower as f64 + (value - a) / (b - a))
    }

    /// Index of the coordinate closest to `value` by absolute difference.
    ///
    /// Ties resolve to the lower array index. Values outside the axis map to
    /// the nearest end.
    pub fn nearest_index(&self, value: f64) -> usize {
        let n = self.values.len();
        if n == 1 || !value.is_finite() {
            return 0;
        }

        let (min, max) = self.bounds();
        if value <= min {
            return match self.direction {
                AxisDirection::Ascending => 0,
                AxisDirection::Descending => n - 1,
            };
        }
        if value >= max {
            return match self.direction {
                AxisDirection::Ascending => n - 1,
                AxisDirection::Descending => 0,
            };
        }

        let lower = self.segment_start(value);
        let upper = lower + 1;
        let d_lower = (self.values[lower] - value).abs();
        let d_upper = (self.values[upper] - value).abs();
        if d_upper < d_lower {
            upper
        } else {
            lower
        }
    }

    /// Index `k` such that `value` lies between `values[k]` and `values[k + 1]`.
    /// Caller guarantees `value` is inside the axis and `len >= 2`.
    fn segment_start(&self, value: f64) -> usize {
        let n = self.values.len();
        // partition_point needs a predicate that is true for a prefix.
        let after = match self.direction {
            AxisDirection::Ascending => self.values.partition_point(|&v| v <= value),
            AxisDirection::Descending => self.values.partition_point(|&v| v >= value),
        };
        after.saturating_sub(1).min(n - 2)
    }

    /// Hash over every coordinate, for cache keys.
    pub fn signature(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.values.len().hash(&mut hasher);
        for value in &self.values {
            value.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Keep only the coordinates at `indices` (which must be increasing).
    pub fn select(&self, name: &'static str, indices: &[usize]) -> GridResult<Self> {
        Self::new(name, indices.iter().map(|&i| self.values[i]).collect())
    }
}
