//! Validated 2D value grids and the JSON payload they are loaded from.
//!
//! Grid JSON looks like `{ "lon": [...], "lat": [...], "z": [[...], ...] }`
//! with `z[j][i]` at `lat[j]`, `lon[i]`. Cells may be `null`, which loads as
//! NaN. Everything is checked here so malformed data never travels further
//! than the load boundary.

use serde::{Deserialize, Serialize};

use crate::axis::CoordinateAxis;
use crate::bbox::BoundingBox;
use crate::error::{GridError, GridResult};

/// Raw grid payload as found on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridPayload {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub z: Vec<Vec<Option<f64>>>,
}

impl GridPayload {
    /// Parse a payload from JSON text. Missing or non-array fields are errors.
    pub fn from_json(json: &str) -> GridResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> GridResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Build a payload from fully populated rows.
    pub fn from_rows(lon: Vec<f64>, lat: Vec<f64>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            lon,
            lat,
            z: rows
                .into_iter()
                .map(|row| row.into_iter().map(Some).collect())
                .collect(),
        }
    }

    /// Validate the payload and convert it into a [`ValueGrid`].
    pub fn into_grid(self) -> GridResult<ValueGrid> {
        let lon = CoordinateAxis::new("lon", self.lon)?;
        let lat = CoordinateAxis::new("lat", self.lat)?;
        ValueGrid::from_rows(lon, lat, self.z)
    }
}

/// A row-major grid of `f32` values on its own lon/lat axes.
///
/// Missing cells are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGrid {
    lon: CoordinateAxis,
    lat: CoordinateAxis,
    values: Vec<f32>,
}

impl ValueGrid {
    /// Build from nested rows, checking `rows.len() == lat.len()` and every
    /// row length against `lon.len()`.
    pub fn from_rows(
        lon: CoordinateAxis,
        lat: CoordinateAxis,
        rows: Vec<Vec<Option<f64>>>,
    ) -> GridResult<Self> {
        if rows.len() != lat.len() {
            return Err(GridError::RowCountMismatch {
                rows: rows.len(),
                expected: lat.len(),
            });
        }

        let width = lon.len();
        let mut values = Vec::with_capacity(width * lat.len());
        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(GridError::RaggedRow {
                    row: row_index,
                    len: row.len(),
                    expected: width,
                });
            }
            values.extend(row.into_iter().map(|v| v.map_or(f32::NAN, |v| v as f32)));
        }

        Ok(Self { lon, lat, values })
    }

    /// Build from an already flattened row-major buffer.
    pub fn from_flat(lon: CoordinateAxis, lat: CoordinateAxis, values: Vec<f32>) -> GridResult<Self> {
        let expected = lon.len() * lat.len();
        if values.len() != expected {
            return Err(GridError::BufferSizeMismatch {
                len: values.len(),
                expected,
            });
        }
        Ok(Self { lon, lat, values })
    }

    pub fn lon(&self) -> &CoordinateAxis {
        &self.lon
    }

    pub fn lat(&self) -> &CoordinateAxis {
        &self.lat
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Number of columns (longitudes).
    pub fn width(&self) -> usize {
        self.lon.len()
    }

    /// Number of rows (latitudes).
    pub fn height(&self) -> usize {
        self.lat.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at column `i`, row `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.width() || j >= self.height() {
            return None;
        }
        Some(self.values[j * self.width() + i])
    }

    pub fn row(&self, j: usize) -> &[f32] {
        let width = self.width();
        &self.values[j * width..(j + 1) * width]
    }

    /// Copy out the grid as nested rows (the renderer's `z[j][i]` layout).
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        (0..self.height()).map(|j| self.row(j).to_vec()).collect()
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_axes(&self.lon, &self.lat)
    }

    /// True when both axes have the same lengths as `other`'s.
    pub fn matches_shape(&self, lon: &CoordinateAxis, lat: &CoordinateAxis) -> bool {
        self.lon.len() == lon.len() && self.lat.len() == lat.len()
    }

    /// Minimum and maximum over finite values, or `None` if there are none.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        finite_range(&self.values)
    }

    /// Same axes, new values.
    pub fn with_values(&self, values: Vec<f32>) -> GridResult<Self> {
        Self::from_flat(self.lon.clone(), self.lat.clone(), values)
    }
}

/// Minimum and maximum over the finite entries of `values`.
pub fn finite_range(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_with_nulls() {
        let json = r#"{"lon":[0,1],"lat":[10,11],"z":[[1,null],[3,4]]}"#;
        let grid = GridPayload::from_json(json).unwrap().into_grid().unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert!(grid.get(1, 0).unwrap().is_nan());
        assert_eq!(grid.get(1, 1), Some(4.0));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = GridPayload::from_json(r#"{"lon":[0,1],"lat":[0]}"#).unwrap_err();
        assert!(matches!(err, GridError::Malformed(_)));
    }

    #[test]
    fn test_non_array_field_is_malformed() {
        let err = GridPayload::from_json(r#"{"lon":5,"lat":[0],"z":[[1]]}"#).unwrap_err();
        assert!(matches!(err, GridError::Malformed(_)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let json = r#"{"lon":[0,1],"lat":[10,11],"z":[[1,2],[3]]}"#;
        let err = GridPayload::from_json(json).unwrap().into_grid().unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedRow {
                row: 1,
                len: 1,
                expected: 2
            }
        );
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let json = r#"{"lon":[0,1],"lat":[10,11,12],"z":[[1,2],[3,4]]}"#;
        let err = GridPayload::from_json(json).unwrap().into_grid().unwrap_err();
        assert!(matches!(err, GridError::RowCountMismatch { rows: 2, expected: 3 }));
    }

    #[test]
    fn test_finite_range_ignores_nan() {
        assert_eq!(finite_range(&[f32::NAN, 2.0, -1.0]), Some((-1.0, 2.0)));
        assert_eq!(finite_range(&[f32::NAN]), None);
    }
}
