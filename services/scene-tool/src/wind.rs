//! Wind (or current) component files.

use anyhow::{Context, Result};
use grid_processor::VectorField;
use ocean_common::GridPayload;
use serde::{Deserialize, Serialize};

/// `{lon, lat, u, v}` with row-major components; `null` marks missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindPayload {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub u: Vec<Vec<Option<f64>>>,
    pub v: Vec<Vec<Option<f64>>>,
}

impl WindPayload {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("invalid wind payload")
    }

    pub fn into_field(self) -> Result<VectorField> {
        let u = GridPayload {
            lon: self.lon.clone(),
            lat: self.lat.clone(),
            z: self.u,
        }
        .into_grid()
        .context("invalid u component")?;
        let v = GridPayload {
            lon: self.lon,
            lat: self.lat,
            z: self.v,
        }
        .into_grid()
        .context("invalid v component")?;
        Ok(VectorField::from_grids(u, v)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_payload_into_field() {
        let json = r#"{"lon":[0,1],"lat":[0,1],"u":[[1,1],[1,null]],"v":[[0,0],[0,0]]}"#;
        let field = WindPayload::from_slice(json.as_bytes())
            .unwrap()
            .into_field()
            .unwrap();
        assert_eq!(field.max_speed(), 1.0);
        assert!(field.sample_bilinear(0.0, 0.0).is_some());
    }

    #[test]
    fn test_mismatched_components_rejected() {
        let json = r#"{"lon":[0,1],"lat":[0,1],"u":[[1,1],[1,1]],"v":[[0,0]]}"#;
        let wind = WindPayload::from_slice(json.as_bytes()).unwrap();
        assert!(wind.into_field().is_err());
    }
}
