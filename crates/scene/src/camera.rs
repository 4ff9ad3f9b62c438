//! Persisted camera orientation.
//!
//! The renderer owns the camera; this only normalises the record it stores
//! between sessions. Any vector with a missing or non-finite component is
//! dropped so the renderer falls back to its default for that part.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SceneError};

pub const CAMERA_RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    fn from_value(value: &Value) -> Option<Self> {
        let x = value.get("x")?.as_f64()?;
        let y = value.get("y")?.as_f64()?;
        let z = value.get("z")?.as_f64()?;
        Some(Self::new(x, y, z)).filter(Vec3::is_finite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRecord {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Projection>,
}

impl Default for CameraRecord {
    fn default() -> Self {
        Self {
            version: CAMERA_RECORD_VERSION,
            eye: None,
            up: None,
            center: None,
            projection: None,
        }
    }
}

impl CameraRecord {
    /// Parse and normalise a stored record.
    ///
    /// Unknown versions are rejected; bad vectors and projections are dropped.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(SceneError::Camera("record is not an object".to_string()));
        }

        let version = value
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| SceneError::Camera("missing version".to_string()))?;
        if version != CAMERA_RECORD_VERSION as u64 {
            return Err(SceneError::Camera(format!(
                "unsupported version {}",
                version
            )));
        }

        let vector = |key: &str| value.get(key).and_then(Vec3::from_value);
        let projection = value
            .get("projection")
            .and_then(|p| p.get("type").or(Some(p)))
            .and_then(|p| serde_json::from_value(p.clone()).ok());

        Ok(Self {
            version: CAMERA_RECORD_VERSION,
            eye: vector("eye"),
            up: vector("up"),
            center: vector("center"),
            projection,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Nothing usable survived normalisation.
    pub fn is_empty(&self) -> bool {
        self.eye.is_none() && self.up.is_none() && self.center.is_none() && self.projection.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record() {
        let json = r#"{
            "version": 1,
            "eye": {"x": 1.25, "y": -1.5, "z": 0.8},
            "up": {"x": 0, "y": 0, "z": 1},
            "center": {"x": 0, "y": 0, "z": -0.1},
            "projection": {"type": "orthographic"}
        }"#;
        let record = CameraRecord::from_json(json).unwrap();
        assert_eq!(record.eye, Some(Vec3::new(1.25, -1.5, 0.8)));
        assert_eq!(record.up, Some(Vec3::new(0.0, 0.0, 1.0)));
        assert_eq!(record.projection, Some(Projection::Orthographic));
    }

    #[test]
    fn test_bad_vectors_dropped() {
        let json = r#"{
            "version": 1,
            "eye": {"x": null, "y": 1, "z": 1},
            "up": {"x": 0, "y": 0},
            "center": {"x": 0, "y": "a", "z": 0},
            "projection": "perspective"
        }"#;
        let record = CameraRecord::from_json(json).unwrap();
        assert!(record.eye.is_none());
        assert!(record.up.is_none());
        assert!(record.center.is_none());
        assert_eq!(record.projection, Some(Projection::Perspective));
    }

    #[test]
    fn test_unknown_version_rejected() {
        assert!(matches!(
            CameraRecord::from_json(r#"{"version": 2}"#),
            Err(SceneError::Camera(_))
        ));
        assert!(CameraRecord::from_json(r#"{"eye": {"x": 1, "y": 1, "z": 1}}"#).is_err());
        assert!(CameraRecord::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_round_trip_skips_empty_parts() {
        let record = CameraRecord {
            eye: Some(Vec3::new(1.0, 1.0, 1.0)),
            ..Default::default()
        };
        let json = record.to_json().unwrap();
        assert!(!json.contains("center"));
        assert_eq!(CameraRecord::from_json(&json).unwrap(), record);
        assert!(CameraRecord::default().is_empty());
    }
}
