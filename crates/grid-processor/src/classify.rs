//! Classified point layers from 3D volumes.
//!
//! A volume is split into value classes `[centre - tol, centre + tol]`
//! stepping by `step`. Each class keeps at most `cap` points, chosen by
//! reservoir sampling so every cell in the class has the same chance of
//! being drawn regardless of volume size.

use ocean_common::CoordinateAxis;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GridProcessorError, Result};

/// A 3D scalar volume `values[k][j][i]` at `depth[k]`, `lat[j]`, `lon[i]`.
#[derive(Debug, Clone)]
pub struct Volume {
    lon: CoordinateAxis,
    lat: CoordinateAxis,
    depth: Vec<f64>,
    values: Vec<f32>,
}

impl Volume {
    /// Depths are metres, negative down.
    pub fn new(
        lon: CoordinateAxis,
        lat: CoordinateAxis,
        depth: Vec<f64>,
        values: Vec<f32>,
    ) -> Result<Self> {
        let expected = lon.len() * lat.len() * depth.len();
        if values.len() != expected {
            return Err(GridProcessorError::shape_mismatch(format!(
                "volume has {} values, axes describe {}",
                values.len(),
                expected
            )));
        }
        Ok(Self {
            lon,
            lat,
            depth,
            values,
        })
    }

    pub fn lon(&self) -> &CoordinateAxis {
        &self.lon
    }

    pub fn lat(&self) -> &CoordinateAxis {
        &self.lat
    }

    pub fn depth(&self) -> &[f64] {
        &self.depth
    }
}

/// Upper bound on the number of classes in one [`ClassSpec`].
pub const MAX_CLASSES: usize = 1024;

/// Class layout and sampling cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    /// Centre of the first class.
    pub start: f64,
    /// Centre of the last class (inclusive).
    pub end: f64,
    pub step: f64,
    /// Half-width of each class around its centre.
    pub tolerance: f64,
    /// Maximum points kept per class.
    pub cap: usize,
    /// Seed for the replacement sequence, typically the time index.
    pub seed: u64,
}

impl Default for ClassSpec {
    fn default() -> Self {
        Self {
            start: -2.0,
            end: 20.0,
            step: 1.0,
            tolerance: 0.25,
            cap: 4000,
            seed: 0,
        }
    }
}

impl ClassSpec {
    pub fn class_count(&self) -> usize {
        if !(self.step > 0.0) || self.end < self.start {
            return 0;
        }
        ((self.end - self.start) / self.step + 1e-9).floor() as usize + 1
    }

    /// Reject layouts with no classes or more than [`MAX_CLASSES`].
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() || self.end < self.start {
            return Err(GridProcessorError::degenerate(format!(
                "class range {}..{} is empty",
                self.start, self.end
            )));
        }
        if !(self.step > 0.0) || !self.step.is_finite() {
            return Err(GridProcessorError::degenerate(format!(
                "class step {} must be > 0",
                self.step
            )));
        }
        let count = self.class_count();
        if count > MAX_CLASSES {
            return Err(GridProcessorError::degenerate(format!(
                "{} classes exceeds the limit of {}",
                count, MAX_CLASSES
            )));
        }
        Ok(())
    }

    fn class_of(&self, value: f64) -> Option<usize> {
        let k = ((value - self.start) / self.step).round();
        if k < 0.0 || k >= self.class_count() as f64 {
            return None;
        }
        let centre = self.start + k * self.step;
        ((value - centre).abs() <= self.tolerance).then_some(k as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassPoint {
    pub lon: f64,
    pub lat: f64,
    pub depth: f64,
}

/// Points sampled for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBucket {
    pub centre: f64,
    pub points: Vec<ClassPoint>,
    /// Number of cells that fell into the class before sampling.
    pub seen: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedPoints {
    pub buckets: Vec<ClassBucket>,
}

impl ClassifiedPoints {
    /// Buckets that received at least one point.
    pub fn non_empty(&self) -> impl Iterator<Item = &ClassBucket> {
        self.buckets.iter().filter(|b| !b.points.is_empty())
    }

    pub fn total_points(&self) -> usize {
        self.buckets.iter().map(|b| b.points.len()).sum()
    }
}

/// Linear congruential generator for replacement slots. Cheap and
/// reproducible from frame to frame; the sequence itself carries no meaning.
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64, class: usize) -> Self {
        Self(
            seed.wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add((class as u64).wrapping_mul(1_442_695_040_888_963_407))
                .wrapping_add(1),
        )
    }

    fn next_below(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) % bound as u64) as usize
    }
}

/// Classify every finite cell of `volume` and reservoir-sample each class.
pub fn classify_volume(volume: &Volume, spec: &ClassSpec) -> Result<ClassifiedPoints> {
    spec.validate()?;
    let n_classes = spec.class_count();
    let mut buckets: Vec<ClassBucket> = (0..n_classes)
        .map(|k| ClassBucket {
            centre: spec.start + k as f64 * spec.step,
            points: Vec::new(),
            seen: 0,
        })
        .collect();
    if spec.cap == 0 {
        return Ok(ClassifiedPoints { buckets });
    }

    let mut rngs: Vec<Lcg> = (0..n_classes).map(|k| Lcg::new(spec.seed, k)).collect();
    let (nx, ny) = (volume.lon.len(), volume.lat.len());

    for (k, &depth) in volume.depth.iter().enumerate() {
        for (j, &lat) in volume.lat.values().iter().enumerate() {
            let row = &volume.values[(k * ny + j) * nx..(k * ny + j + 1) * nx];
            for (i, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    continue;
                }
                let Some(class) = spec.class_of(value as f64) else {
                    continue;
                };

                let point = ClassPoint {
                    lon: volume.lon.values()[i],
                    lat,
                    depth,
                };
                let bucket = &mut buckets[class];
                bucket.seen += 1;
                if bucket.points.len() < spec.cap {
                    bucket.points.push(point);
                } else {
                    let slot = rngs[class].next_below(bucket.seen);
                    if slot < spec.cap {
                        bucket.points[slot] = point;
                    }
                }
            }
        }
    }

    let result = ClassifiedPoints { buckets };
    debug!(
        classes = n_classes,
        points = result.total_points(),
        "Classified volume"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(values: Vec<f32>, nx: usize, ny: usize, nz: usize) -> Volume {
        let lon = CoordinateAxis::linspace("lon", 0.0, (nx - 1) as f64, nx).unwrap();
        let lat = CoordinateAxis::linspace("lat", 60.0, 60.0 + (ny - 1) as f64, ny).unwrap();
        let depth = (0..nz).map(|k| -(k as f64) * 10.0).collect();
        Volume::new(lon, lat, depth, values).unwrap()
    }

    #[test]
    fn test_class_count() {
        let spec = ClassSpec {
            start: 0.0,
            end: 5.0,
            step: 1.0,
            ..Default::default()
        };
        assert_eq!(spec.class_count(), 6);
        assert_eq!(ClassSpec { step: 0.0, ..spec }.class_count(), 0);
    }

    #[test]
    fn test_tiny_step_rejected() {
        let vol = volume(vec![1.0; 4], 2, 2, 1);
        let spec = ClassSpec {
            start: 0.0,
            end: 20.0,
            step: 1e-9,
            ..Default::default()
        };
        let err = classify_volume(&vol, &spec).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::DegenerateInput);

        let zero = ClassSpec { step: 0.0, ..ClassSpec::default() };
        assert!(classify_volume(&vol, &zero).is_err());
        assert!(ClassSpec::default().validate().is_ok());
    }

    #[test]
    fn test_tolerance_window() {
        let spec = ClassSpec {
            start: 0.0,
            end: 3.0,
            step: 1.0,
            tolerance: 0.25,
            ..Default::default()
        };
        assert_eq!(spec.class_of(1.2), Some(1));
        assert_eq!(spec.class_of(1.4), None);
        assert_eq!(spec.class_of(-0.2), Some(0));
        assert_eq!(spec.class_of(3.6), None);
    }

    #[test]
    fn test_bucket_cap_is_respected() {
        let n = 20 * 20 * 5;
        let vol = volume(vec![2.0; n], 20, 20, 5);
        let spec = ClassSpec {
            start: 0.0,
            end: 4.0,
            cap: 50,
            ..Default::default()
        };
        let classes = classify_volume(&vol, &spec).unwrap();
        let bucket = &classes.buckets[2];
        assert_eq!(bucket.points.len(), 50);
        assert_eq!(bucket.seen, n);
        assert_eq!(classes.non_empty().count(), 1);
    }

    #[test]
    fn test_small_class_keeps_everything() {
        let vol = volume(vec![1.0, f32::NAN, 1.1, 7.0], 2, 2, 1);
        let spec = ClassSpec {
            start: 0.0,
            end: 2.0,
            ..Default::default()
        };
        let classes = classify_volume(&vol, &spec).unwrap();
        assert_eq!(classes.buckets[1].points.len(), 2);
        assert_eq!(classes.buckets[1].points[1].lat, 61.0);
        assert_eq!(classes.total_points(), 2);
    }

    #[test]
    fn test_same_seed_same_sample() {
        let values: Vec<f32> = (0..1000).map(|i| (i % 3) as f32).collect();
        let vol = volume(values, 10, 10, 10);
        let spec = ClassSpec {
            start: 0.0,
            end: 2.0,
            cap: 10,
            seed: 7,
            ..Default::default()
        };
        assert_eq!(classify_volume(&vol, &spec).unwrap(), classify_volume(&vol, &spec).unwrap());
    }
}
