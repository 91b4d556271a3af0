//! Spawn parameters for spheres and boxes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::SpawnRanges;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Sphere,
    Box,
}

/// Dimensions of a spawned shape. Not validated: zero or negative sizes are
/// passed through to the physics and scene layers as given.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SpawnShape {
    Sphere { radius: f32 },
    Box { width: f32, height: f32, depth: f32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnParams {
    #[serde(flatten)]
    pub shape: SpawnShape,
    pub position: [f32; 3],
}

impl SpawnParams {
    #[must_use]
    pub fn sphere(radius: f32, position: [f32; 3]) -> Self {
        Self {
            shape: SpawnShape::Sphere { radius },
            position,
        }
    }

    #[must_use]
    pub fn cuboid(width: f32, height: f32, depth: f32, position: [f32; 3]) -> Self {
        Self {
            shape: SpawnShape::Box {
                width,
                height,
                depth,
            },
            position,
        }
    }

    pub fn random_sphere(rng: &mut fastrand::Rng, ranges: &SpawnRanges) -> Self {
        let radius = ranges.size.sample(rng);
        Self::sphere(radius, random_position(rng, ranges))
    }

    pub fn random_box(rng: &mut fastrand::Rng, ranges: &SpawnRanges) -> Self {
        let width = ranges.size.sample(rng);
        let height = ranges.size.sample(rng);
        let depth = ranges.size.sample(rng);
        Self::cuboid(width, height, depth, random_position(rng, ranges))
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self.shape {
            SpawnShape::Sphere { .. } => ShapeKind::Sphere,
            SpawnShape::Box { .. } => ShapeKind::Box,
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

fn random_position(rng: &mut fastrand::Rng, ranges: &SpawnRanges) -> [f32; 3] {
    let x = ranges.x.sample(rng);
    let y = ranges.y.sample(rng);
    let z = ranges.z.sample(rng);
    [x, y, z]
}
