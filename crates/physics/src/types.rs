//! Plain data types shared between the world and its callers.
//!
//! Everything here speaks `glam` so that the renderer and the application
//! core never have to touch nalgebra directly.

use glam::{Quat, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude as rapier;

use crate::material::MaterialId;

/// Opaque handle to a rigid body living in a [`crate::PhysicsWorld`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) rapier::RigidBodyHandle);

/// Position and orientation of a body in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub(crate) fn from_isometry(iso: &Isometry3<f32>) -> Self {
        let t = iso.translation.vector;
        let r = iso.rotation;
        Self {
            position: Vec3::new(t.x, t.y, t.z),
            rotation: Quat::from_xyzw(r.i, r.j, r.k, r.w),
        }
    }

    pub(crate) fn to_isometry(self) -> Isometry3<f32> {
        let p = self.position;
        let q = self.rotation;
        Isometry3::from_parts(
            Translation3::new(p.x, p.y, p.z),
            UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z)),
        )
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// Collision shape of a body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
    /// Infinite half-space. The solid side lies below the body's local +Z axis.
    Plane,
}

/// Everything needed to insert one body into the world.
#[derive(Clone, Debug)]
pub struct BodyDesc {
    /// Total mass in kilograms. Zero makes the body static.
    pub mass: f32,
    pub shape: Shape,
    pub pose: Pose,
    /// Physics material, or `None` to use the world's default contact material.
    pub material: Option<MaterialId>,
}

impl BodyDesc {
    #[must_use]
    pub fn new(mass: f32, shape: Shape) -> Self {
        Self {
            mass,
            shape,
            pose: Pose::default(),
            material: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.pose.position = position;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.pose.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pose_survives_isometry_conversion() {
        let pose = Pose::new(
            Vec3::new(1.0, -2.0, 3.5),
            Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.7),
        );
        let back = Pose::from_isometry(&pose.to_isometry());

        assert_relative_eq!(back.position.x, pose.position.x);
        assert_relative_eq!(back.position.y, pose.position.y);
        assert_relative_eq!(back.position.z, pose.position.z);
        assert!(back.rotation.dot(pose.rotation).abs() > 0.9999);
    }

    #[test]
    fn zero_mass_is_static() {
        assert!(BodyDesc::new(0.0, Shape::Plane).is_static());
        assert!(!BodyDesc::new(1.0, Shape::Sphere { radius: 0.5 }).is_static());
    }
}
