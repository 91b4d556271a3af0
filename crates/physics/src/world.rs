//! The physics world: rapier state plus the fixed-step accumulator.

use std::collections::HashSet;

use glam::Vec3;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{PhysicsError, Result};
use crate::events::{self, CollideEvent};
use crate::material::{ContactMaterial, ContactProperties, MaterialId, MaterialTable};
use crate::types::{BodyDesc, BodyHandle, Pose, Shape};

/// World-wide settings.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity in m/s².
    pub gravity: [f32; 3],
    /// Let bodies fall asleep once they come to rest.
    pub allow_sleep: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            allow_sleep: true,
        }
    }
}

/// What a call to [`PhysicsWorld::step`] actually did.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    pub fixed_dt: f32,
    pub real_dt: f32,
    pub max_substeps: u32,
    /// Internal fixed steps that ran during this call.
    pub substeps: u32,
}

/// Rigid body simulation.
///
/// Broad-phase is rapier's sweep-and-prune; materials and contact rules
/// come from the [`MaterialTable`], which also acts as the solver hook.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    gravity: rapier::Vector<f32>,
    pipeline: rapier::PhysicsPipeline,
    integration: rapier::IntegrationParameters,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    materials: MaterialTable,
    subscribed: HashSet<BodyHandle>,
    pending: Vec<CollideEvent>,
    touching: events::Touching,
    accumulator: f32,
    elapsed: f64,
}

impl PhysicsWorld {
    #[must_use]
    pub fn new(config: PhysicsConfig) -> Self {
        let [gx, gy, gz] = config.gravity;
        Self {
            config,
            gravity: rapier::Vector::new(gx, gy, gz),
            pipeline: rapier::PhysicsPipeline::new(),
            integration: rapier::IntegrationParameters::default(),
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            materials: MaterialTable::new(),
            subscribed: HashSet::new(),
            pending: Vec::new(),
            touching: events::Touching::new(),
            accumulator: 0.0,
            elapsed: 0.0,
        }
    }

    #[must_use]
    pub fn gravity(&self) -> Vec3 {
        Vec3::new(self.gravity.x, self.gravity.y, self.gravity.z)
    }

    // ---- materials ----

    /// Register a named material.
    ///
    /// # Errors
    ///
    /// Fails if the name is already registered.
    pub fn add_material(&mut self, name: &str) -> Result<MaterialId> {
        self.materials.add(name)
    }

    /// Look up a material by name.
    ///
    /// # Errors
    ///
    /// Fails if no material has that name.
    pub fn material(&self, name: &str) -> Result<MaterialId> {
        self.materials.get(name)
    }

    pub fn add_contact_material(&mut self, rule: ContactMaterial) {
        self.materials.add_contact_material(rule);
    }

    pub fn set_default_contact_material(&mut self, properties: ContactProperties) {
        self.materials.set_default_contact(properties);
    }

    #[must_use]
    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    // ---- bodies ----

    pub fn add_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let builder = if desc.is_static() {
            rapier::RigidBodyBuilder::fixed()
        } else {
            rapier::RigidBodyBuilder::dynamic().can_sleep(self.config.allow_sleep)
        };
        let handle = self.bodies.insert(builder.position(desc.pose.to_isometry()));

        let contact = self.materials.resolve(desc.material, desc.material);
        let mut collider = match desc.shape {
            Shape::Sphere { radius } => rapier::ColliderBuilder::ball(radius),
            Shape::Box { half_extents } => {
                rapier::ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            Shape::Plane => rapier::ColliderBuilder::halfspace(rapier::Vector::z_axis()),
        }
        .friction(contact.friction)
        .restitution(contact.restitution)
        .active_hooks(rapier::ActiveHooks::MODIFY_SOLVER_CONTACTS)
        .user_data(desc.material.map_or(0, MaterialId::to_user_data));
        if !desc.is_static() {
            collider = collider.mass(desc.mass);
        }
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        let handle = BodyHandle(handle);
        trace!(?handle, shape = ?desc.shape, "added body");
        handle
    }

    /// Remove a body and its collider. Returns `false` if it was not present.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.subscribed.remove(&handle);
        self.pending.retain(|e| e.body != handle);
        self.touching
            .retain(|&(body, other)| body != handle && other != Some(handle));
        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    #[must_use]
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Bodies currently awake and simulated.
    #[must_use]
    pub fn active_body_count(&self) -> usize {
        self.islands.active_dynamic_bodies().len()
    }

    #[must_use]
    pub fn pose(&self, handle: BodyHandle) -> Option<Pose> {
        self.bodies
            .get(handle.0)
            .map(|body| Pose::from_isometry(body.position()))
    }

    /// Linear velocity of a body.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::BodyNotFound`] for unknown handles.
    pub fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec3> {
        self.bodies
            .get(handle.0)
            .map(|body| {
                let v = body.linvel();
                Vec3::new(v.x, v.y, v.z)
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    // ---- collide events ----

    /// Start reporting `collide` events for this body.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::BodyNotFound`] for unknown handles.
    pub fn subscribe_collide(&mut self, handle: BodyHandle) -> Result<()> {
        if !self.contains(handle) {
            return Err(PhysicsError::BodyNotFound(handle));
        }
        self.subscribed.insert(handle);
        Ok(())
    }

    /// Stop reporting `collide` events. Returns whether it was subscribed.
    pub fn unsubscribe_collide(&mut self, handle: BodyHandle) -> bool {
        self.pending.retain(|e| e.body != handle);
        self.subscribed.remove(&handle)
    }

    #[must_use]
    pub fn is_subscribed(&self, handle: BodyHandle) -> bool {
        self.subscribed.contains(&handle)
    }

    /// Take every event queued since the last drain, oldest first.
    pub fn drain_collide_events(&mut self) -> Vec<CollideEvent> {
        std::mem::take(&mut self.pending)
    }

    // ---- stepping ----

    /// Advance the simulation.
    ///
    /// `real_dt` is added to an accumulator which is consumed in whole
    /// `fixed_dt` steps, at most `max_substeps` of them. Whatever backlog
    /// remains beyond a single step is dropped so a slow frame never causes a
    /// spiral of catch-up work.
    pub fn step(&mut self, fixed_dt: f32, real_dt: f32, max_substeps: u32) -> StepReport {
        self.accumulator += real_dt.max(0.0);

        let mut substeps = 0;
        while self.accumulator >= fixed_dt && substeps < max_substeps {
            self.internal_step(fixed_dt);
            self.accumulator -= fixed_dt;
            substeps += 1;
        }
        if fixed_dt > 0.0 {
            self.accumulator %= fixed_dt;
        }

        let report = StepReport {
            fixed_dt,
            real_dt,
            max_substeps,
            substeps,
        };
        debug!(substeps, real_dt, "physics step");
        report
    }

    /// Simulated time in seconds.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    fn internal_step(&mut self, dt: f32) {
        self.integration.dt = dt;
        let before = if self.subscribed.is_empty() {
            events::VelocitySnapshot::new()
        } else {
            events::snapshot(&self.bodies)
        };

        self.pipeline.step(
            &self.gravity,
            &self.integration,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &self.materials,
            &(),
        );
        self.elapsed += f64::from(dt);

        // Contacts are tracked even without subscribers so that a body
        // subscribing mid-contact does not see that contact as new.
        self.touching = events::collect(
            &self.narrow_phase,
            &self.colliders,
            &before,
            &self.subscribed,
            &self.touching,
            &mut self.pending,
        );
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    const DT: f32 = 1.0 / 60.0;

    fn floor(world: &mut PhysicsWorld) -> BodyHandle {
        let desc = BodyDesc::new(0.0, Shape::Plane).with_rotation(Quat::from_axis_angle(
            Vec3::NEG_X,
            std::f32::consts::FRAC_PI_2,
        ));
        world.add_body(&desc)
    }

    #[test]
    fn new_world_is_empty() {
        let world = PhysicsWorld::default();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.gravity(), Vec3::new(0.0, -9.82, 0.0));
    }

    #[test]
    fn accumulator_caps_substeps() {
        let mut world = PhysicsWorld::default();
        let report = world.step(DT, 1.0, 3);
        assert_eq!(report.substeps, 3);
        assert_eq!(report.max_substeps, 3);

        // backlog was dropped, so a tiny frame does nothing
        let report = world.step(DT, 0.001, 3);
        assert_eq!(report.substeps, 0);
    }

    #[test]
    fn accumulator_carries_partial_steps() {
        let mut world = PhysicsWorld::default();
        assert_eq!(world.step(DT, DT * 0.6, 3).substeps, 0);
        assert_eq!(world.step(DT, DT * 0.6, 3).substeps, 1);
    }

    #[test]
    fn floor_plane_faces_up() {
        let mut world = PhysicsWorld::default();
        floor(&mut world);
        let ball = world.add_body(
            &BodyDesc::new(1.0, Shape::Sphere { radius: 0.5 }).with_position(Vec3::new(0.0, 2.0, 0.0)),
        );
        for _ in 0..240 {
            world.step(DT, DT, 3);
        }
        let y = world.pose(ball).unwrap().position.y;
        assert!((y - 0.5).abs() < 0.05, "ball should rest on the floor, y = {y}");
    }

    #[test]
    fn removed_bodies_are_gone() {
        let mut world = PhysicsWorld::default();
        let ball = world.add_body(&BodyDesc::new(1.0, Shape::Sphere { radius: 0.5 }));
        world.subscribe_collide(ball).unwrap();
        assert!(world.remove_body(ball));
        assert!(!world.contains(ball));
        assert!(!world.is_subscribed(ball));
        assert!(!world.remove_body(ball));
        assert!(world.pose(ball).is_none());
    }
}
