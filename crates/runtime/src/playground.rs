//! The playground: physics world, scene and the pairs linking them.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use physics::{
    BodyDesc, CollideEvent, ContactMaterial, ContactProperties, MaterialId as BodyMaterial,
    PhysicsConfig, PhysicsWorld, Shape, StepReport,
};
use render::{
    Color, Geometry, GeometryId, Light, MaterialId, Scene, SceneObject, ShadowSettings,
    StandardMaterial, Transform,
};
use tracing::{debug, info, warn};

use crate::clock::FrameClock;
use crate::config::PlaygroundConfig;
use crate::debug::DebugAction;
use crate::registry::{ObjectPair, ObjectRegistry};
use crate::sound::HitSound;
use crate::spawn::{ShapeKind, SpawnParams, SpawnShape};

/// Name of the physics material shared by every spawned body.
pub const DEFAULT_MATERIAL: &str = "default";

const FLOOR_SIZE: f32 = 10.0;
const SPHERE_SEGMENTS: u32 = 20;

/// What one [`Playground::frame`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub step: StepReport,
    /// Collide events delivered to spawned bodies.
    pub collisions: usize,
    pub sounds_played: usize,
    /// Visual objects whose transform was copied from their body.
    pub synced: usize,
}

/// Geometry and materials created once and referenced by every spawn.
#[derive(Copy, Clone, Debug)]
struct SharedVisuals {
    sphere_geometry: GeometryId,
    sphere_material: MaterialId,
    box_geometry: GeometryId,
    box_material: MaterialId,
}

/// Application state of the playground.
///
/// Owns the physics world, the scene, the registry of spawned pairs and
/// the hit sound. Every operation runs on the caller's thread.
pub struct Playground<S: HitSound> {
    config: PlaygroundConfig,
    world: PhysicsWorld,
    scene: Scene,
    registry: ObjectRegistry,
    clock: FrameClock,
    rng: fastrand::Rng,
    sound: S,
    material: BodyMaterial,
    visuals: SharedVisuals,
}

impl<S: HitSound> Playground<S> {
    /// Build the world with its floor, lights and shared assets. Nothing
    /// is spawned yet; see [`Self::populate`].
    ///
    /// # Errors
    ///
    /// Only fails if the shared physics material cannot be registered.
    pub fn new(config: PlaygroundConfig, sound: S, seed: Option<u64>) -> physics::Result<Self> {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            gravity: config.gravity,
            allow_sleep: config.allow_sleep,
        });

        let material = world.add_material(DEFAULT_MATERIAL)?;
        let contact = ContactProperties::new(config.friction, config.restitution);
        world.add_contact_material(ContactMaterial::new(
            material,
            material,
            contact.friction,
            contact.restitution,
        ));
        world.set_default_contact_material(contact);

        // The plane's solid side lies below local +Z; tilt it so +Z is up.
        let floor_rotation = Quat::from_rotation_x(-FRAC_PI_2);
        world.add_body(&BodyDesc::new(0.0, Shape::Plane).with_rotation(floor_rotation));

        let mut scene = Scene::new();
        let floor_geometry = scene.add_geometry(Geometry::Plane {
            width: FLOOR_SIZE,
            height: FLOOR_SIZE,
        });
        let floor_material = scene.add_material(StandardMaterial {
            color: Color::from_hex(0x77_77_77),
            metalness: 0.3,
            roughness: 0.4,
            env_map_intensity: 0.5,
        });
        scene.add(
            SceneObject::new(floor_geometry, floor_material)
                .with_transform(Transform::default().with_rotation(floor_rotation))
                .receiving_shadow(true),
        );

        scene.add_light(Light::Ambient {
            color: Color::from_hex(0xff_f0_ff),
            intensity: 1.0,
        });
        scene.add_light(Light::Directional {
            color: Color::WHITE,
            intensity: 0.9,
            position: Vec3::new(5.0, 5.0, 5.0),
            shadow: Some(ShadowSettings::default()),
        });

        let visuals = SharedVisuals::create(&mut scene);

        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        info!(
            friction = config.friction,
            restitution = config.restitution,
            "playground ready"
        );

        Ok(Self {
            config,
            world,
            scene,
            registry: ObjectRegistry::new(),
            clock: FrameClock::new(),
            rng,
            sound,
            material,
            visuals,
        })
    }

    /// Spawn the configured initial objects.
    pub fn populate(&mut self) -> Vec<ObjectPair> {
        let initial = self.config.initial_objects.clone();
        initial.iter().map(|params| self.spawn(params)).collect()
    }

    pub fn spawn(&mut self, params: &SpawnParams) -> ObjectPair {
        let position = params.position();
        match params.shape {
            SpawnShape::Sphere { radius } => self.create_sphere(radius, position),
            SpawnShape::Box {
                width,
                height,
                depth,
            } => self.create_box(width, height, depth, position),
        }
    }

    /// Add a dynamic sphere of `radius` at `position`.
    pub fn create_sphere(&mut self, radius: f32, position: Vec3) -> ObjectPair {
        let object = SceneObject::new(self.visuals.sphere_geometry, self.visuals.sphere_material)
            .with_transform(Transform::from_position(position).with_scale(Vec3::splat(radius)));
        let body = BodyDesc::new(1.0, Shape::Sphere { radius });
        debug!(radius, ?position, "spawn sphere");
        self.insert(ShapeKind::Sphere, object, body, position)
    }

    /// Add a dynamic box with full extents `width` x `height` x `depth`.
    pub fn create_box(&mut self, width: f32, height: f32, depth: f32, position: Vec3) -> ObjectPair {
        let size = Vec3::new(width, height, depth);
        let object = SceneObject::new(self.visuals.box_geometry, self.visuals.box_material)
            .with_transform(Transform::from_position(position).with_scale(size));
        let body = BodyDesc::new(
            1.0,
            Shape::Box {
                half_extents: size * 0.5,
            },
        );
        debug!(?size, ?position, "spawn box");
        self.insert(ShapeKind::Box, object, body, position)
    }

    fn insert(
        &mut self,
        kind: ShapeKind,
        object: SceneObject,
        body: BodyDesc,
        position: Vec3,
    ) -> ObjectPair {
        let visual = self.scene.add(object.casting_shadow(true));
        let body = self.world.add_body(
            &body
                .with_position(position)
                .with_material(self.material),
        );
        if let Err(err) = self.world.subscribe_collide(body) {
            warn!("failed to subscribe {body:?} to collide events: {err}");
        }
        let pair = ObjectPair { visual, body, kind };
        self.registry.push(pair);
        pair
    }

    pub fn spawn_random_sphere(&mut self) -> ObjectPair {
        let params = SpawnParams::random_sphere(&mut self.rng, &self.config.spawn);
        self.spawn(&params)
    }

    pub fn spawn_random_box(&mut self) -> ObjectPair {
        let params = SpawnParams::random_box(&mut self.rng, &self.config.spawn);
        self.spawn(&params)
    }

    pub fn run_action(&mut self, action: DebugAction) {
        match action {
            DebugAction::CreateSphere => {
                self.spawn_random_sphere();
            }
            DebugAction::CreateBox => {
                self.spawn_random_box();
            }
            DebugAction::Reset => {
                self.reset();
            }
        }
    }

    /// Remove every spawned pair from the world and the scene. Returns how
    /// many pairs were removed.
    pub fn reset(&mut self) -> usize {
        let mut removed = 0;
        for pair in self.registry.drain() {
            self.world.unsubscribe_collide(pair.body);
            if !self.world.remove_body(pair.body) {
                warn!("body {:?} was already gone", pair.body);
            }
            if self.scene.remove(pair.visual).is_none() {
                warn!("visual {:?} was already gone", pair.visual);
            }
            removed += 1;
        }
        info!(removed, "scene reset");
        removed
    }

    /// Advance by the wall-clock time since the previous tick.
    pub fn tick(&mut self) -> FrameReport {
        let real_dt = self.clock.tick();
        self.frame(real_dt)
    }

    /// Step physics, react to collisions, then copy every body pose onto
    /// its visual.
    pub fn frame(&mut self, real_dt: f32) -> FrameReport {
        let step = self.world.step(
            self.config.fixed_timestep,
            real_dt,
            self.config.max_substeps,
        );

        let events = self.world.drain_collide_events();
        let sounds_played = self.react(&events);

        let mut synced = 0;
        for pair in &self.registry {
            let Some(pose) = self.world.pose(pair.body) else {
                continue;
            };
            if self
                .scene
                .set_transform(pair.visual, pose.position, pose.rotation)
            {
                synced += 1;
            }
        }

        FrameReport {
            step,
            collisions: events.len(),
            sounds_played,
            synced,
        }
    }

    /// Play the hit sound once for every event faster than the threshold.
    fn react(&mut self, events: &[CollideEvent]) -> usize {
        let mut played = 0;
        for event in events {
            if event.impact_velocity > self.config.impact_threshold {
                let volume = self.rng.f32();
                debug!(impact = event.impact_velocity, volume, "hit");
                self.sound.play(volume);
                played += 1;
            }
        }
        played
    }

    #[must_use]
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[must_use]
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    #[must_use]
    pub fn sound(&self) -> &S {
        &self.sound
    }

    #[must_use]
    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }
}

impl SharedVisuals {
    fn create(scene: &mut Scene) -> Self {
        let surface = StandardMaterial {
            color: Color::WHITE,
            metalness: 0.3,
            roughness: 0.4,
            env_map_intensity: 1.0,
        };
        Self {
            sphere_geometry: scene.add_geometry(Geometry::Sphere {
                radius: 1.0,
                width_segments: SPHERE_SEGMENTS,
                height_segments: SPHERE_SEGMENTS,
            }),
            sphere_material: scene.add_material(surface),
            box_geometry: scene.add_geometry(Geometry::Box {
                width: 1.0,
                height: 1.0,
                depth: 1.0,
            }),
            box_material: scene.add_material(surface),
        }
    }
}
