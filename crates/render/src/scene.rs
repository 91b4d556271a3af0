//! Scene graph
//!
//! A flat, ordered list of visual objects plus the shared resources they
//! reference: geometries, materials, lights and an optional environment map.
//! The renderer converts it into GPU instances every frame; nothing in here
//! touches the GPU.

use std::path::PathBuf;

use glam::{Mat4, Quat, Vec3};

/// Handle of a visual object inside a [`Scene`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

/// Handle of a shared geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(usize);

/// Handle of a shared material.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

/// Shape description shared between objects. Objects scale it through their
/// [`Transform`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Geometry {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    /// Lies in the local XY plane, facing +Z.
    Plane { width: f32, height: f32 },
}

/// Linear RGB color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a `0xRRGGBB` sRGB literal.
    #[must_use]
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(f32::from(((hex >> shift) & 0xff) as u8) / 255.0);
        Self::rgb(channel(16), channel(8), channel(0))
    }

    #[must_use]
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Physically based surface description.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    /// Strength of the environment reflection; zero disables it.
    pub env_map_intensity: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 1.0,
            env_map_intensity: 1.0,
        }
    }
}

/// Shadow camera settings of a directional light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub far: f32,
    /// Half width of the orthographic shadow frustum.
    pub extent: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 1024,
            far: 15.0,
            extent: 7.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    /// Shines from `position` towards the origin.
    Directional {
        color: Color,
        intensity: f32,
        position: Vec3,
        shadow: Option<ShadowSettings>,
    },
}

/// Six cube faces in `+x, -x, +y, -y, +z, -z` order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvironmentMap {
    pub faces: [PathBuf; 6],
}

impl EnvironmentMap {
    /// `px.png`, `nx.png`, ... inside `dir`.
    #[must_use]
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            faces: ["px", "nx", "py", "ny", "pz", "nz"].map(|face| dir.join(format!("{face}.png"))),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rigid part of the transform (translation and rotation, no scale).
    #[must_use]
    pub fn rigid_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub transform: Transform,
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl SceneObject {
    #[must_use]
    pub fn new(geometry: GeometryId, material: MaterialId) -> Self {
        Self {
            transform: Transform::default(),
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn casting_shadow(mut self, cast: bool) -> Self {
        self.cast_shadow = cast;
        self
    }

    #[must_use]
    pub fn receiving_shadow(mut self, receive: bool) -> Self {
        self.receive_shadow = receive;
        self
    }
}

/// Everything the renderer draws.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<(ObjectId, SceneObject)>,
    next_id: u64,
    geometries: Vec<Geometry>,
    materials: Vec<StandardMaterial>,
    lights: Vec<Light>,
    environment: Option<EnvironmentMap>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    #[must_use]
    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0)
    }

    pub fn add_material(&mut self, material: StandardMaterial) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    #[must_use]
    pub fn material(&self, id: MaterialId) -> Option<&StandardMaterial> {
        self.materials.get(id.0)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    #[must_use]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn set_environment(&mut self, environment: Option<EnvironmentMap>) {
        self.environment = environment;
    }

    #[must_use]
    pub fn environment(&self) -> Option<&EnvironmentMap> {
        self.environment.as_ref()
    }

    /// Append an object; it is drawn after every object added before it.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push((id, object));
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        Some(self.objects.remove(index).1)
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.index_of(id).map(|i| &self.objects[i].1)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.index_of(id).map(|i| &mut self.objects[i].1)
    }

    /// Overwrite position and rotation, keeping the scale. Returns `false`
    /// for unknown ids.
    pub fn set_transform(&mut self, id: ObjectId, position: Vec3, rotation: Quat) -> bool {
        match self.get_mut(id) {
            Some(object) => {
                object.transform.position = position;
                object.transform.rotation = rotation;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    // Ids are handed out in increasing order and objects are only appended,
    // so the list stays sorted by id.
    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.binary_search_by_key(&id, |(id, _)| *id).ok()
    }
}
