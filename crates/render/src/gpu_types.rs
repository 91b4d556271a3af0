//! GPU-compatible type definitions for rendering
//!
//! This module contains all the GPU buffer structures that are used to
//! pass data to the WGSL shaders. All types must be Pod and laid out the
//! way `shaders/scene.wgsl` declares them.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::camera::OrbitCamera;
use crate::scene::{Geometry, Light, Scene, SceneObject, StandardMaterial};

/// Uniform buffer that stores camera matrices for the SDF renderer
///
/// The buffer contains both the view projection matrix and its inverse as well
/// as the current eye position which are required by the ray marching shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined view projection matrix used for rendering
    pub view_proj: [[f32; 4]; 4],
    /// Inverse of view_proj used to transform rays into world space
    pub view_proj_inv: [[f32; 4]; 4],
    /// Camera position in world coordinates, `w` holds the far plane
    pub eye: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &OrbitCamera) -> Self {
        let view_proj = camera.view_projection();
        let eye = camera.eye();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            view_proj_inv: view_proj.inverse().to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, camera.zfar],
        }
    }
}

/// Surface parameters shared by every primitive.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SurfaceGpu {
    /// Linear base color in `xyz`, metalness in `w`
    pub albedo_metalness: [f32; 4],
    /// Roughness, environment intensity, cast shadow, receive shadow
    pub params: [f32; 4],
}

impl SurfaceGpu {
    fn new(material: &StandardMaterial, object: &SceneObject) -> Self {
        let [r, g, b] = material.color.to_array();
        Self {
            albedo_metalness: [r, g, b, material.metalness],
            params: [
                material.roughness,
                material.env_map_intensity,
                flag(object.cast_shadow),
                flag(object.receive_shadow),
            ],
        }
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// GPU representation of a sphere primitive
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereGpu {
    pub center: [f32; 3],
    /// World space radius with the object scale applied
    pub radius: f32,
    pub surface: SurfaceGpu,
}

/// GPU representation of a box primitive
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BoxGpu {
    /// Inverse of the rigid object transform
    pub world_to_local: [[f32; 4]; 4],
    /// Half extents of the box with the object scale applied
    pub half_extents: [f32; 3],
    pub _pad: f32,
    pub surface: SurfaceGpu,
}

/// GPU representation of a finite plane primitive
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PlaneGpu {
    /// Inverse of the rigid object transform; the plane spans local XY
    pub world_to_local: [[f32; 4]; 4],
    pub half_size: [f32; 2],
    pub _pad: [f32; 2],
    pub surface: SurfaceGpu,
}

/// Ambient term, one shadow casting sun and its soft shadow range.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightsUniform {
    /// Ambient color premultiplied by intensity
    pub ambient: [f32; 4],
    /// Direction towards the sun in `xyz`, `w` is 1 when it casts shadows
    pub sun_direction: [f32; 4],
    /// Sun color premultiplied by intensity
    pub sun_color: [f32; 4],
    /// Shadow march distance, frustum extent, penumbra sharpness
    pub shadow: [f32; 4],
}

impl Default for LightsUniform {
    fn default() -> Self {
        Self {
            ambient: [0.0; 4],
            sun_direction: [0.0, 1.0, 0.0, 0.0],
            sun_color: [0.0; 4],
            shadow: [0.0; 4],
        }
    }
}

impl LightsUniform {
    /// Ambient lights add up; the first directional light becomes the sun.
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self::default();
        let mut has_sun = false;
        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    let [r, g, b] = color.to_array();
                    uniform.ambient[0] += r * intensity;
                    uniform.ambient[1] += g * intensity;
                    uniform.ambient[2] += b * intensity;
                }
                Light::Directional {
                    color,
                    intensity,
                    position,
                    shadow,
                } if !has_sun => {
                    has_sun = true;
                    let dir = position.normalize_or_zero();
                    let [r, g, b] = color.to_array();
                    uniform.sun_color = [r * intensity, g * intensity, b * intensity, 0.0];
                    uniform.sun_direction = [dir.x, dir.y, dir.z, flag(shadow.is_some())];
                    if let Some(shadow) = shadow {
                        uniform.shadow = [
                            shadow.far,
                            shadow.extent,
                            shadow.map_size as f32 / 64.0,
                            0.0,
                        ];
                    }
                }
                Light::Directional { .. } => {
                    tracing::debug!("only the first directional light is rendered");
                }
            }
        }
        uniform
    }
}

/// Keeps track of how many primitives are currently stored in the scene buffers
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct SceneCounts {
    pub spheres: u32,
    pub boxes: u32,
    pub planes: u32,
    /// 1 when an environment map is bound
    pub environment: u32,
}

/// A scene flattened into per-primitive instance arrays.
#[derive(Clone, Debug, Default)]
pub struct GpuScene {
    pub spheres: Vec<SphereGpu>,
    pub boxes: Vec<BoxGpu>,
    pub planes: Vec<PlaneGpu>,
    pub lights: LightsUniform,
}

impl GpuScene {
    pub fn from_scene(scene: &Scene) -> Self {
        let mut gpu = Self {
            lights: LightsUniform::from_lights(scene.lights()),
            ..Self::default()
        };

        for (id, object) in scene.objects() {
            let (Some(geometry), Some(material)) =
                (scene.geometry(object.geometry), scene.material(object.material))
            else {
                tracing::warn!(?id, "object references a missing geometry or material");
                continue;
            };
            let surface = SurfaceGpu::new(material, object);
            let transform = &object.transform;

            match *geometry {
                Geometry::Sphere { radius, .. } => gpu.spheres.push(SphereGpu {
                    center: transform.position.into(),
                    radius: radius * transform.scale.abs().max_element(),
                    surface,
                }),
                Geometry::Box {
                    width,
                    height,
                    depth,
                } => gpu.boxes.push(BoxGpu {
                    world_to_local: world_to_local(transform.rigid_matrix()),
                    half_extents: (Vec3::new(width, height, depth) * transform.scale.abs() * 0.5)
                        .into(),
                    _pad: 0.0,
                    surface,
                }),
                Geometry::Plane { width, height } => gpu.planes.push(PlaneGpu {
                    world_to_local: world_to_local(transform.rigid_matrix()),
                    half_size: [
                        width * transform.scale.x.abs() * 0.5,
                        height * transform.scale.y.abs() * 0.5,
                    ],
                    _pad: [0.0; 2],
                    surface,
                }),
            }
        }
        gpu
    }

    pub fn counts(&self, has_environment: bool) -> SceneCounts {
        SceneCounts {
            spheres: self.spheres.len() as u32,
            boxes: self.boxes.len() as u32,
            planes: self.planes.len() as u32,
            environment: u32::from(has_environment),
        }
    }
}

fn world_to_local(rigid: Mat4) -> [[f32; 4]; 4] {
    rigid.inverse().to_cols_array_2d()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Color, ShadowSettings, Transform};
    use approx::assert_relative_eq;
    use glam::Quat;

    #[test]
    fn struct_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
        assert_eq!(std::mem::size_of::<SurfaceGpu>(), 32);
        assert_eq!(std::mem::size_of::<SphereGpu>(), 48);
        assert_eq!(std::mem::size_of::<BoxGpu>(), 112);
        assert_eq!(std::mem::size_of::<PlaneGpu>(), 112);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 64);
        assert_eq!(std::mem::size_of::<SceneCounts>(), 16);
    }

    #[test]
    fn scaled_box_half_extents() {
        let mut scene = Scene::new();
        let cube = scene.add_geometry(Geometry::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        });
        let material = scene.add_material(StandardMaterial::default());
        scene.add(
            SceneObject::new(cube, material).with_transform(
                Transform::from_position(Vec3::new(0.0, 2.0, 0.0))
                    .with_scale(Vec3::new(0.2, 0.4, 0.6)),
            ),
        );

        let gpu = GpuScene::from_scene(&scene);
        assert_eq!(gpu.boxes.len(), 1);
        let half = gpu.boxes[0].half_extents;
        assert_relative_eq!(half[0], 0.1);
        assert_relative_eq!(half[1], 0.2);
        assert_relative_eq!(half[2], 0.3);

        // world_to_local brings the box center back to the origin
        let to_local = Mat4::from_cols_array_2d(&gpu.boxes[0].world_to_local);
        let local = to_local.transform_point3(Vec3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(local.length(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn lights_collapse_into_one_uniform() {
        let lights = [
            Light::Ambient {
                color: Color::WHITE,
                intensity: 0.5,
            },
            Light::Directional {
                color: Color::WHITE,
                intensity: 0.9,
                position: Vec3::new(5.0, 5.0, 5.0),
                shadow: Some(ShadowSettings::default()),
            },
        ];
        let uniform = LightsUniform::from_lights(&lights);

        assert_relative_eq!(uniform.ambient[0], 0.5);
        assert_relative_eq!(uniform.sun_color[1], 0.9);
        let dir = Vec3::from_slice(&uniform.sun_direction[..3]);
        assert_relative_eq!(dir.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(uniform.sun_direction[3], 1.0);
        assert_relative_eq!(uniform.shadow[0], 15.0);
        assert_relative_eq!(uniform.shadow[1], 7.0);
    }

    #[test]
    fn camera_uniform_inverts_view_projection() {
        let camera = OrbitCamera::looking_at(Vec3::new(-3.0, 3.0, 3.0), Vec3::ZERO, 75.0, 1.5);
        let uniform = CameraUniform::from_camera(&camera);
        let product = Mat4::from_cols_array_2d(&uniform.view_proj)
            * Mat4::from_cols_array_2d(&uniform.view_proj_inv);
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-4));
        assert_relative_eq!(uniform.eye[3], 100.0);
    }

    #[test]
    fn rotated_plane_keeps_its_size() {
        let mut scene = Scene::new();
        let plane = scene.add_geometry(Geometry::Plane {
            width: 10.0,
            height: 10.0,
        });
        let material = scene.add_material(StandardMaterial::default());
        scene.add(
            SceneObject::new(plane, material)
                .with_transform(
                    Transform::default().with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
                )
                .receiving_shadow(true),
        );

        let gpu = GpuScene::from_scene(&scene);
        assert_eq!(gpu.planes[0].half_size, [5.0, 5.0]);
        assert_relative_eq!(gpu.planes[0].surface.params[3], 1.0);
        assert_eq!(gpu.counts(false), SceneCounts { spheres: 0, boxes: 0, planes: 1, environment: 0 });
    }
}
