//! Environment cube map
//!
//! Six PNG faces are decoded with `image` into RGBA8 pixels and uploaded as
//! a cube texture sampled by the shader for reflections and the background.
//! When the faces are missing or inconsistent a small sky gradient is
//! generated instead so the scene still renders.

use anyhow::{bail, Context, Result};
use glam::Vec3;

use crate::scene::EnvironmentMap;

/// Edge length of the generated fallback sky.
const FALLBACK_SIZE: u32 = 32;

/// Decoded cube faces in `+x, -x, +y, -y, +z, -z` order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CubeFaces {
    pub size: u32,
    pub faces: [Vec<u8>; 6],
}

impl CubeFaces {
    /// Decode all six faces. Every face must be square and the same size.
    pub fn load(map: &EnvironmentMap) -> Result<Self> {
        let mut size = None;
        let mut faces: [Vec<u8>; 6] = Default::default();
        for (slot, path) in faces.iter_mut().zip(&map.faces) {
            let image = image::open(path)
                .with_context(|| format!("failed to load environment face {}", path.display()))?
                .to_rgba8();
            let (width, height) = image.dimensions();
            if width != height {
                bail!("environment face {} is {width}x{height}, expected a square", path.display());
            }
            match size {
                None => size = Some(width),
                Some(expected) if expected != width => bail!(
                    "environment face {} is {width}px, other faces are {expected}px",
                    path.display()
                ),
                Some(_) => {}
            }
            *slot = image.into_raw();
        }
        Ok(Self {
            size: size.unwrap_or(0),
            faces,
        })
    }

    /// Load `map`, or generate a sky gradient when there is no map or it
    /// cannot be loaded.
    pub fn load_or_sky(map: Option<&EnvironmentMap>) -> Self {
        match map.map(Self::load) {
            Some(Ok(faces)) => {
                tracing::info!(size = faces.size, "loaded environment map");
                faces
            }
            Some(Err(err)) => {
                tracing::warn!("{err:#}; using a generated sky");
                Self::sky_gradient(FALLBACK_SIZE)
            }
            None => Self::sky_gradient(FALLBACK_SIZE),
        }
    }

    /// A soft blue-to-grey gradient along world Y.
    pub fn sky_gradient(size: u32) -> Self {
        let size = size.max(1);
        let faces = std::array::from_fn(|face| {
            let mut pixels = Vec::with_capacity((size * size * 4) as usize);
            for y in 0..size {
                for x in 0..size {
                    let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                    let v = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                    let dir = face_direction(face, u, v);
                    let color = sky_color(dir.y);
                    pixels.extend_from_slice(&[
                        to_byte(color.x),
                        to_byte(color.y),
                        to_byte(color.z),
                        255,
                    ]);
                }
            }
            pixels
        });
        Self { size, faces }
    }
}

/// Direction through texel `(u, v)` of a cube face, following the
/// texture-space convention of cube maps (v grows downwards).
fn face_direction(face: usize, u: f32, v: f32) -> Vec3 {
    let dir = match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    };
    dir.normalize()
}

fn sky_color(height: f32) -> Vec3 {
    let horizon = Vec3::new(0.85, 0.85, 0.9);
    let zenith = Vec3::new(0.35, 0.55, 0.85);
    let ground = Vec3::new(0.3, 0.3, 0.32);
    if height >= 0.0 {
        horizon.lerp(zenith, height.powf(0.6))
    } else {
        horizon.lerp(ground, (-height).powf(0.4))
    }
}

fn to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Cube texture plus the view and sampler bound by the scene pipeline.
pub struct EnvironmentTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl EnvironmentTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, faces: &CubeFaces) -> Self {
        let size = wgpu::Extent3d {
            width: faces.size,
            height: faces.size,
            depth_or_array_layers: 6,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Environment Cube"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, pixels) in faces.faces.iter().enumerate() {
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * faces.size),
                    rows_per_image: Some(faces.size),
                },
                wgpu::Extent3d {
                    width: faces.size,
                    height: faces.size,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Environment Cube View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Environment Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}
