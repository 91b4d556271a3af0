//! The windowed renderer: a wgpu surface showing the ray marched scene with
//! the egui overlay on top.

use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::camera::OrbitCamera;
use crate::environment::{CubeFaces, EnvironmentTexture};
use crate::gpu_types::{
    BoxGpu, CameraUniform, GpuScene, LightsUniform, PlaneGpu, SceneCounts, SphereGpu,
};
use crate::overlay::Overlay;
use crate::pipeline::{self, StorageBuffer};
use crate::scene::Scene;

/// Render resolution never exceeds two device pixels per logical pixel.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Clamp the window's scale factor to [`MAX_PIXEL_RATIO`].
pub fn pixel_ratio(scale_factor: f64) -> f64 {
    scale_factor.min(MAX_PIXEL_RATIO)
}

/// Size of the render target for a window of `physical` pixels at
/// `scale_factor`, with the pixel ratio clamped.
pub fn render_size(physical: PhysicalSize<u32>, scale_factor: f64) -> PhysicalSize<u32> {
    if scale_factor <= MAX_PIXEL_RATIO {
        return physical;
    }
    let shrink = pixel_ratio(scale_factor) / scale_factor;
    PhysicalSize::new(
        ((f64::from(physical.width) * shrink).round() as u32).max(1),
        ((f64::from(physical.height) * shrink).round() as u32).max(1),
    )
}

const INITIAL_CAPACITY: usize = 16;

/// Buffers in binding order 0..=5, then the environment texture and sampler.
fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffers: [&wgpu::Buffer; 6],
    environment: &EnvironmentTexture,
) -> wgpu::BindGroup {
    let mut entries: Vec<wgpu::BindGroupEntry> = buffers
        .iter()
        .zip(0u32..)
        .map(|(buffer, binding)| wgpu::BindGroupEntry {
            binding,
            resource: buffer.as_entire_binding(),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: 6,
        resource: wgpu::BindingResource::TextureView(&environment.view),
    });
    entries.push(wgpu::BindGroupEntry {
        binding: 7,
        resource: wgpu::BindingResource::Sampler(&environment.sampler),
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("SDF Bind Group"),
        layout,
        entries: &entries,
    })
}

pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    scale_factor: f64,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    counts_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    spheres: StorageBuffer<SphereGpu>,
    boxes: StorageBuffer<BoxGpu>,
    planes: StorageBuffer<PlaneGpu>,
    environment: EnvironmentTexture,
    overlay: Overlay,
}

impl Renderer {
    /// Set up the GPU for `window`. The scene's environment map is loaded
    /// once here.
    pub async fn new(window: Arc<Window>, scene: &Scene) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to get adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Renderer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to request device")?;

        let scale_factor = window.scale_factor();
        let size = render_size(window.inner_size(), scale_factor);
        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        tracing::info!(
            adapter = %adapter.get_info().name,
            ?format,
            width = config.width,
            height = config.height,
            "renderer ready"
        );

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&CameraUniform {
                view_proj: [[0.0; 4]; 4],
                view_proj_inv: [[0.0; 4]; 4],
                eye: [0.0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let counts_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Counts Buffer"),
            contents: bytemuck::bytes_of(&SceneCounts {
                spheres: 0,
                boxes: 0,
                planes: 0,
                environment: 0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::bytes_of(&LightsUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let spheres = StorageBuffer::new(&device, "spheres", INITIAL_CAPACITY);
        let boxes = StorageBuffer::new(&device, "boxes", INITIAL_CAPACITY);
        let planes = StorageBuffer::new(&device, "planes", INITIAL_CAPACITY);

        let faces = CubeFaces::load_or_sky(scene.environment());
        let environment = EnvironmentTexture::upload(&device, &queue, &faces);

        let bind_group_layout = pipeline::create_bind_group_layout(&device);
        let pipeline = pipeline::create_render_pipeline(
            &device,
            &bind_group_layout,
            format,
            pipeline::SCENE_SHADER,
        );
        let overlay = Overlay::new(&window, &device, format);

        let bind_group = create_bind_group(
            &device,
            &bind_group_layout,
            [
                &camera_buffer,
                &counts_buffer,
                &lights_buffer,
                spheres.buffer(),
                boxes.buffer(),
                planes.buffer(),
            ],
            &environment,
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            scale_factor,
            bind_group,
            bind_group_layout,
            pipeline,
            camera_buffer,
            counts_buffer,
            lights_buffer,
            spheres,
            boxes,
            planes,
            environment,
            overlay,
        })
    }

    fn rebuild_bind_group(&mut self) {
        self.bind_group = create_bind_group(
            &self.device,
            &self.bind_group_layout,
            [
                &self.camera_buffer,
                &self.counts_buffer,
                &self.lights_buffer,
                self.spheres.buffer(),
                self.boxes.buffer(),
                self.planes.buffer(),
            ],
            &self.environment,
        );
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Reconfigure the surface after the window changed size or moved to a
    /// display with another scale factor.
    pub fn resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) {
        if physical.width == 0 || physical.height == 0 {
            return;
        }
        self.scale_factor = scale_factor;
        let size = render_size(physical, scale_factor);
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        tracing::debug!(width = size.width, height = size.height, "surface resized");
    }

    /// Forward a window event to the overlay. Returns `true` when egui
    /// consumed it.
    pub fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        self.overlay.on_window_event(&self.window, event)
    }

    /// Rebuild the scene pipeline from new WGSL source. The old pipeline
    /// stays in place when the new source fails validation.
    pub fn reload_shader(&mut self, source: &str) -> Result<()> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = pipeline::create_render_pipeline(
            &self.device,
            &self.bind_group_layout,
            self.config.format,
            source,
        );
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            anyhow::bail!("shader rejected: {err}");
        }
        self.pipeline = pipeline;
        tracing::info!("shader reloaded");
        Ok(())
    }

    /// Upload `scene`, draw it through `camera`, draw the overlay built by
    /// `ui` and present.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &OrbitCamera,
        ui: impl FnMut(&egui::Context),
    ) -> Result<(), wgpu::SurfaceError> {
        let gpu = GpuScene::from_scene(scene);
        let mut grown = self.spheres.write(&self.device, &self.queue, &gpu.spheres);
        grown |= self.boxes.write(&self.device, &self.queue, &gpu.boxes);
        grown |= self.planes.write(&self.device, &self.queue, &gpu.planes);
        if grown {
            self.rebuild_bind_group();
        }
        let counts = gpu.counts(scene.environment().is_some());
        self.queue
            .write_buffer(&self.counts_buffer, 0, bytemuck::bytes_of(&counts));
        self.queue
            .write_buffer(&self.lights_buffer, 0, bytemuck::bytes_of(&gpu.lights));
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(camera)),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("enc") });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.draw(0..3, 0..1);
        }

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: pixel_ratio(self.scale_factor) as f32,
        };
        let mut commands = self.overlay.paint(
            &self.window,
            &self.device,
            &self.queue,
            &mut encoder,
            &view,
            &screen,
            ui,
        );
        commands.push(encoder.finish());
        self.queue.submit(commands);
        output.present();
        Ok(())
    }
}
