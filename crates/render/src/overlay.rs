//! egui debug overlay drawn on top of the scene.

use std::sync::Arc;

use winit::event::WindowEvent;
use winit::window::Window;

pub struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Overlay {
    pub fn new(window: &Arc<Window>, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1);
        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Returns `true` when egui wants the event for itself, e.g. a click on
    /// a panel button that must not also orbit the camera.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Build the UI with `ui` and record its draw commands into `encoder`,
    /// loading on top of whatever `view` already holds.
    #[allow(clippy::too_many_arguments)]
    pub fn paint(
        &mut self,
        window: &Window,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        screen: &egui_wgpu::ScreenDescriptor,
        ui: impl FnMut(&egui::Context),
    ) -> Vec<wgpu::CommandBuffer> {
        let input = self.state.take_egui_input(window);
        let output = self.ctx.run(input, ui);
        self.state
            .handle_platform_output(window, output.platform_output);

        let jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        for (id, delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        let extra = self
            .renderer
            .update_buffers(device, queue, encoder, &jobs, screen);
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.render(&mut pass, &jobs, screen);
        }
        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
        extra
    }
}
