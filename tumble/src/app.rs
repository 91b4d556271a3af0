//! # Tumble Application
//!
//! Wires a [`Playground`] to a window. Each `RedrawRequested` runs one
//! playground tick, updates the orbit controls and renders; `AboutToWait`
//! asks winit for the next redraw, so the loop follows the display.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Vec3;
use render::egui;
use render::winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use render::winit::event_loop::{EventLoop, EventLoopWindowTarget};
use render::winit::keyboard::Key;
use render::winit::window::WindowBuilder;
use render::wgpu::SurfaceError;
use render::{EnvironmentMap, OrbitCamera, OrbitControls, Renderer};
use runtime::sound::{self, HitSound, SilentHitSound};
use runtime::{DebugAction, DebugPanel, Playground, PlaygroundConfig};
use tracing::{debug, error, info, warn};

use crate::watcher;
use crate::Args;

const HEADLESS_DT: f32 = 1.0 / 60.0;
const CAMERA_START: Vec3 = Vec3::new(-3.0, 3.0, 3.0);
const CAMERA_FOV: f32 = 75.0;
const DAMPING: f32 = 0.05;

type BoxedPlayground = Playground<Box<dyn HitSound>>;

/// Run the playground as described by `args`.
///
/// # Errors
///
/// Returns an error for an unreadable config, or when the window, GPU or
/// event loop cannot be set up.
pub fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => PlaygroundConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PlaygroundConfig::default(),
    };

    let sound: Box<dyn HitSound> = if args.mute || args.headless {
        Box::new(SilentHitSound)
    } else {
        sound::open_or_silent(&args.assets.join(&config.assets.hit_sound))
    };

    let mut playground = Playground::new(config, sound, args.seed)?;
    playground.populate();

    if args.headless {
        run_headless(&mut playground, args.frames);
        Ok(())
    } else {
        attach_environment(&mut playground, &args.assets);
        run_windowed(playground)
    }
}

fn run_headless(playground: &mut BoxedPlayground, frames: u32) {
    info!(frames, "running headless");
    let mut collisions = 0;
    let mut sounds = 0;
    for frame in 1..=frames {
        let report = playground.frame(HEADLESS_DT);
        collisions += report.collisions;
        sounds += report.sounds_played;
        if frame % 60 == 0 {
            info!(
                frame,
                seconds = playground.world().elapsed(),
                objects = playground.registry().len(),
                active = playground.world().active_body_count(),
                "simulated"
            );
        }
    }
    info!(collisions, sounds, "headless run finished");
}

fn attach_environment(playground: &mut BoxedPlayground, assets: &Path) {
    let dir = assets.join(&playground.config().assets.environment_map);
    if dir.is_dir() {
        playground
            .scene_mut()
            .set_environment(Some(EnvironmentMap::from_dir(dir)));
    } else {
        warn!("environment map '{}' not found; reflections disabled", dir.display());
    }
}

struct App {
    renderer: Renderer,
    playground: BoxedPlayground,
    camera: OrbitCamera,
    controls: OrbitControls,
    panel: DebugPanel,
    shader_changes: Option<Receiver<PathBuf>>,
}

fn run_windowed(playground: BoxedPlayground) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("tumble")
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let size = window.inner_size();
    let renderer = pollster::block_on(Renderer::new(window, playground.scene()))?;

    let (_watcher, shader_changes) = match watcher::start(Path::new(watcher::SHADER_DIRECTORY)) {
        Ok((handle, rx)) => (Some(handle), Some(rx)),
        Err(err) => {
            error!("shader hot reload disabled: {err:#}");
            (None, None)
        }
    };

    let mut app = App {
        renderer,
        playground,
        camera: OrbitCamera::looking_at(
            CAMERA_START,
            Vec3::ZERO,
            CAMERA_FOV,
            size.width.max(1) as f32 / size.height.max(1) as f32,
        ),
        controls: OrbitControls::new(size.height).with_damping(DAMPING),
        panel: DebugPanel::standard(),
        shader_changes,
    };

    info!("window open");
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == app.renderer.window().id() => {
            app.on_window_event(&event, elwt);
        }
        Event::AboutToWait => app.renderer.window().request_redraw(),
        _ => {}
    })?;
    Ok(())
}

impl App {
    fn on_window_event(&mut self, event: &WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                // egui keeps its own pixels-per-point and must see the change too.
                self.renderer.on_window_event(event);
                self.resize();
            }
            WindowEvent::RedrawRequested => self.redraw(elwt),
            _ => {
                if self.renderer.on_window_event(event) {
                    return;
                }
                if self.controls.handle_window_event(event) {
                    return;
                }
                if let WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key: Key::Character(text),
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                } = event
                {
                    let action = text.chars().next().and_then(DebugAction::from_shortcut);
                    if let Some(action) = action {
                        self.playground.run_action(action);
                    }
                }
            }
        }
    }

    fn resize(&mut self) {
        let window = self.renderer.window();
        let (size, scale) = (window.inner_size(), window.scale_factor());
        self.renderer.resize(size, scale);
        self.camera.resize(size.width, size.height);
        self.controls.set_viewport_height(size.height);
    }

    fn reload_shaders(&mut self) {
        let Some(rx) = &self.shader_changes else {
            return;
        };
        let changed: Vec<PathBuf> = rx.try_iter().collect();
        // Editors often write a file several times in a row.
        let Some(path) = changed.last() else {
            return;
        };
        match std::fs::read_to_string(path) {
            Ok(source) => {
                if let Err(err) = self.renderer.reload_shader(&source) {
                    error!("{}: {err:#}", path.display());
                }
            }
            Err(err) => warn!("cannot read {}: {err}", path.display()),
        }
    }

    fn redraw(&mut self, elwt: &EventLoopWindowTarget<()>) {
        self.reload_shaders();

        let report = self.playground.tick();
        debug!(
            substeps = report.step.substeps,
            sounds = report.sounds_played,
            "frame"
        );
        self.controls.update(&mut self.camera);

        let mut clicked = Vec::new();
        let panel = &self.panel;
        let objects = self.playground.registry().len();
        let result = self
            .renderer
            .render(self.playground.scene(), &self.camera, |ctx| {
                debug_window(ctx, panel, objects, &mut clicked);
            });

        match result {
            Ok(()) => {}
            Err(SurfaceError::Lost) => self.resize(),
            Err(SurfaceError::OutOfMemory) => {
                error!("surface out of memory");
                elwt.exit();
            }
            Err(err) => warn!("frame skipped: {err}"),
        }

        for action in clicked {
            self.playground.run_action(action);
        }
    }
}

fn debug_window(
    ctx: &egui::Context,
    panel: &DebugPanel,
    objects: usize,
    clicked: &mut Vec<DebugAction>,
) {
    egui::Window::new("Debug")
        .resizable(false)
        .default_pos([12.0, 12.0])
        .show(ctx, |ui| {
            for entry in panel.actions() {
                if ui.button(&entry.label).clicked() {
                    clicked.push(entry.action);
                }
            }
            ui.separator();
            ui.label(format!("objects: {objects}"));
        });
}
