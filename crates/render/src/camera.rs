//! Orbit camera and its mouse controller
//!
//! The camera lives on a sphere around a target point. [`OrbitControls`]
//! turns mouse drags and wheel input into pending spherical deltas and, when
//! damping is enabled, applies a fixed share of what is pending on each
//! [`OrbitControls::update`], so the view keeps gliding after the mouse stops.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Keeps the camera from flipping over the poles.
const POLE_EPSILON: f32 = 1e-6;

/// Perspective camera orbiting `target`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    /// Point the camera looks at
    pub target: Vec3,
    /// Distance from the target
    pub radius: f32,
    /// Azimuth around +Y, measured from +Z towards +X
    pub theta: f32,
    /// Polar angle from +Y
    pub phi: f32,
    /// Field of view in radians
    pub fovy: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    /// Place the camera at `eye`, looking at `target`.
    pub fn looking_at(eye: Vec3, target: Vec3, fovy_degrees: f32, aspect: f32) -> Self {
        let offset = eye - target;
        let radius = offset.length();
        let (theta, phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };
        Self {
            target,
            radius,
            theta,
            phi,
            fovy: fovy_degrees.to_radians(),
            aspect,
            znear: 0.1,
            zfar: 100.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Camera position in world space.
    pub fn eye(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_phi * self.theta.sin(),
                    self.phi.cos(),
                    sin_phi * self.theta.cos(),
                )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Computes a view projection matrix from the camera parameters
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Mouse driven orbiting and zooming with optional damping.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enable_damping: bool,
    /// Share of the pending motion applied per update when damping
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
    viewport_height: f32,
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
            viewport_height: 1.0,
            dragging: false,
            last_cursor: None,
        }
    }
}

impl OrbitControls {
    pub fn new(viewport_height: u32) -> Self {
        let mut controls = Self::default();
        controls.set_viewport_height(viewport_height);
        controls
    }

    pub fn with_damping(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor;
        self
    }

    /// Drag distances are measured relative to the viewport height.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Feed a window event. Returns `true` when the controls used it.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let Some(last) = self.last_cursor {
                        self.drag((position.x - last.x) as f32, (position.y - last.y) as f32);
                    }
                }
                self.last_cursor = Some(*position);
                self.dragging
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.zoom(steps);
                true
            }
            _ => false,
        }
    }

    /// Queue a rotation for a cursor movement of `(dx, dy)` pixels.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        let full_turn = 2.0 * PI * self.rotate_speed / self.viewport_height;
        self.pending_theta -= dx * full_turn;
        self.pending_phi -= dy * full_turn;
    }

    /// Positive steps move the camera towards the target.
    pub fn zoom(&mut self, steps: f32) {
        self.pending_scale *= 0.95_f32.powf(self.zoom_speed * steps);
    }

    /// Apply pending motion to `camera`. Call once per frame.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        let share = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        camera.theta += self.pending_theta * share;
        camera.phi = (camera.phi + self.pending_phi * share).clamp(POLE_EPSILON, PI - POLE_EPSILON);
        camera.radius = (camera.radius * self.pending_scale).clamp(self.min_distance, self.max_distance);
        self.pending_scale = 1.0;

        if self.enable_damping {
            self.pending_theta *= 1.0 - self.damping_factor;
            self.pending_phi *= 1.0 - self.damping_factor;
        } else {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
        }
    }
}
