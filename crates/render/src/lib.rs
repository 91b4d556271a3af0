//! Scene graph, orbit camera and the wgpu renderer of the tumble playground.
//!
//! [`Scene`] and [`OrbitCamera`] are plain data and can be used without a
//! GPU. [`Renderer`] ray marches the scene onto a window surface and draws
//! an egui overlay on top.

pub mod camera;
pub mod environment;
pub mod gpu_types;
pub mod overlay;
pub mod pipeline;
pub mod renderer;
pub mod scene;

pub use camera::{OrbitCamera, OrbitControls};
pub use gpu_types::GpuScene;
pub use renderer::Renderer;
pub use scene::{
    Color, EnvironmentMap, Geometry, GeometryId, Light, MaterialId, ObjectId, Scene, SceneObject,
    ShadowSettings, StandardMaterial, Transform,
};

pub use egui;
pub use wgpu;
pub use winit;
