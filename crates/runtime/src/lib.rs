//! # Tumble Runtime
//!
//! The application core of the playground, independent of any window or
//! GPU. A [`Playground`] owns the [`physics::PhysicsWorld`], the
//! [`render::Scene`] and the [`ObjectRegistry`] pairing the two:
//!
//! -   **Spawning:** [`Playground::create_sphere`] and
//!     [`Playground::create_box`] add a visual and a body in one go.
//! -   **Frames:** [`Playground::frame`] steps physics at a fixed rate,
//!     plays the [`HitSound`] for hard impacts and copies every body pose
//!     onto its visual.
//! -   **Debug actions:** [`DebugAction`]s spawn random shapes or reset
//!     the scene; a [`DebugPanel`] lists them for the UI.

pub mod clock;
pub mod config;
pub mod debug;
pub mod playground;
pub mod registry;
pub mod sound;
pub mod spawn;

pub use clock::FrameClock;
pub use config::{AssetPaths, ConfigError, PlaygroundConfig, RandomRange, SpawnRanges};
pub use debug::{DebugAction, DebugEntry, DebugPanel};
pub use playground::{FrameReport, Playground, DEFAULT_MATERIAL};
pub use registry::{ObjectPair, ObjectRegistry};
pub use sound::{HitSound, RodioHitSound, SilentHitSound, SoundError};
pub use spawn::{ShapeKind, SpawnParams, SpawnShape};
