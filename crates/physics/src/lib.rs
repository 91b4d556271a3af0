#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]
//! # Tumble Physics
//!
//! The rigid body world behind the tumble playground.
//!
//! This crate is a thin, typed layer over [`rapier3d`]. It does not
//! integrate anything itself; it owns the rapier sets and pipeline and
//! exposes the handful of operations the playground needs:
//!
//! -   **Bodies:** [`PhysicsWorld::add_body`] / [`PhysicsWorld::remove_body`]
//!     with sphere, box and infinite-plane [`Shape`]s. Zero mass means static.
//! -   **Materials:** named [`MaterialId`]s and symmetric
//!     [`ContactMaterial`] rules, applied per contact by a solver hook.
//! -   **Stepping:** [`PhysicsWorld::step`] runs fixed sub-steps out of an
//!     accumulator fed with the real frame delta.
//! -   **Collide events:** bodies subscribed with
//!     [`PhysicsWorld::subscribe_collide`] report every contact together with
//!     the impact velocity along the contact normal.
//!
//! ```rust,ignore
//! use physics::{BodyDesc, PhysicsWorld, Shape};
//!
//! let mut world = PhysicsWorld::default();
//! let ball = world.add_body(&BodyDesc::new(1.0, Shape::Sphere { radius: 0.5 }));
//! world.subscribe_collide(ball)?;
//! world.step(1.0 / 60.0, frame_dt, 3);
//! for event in world.drain_collide_events() {
//!     println!("{:?} hit at {}", event.body, event.impact_velocity);
//! }
//! ```

pub mod error;
pub mod events;
pub mod material;
pub mod types;
pub mod world;

pub use error::{PhysicsError, Result};
pub use events::CollideEvent;
pub use material::{ContactMaterial, ContactProperties, MaterialId, MaterialTable};
pub use types::{BodyDesc, BodyHandle, Pose, Shape};
pub use world::{PhysicsConfig, PhysicsWorld, StepReport};
