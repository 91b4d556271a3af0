//! Per-body `collide` events.
//!
//! Bodies opt in with [`crate::PhysicsWorld::subscribe_collide`]. After each
//! internal step the world walks the active contact pairs and emits one
//! [`CollideEvent`] per subscribed participant for every pair that was not
//! already touching in the previous step. A ball resting on the floor
//! reports its landing once, and a bouncing ball reports each bounce once.
//! The impact velocity is
//! measured with the velocities the bodies had *before* the step resolved
//! the contact, so a body that hits the floor at 4 m/s reports roughly 4
//! even though it leaves the step bouncing upwards.

use std::collections::{HashMap, HashSet};

use rapier3d::prelude as rapier;

use crate::types::BodyHandle;

/// A contact involving a subscribed body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollideEvent {
    /// The subscribed body receiving the event.
    pub body: BodyHandle,
    /// The other body in the contact, if it has one.
    pub other: Option<BodyHandle>,
    /// Relative speed along the contact normal, positive when approaching.
    pub impact_velocity: f32,
}

/// Linear and angular velocity of a body captured before a step.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Kinematics {
    linvel: rapier::Vector<f32>,
    angvel: rapier::Vector<f32>,
    center_of_mass: rapier::Point<f32>,
}

impl Kinematics {
    pub(crate) fn capture(body: &rapier::RigidBody) -> Self {
        Self {
            linvel: *body.linvel(),
            angvel: *body.angvel(),
            center_of_mass: *body.center_of_mass(),
        }
    }

    fn velocity_at(&self, point: &rapier::Point<f32>) -> rapier::Vector<f32> {
        self.linvel + self.angvel.cross(&(point - self.center_of_mass))
    }
}

/// Velocities of every dynamic body, keyed by handle.
pub(crate) type VelocitySnapshot = HashMap<rapier::RigidBodyHandle, Kinematics>;

pub(crate) fn snapshot(bodies: &rapier::RigidBodySet) -> VelocitySnapshot {
    bodies
        .iter()
        .filter(|(_, body)| body.is_dynamic())
        .map(|(handle, body)| (handle, Kinematics::capture(body)))
        .collect()
}

/// Bodies in contact after a step, as `(body, other)`. Every contact is
/// stored once from each side that has a body.
pub(crate) type Touching = HashSet<(BodyHandle, Option<BodyHandle>)>;

/// Walk the narrow phase and return every body pair in contact. Events are
/// appended only for subscribed bodies whose pair was not in `previous`, so
/// a contact reports once when it starts and again only after the bodies
/// have separated.
pub(crate) fn collect(
    narrow_phase: &rapier::NarrowPhase,
    colliders: &rapier::ColliderSet,
    before: &VelocitySnapshot,
    subscribed: &HashSet<BodyHandle>,
    previous: &Touching,
    out: &mut Vec<CollideEvent>,
) -> Touching {
    let mut touching = Touching::new();
    for pair in narrow_phase.contact_pairs() {
        if !pair.has_any_active_contact {
            continue;
        }
        let body1 = colliders
            .get(pair.collider1)
            .and_then(rapier::Collider::parent)
            .map(BodyHandle);
        let body2 = colliders
            .get(pair.collider2)
            .and_then(rapier::Collider::parent)
            .map(BodyHandle);

        // Strongest approach over the pair's manifolds.
        let impact = pair
            .manifolds
            .iter()
            .filter_map(|manifold| {
                let contact = manifold.data.solver_contacts.first()?;
                Some(impact_velocity(
                    body1.and_then(|b| before.get(&b.0)),
                    body2.and_then(|b| before.get(&b.0)),
                    &contact.point,
                    &manifold.data.normal,
                ))
            })
            .reduce(f32::max);
        let Some(impact_velocity) = impact else {
            continue;
        };

        for (body, other) in [(body1, body2), (body2, body1)] {
            let Some(body) = body else {
                continue;
            };
            let started = touching.insert((body, other)) && !previous.contains(&(body, other));
            if started && subscribed.contains(&body) {
                out.push(CollideEvent {
                    body,
                    other,
                    impact_velocity,
                });
            }
        }
    }
    touching
}

/// `(v1 - v2) · n` at the contact point, where `n` points from body 1 to body 2.
/// Static bodies and bodies missing from the snapshot count as resting.
fn impact_velocity(
    first: Option<&Kinematics>,
    second: Option<&Kinematics>,
    point: &rapier::Point<f32>,
    normal: &rapier::Vector<f32>,
) -> f32 {
    let v1 = first.map_or_else(rapier::Vector::zeros, |k| k.velocity_at(point));
    let v2 = second.map_or_else(rapier::Vector::zeros, |k| k.velocity_at(point));
    (v1 - v2).dot(normal)
}
