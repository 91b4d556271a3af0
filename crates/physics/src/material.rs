//! Named physics materials and the pairwise contact rules between them.
//!
//! A body references at most one [`MaterialId`]. When two colliders touch,
//! the solver looks up the [`ContactMaterial`] registered for their pair of
//! materials; pairs without a rule (or with a material-less body) use the
//! world's default contact material.

use std::collections::HashMap;

use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Index of a named material inside a [`MaterialTable`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(u32);

impl MaterialId {
    /// Encoding stored in collider user data. Zero means "no material".
    pub(crate) fn to_user_data(self) -> u128 {
        u128::from(self.0) + 1
    }

    pub(crate) fn from_user_data(data: u128) -> Option<Self> {
        match data {
            0 => None,
            n => u32::try_from(n - 1).ok().map(MaterialId),
        }
    }
}

/// Friction and restitution applied when two materials touch.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactProperties {
    pub friction: f32,
    pub restitution: f32,
}

impl ContactProperties {
    #[must_use]
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }
}

impl Default for ContactProperties {
    /// Used until a default contact material is configured.
    fn default() -> Self {
        Self::new(0.3, 0.0)
    }
}

/// A contact rule between two materials. The rule is symmetric.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactMaterial {
    pub a: MaterialId,
    pub b: MaterialId,
    pub properties: ContactProperties,
}

impl ContactMaterial {
    #[must_use]
    pub const fn new(a: MaterialId, b: MaterialId, friction: f32, restitution: f32) -> Self {
        Self {
            a,
            b,
            properties: ContactProperties::new(friction, restitution),
        }
    }
}

/// Material names plus the pairwise rules between them.
#[derive(Debug, Default)]
pub struct MaterialTable {
    names: Vec<String>,
    rules: HashMap<(MaterialId, MaterialId), ContactProperties>,
    default_contact: ContactProperties,
}

impl MaterialTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new named material.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::DuplicateMaterial`] if the name is taken.
    pub fn add(&mut self, name: &str) -> Result<MaterialId> {
        if self.lookup(name).is_some() {
            return Err(PhysicsError::DuplicateMaterial(name.to_owned()));
        }
        let id = MaterialId(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        self.names.push(name.to_owned());
        Ok(id)
    }

    /// Find a material by name.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownMaterial`] when nothing matches.
    pub fn get(&self, name: &str) -> Result<MaterialId> {
        self.lookup(name)
            .ok_or_else(|| PhysicsError::UnknownMaterial(name.to_owned()))
    }

    #[must_use]
    pub fn name(&self, id: MaterialId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn add_contact_material(&mut self, rule: ContactMaterial) {
        self.rules.insert(Self::key(rule.a, rule.b), rule.properties);
    }

    pub fn set_default_contact(&mut self, properties: ContactProperties) {
        self.default_contact = properties;
    }

    #[must_use]
    pub fn default_contact(&self) -> ContactProperties {
        self.default_contact
    }

    /// Contact properties for a pair of (optional) materials.
    #[must_use]
    pub fn resolve(&self, a: Option<MaterialId>, b: Option<MaterialId>) -> ContactProperties {
        match (a, b) {
            (Some(a), Some(b)) => self
                .rules
                .get(&Self::key(a, b))
                .copied()
                .unwrap_or(self.default_contact),
            _ => self.default_contact,
        }
    }

    fn lookup(&self, name: &str) -> Option<MaterialId> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(MaterialId)
    }

    fn key(a: MaterialId, b: MaterialId) -> (MaterialId, MaterialId) {
        if a.0 <= b.0 {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Solver hook that rewrites every contact with the pair's contact rule.
impl rapier::PhysicsHooks for MaterialTable {
    fn modify_solver_contacts(&self, context: &mut rapier::ContactModificationContext) {
        let material_of = |handle: rapier::ColliderHandle| {
            context
                .colliders
                .get(handle)
                .and_then(|c| MaterialId::from_user_data(c.user_data))
        };
        let props = self.resolve(material_of(context.collider1), material_of(context.collider2));
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = props.friction;
            contact.restitution = props.restitution;
        }
    }
}
