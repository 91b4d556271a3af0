use physics::BodyHandle;
use render::ObjectId;

use crate::spawn::ShapeKind;

/// A visual object and the body that drives it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectPair {
    pub visual: ObjectId,
    pub body: BodyHandle,
    pub kind: ShapeKind,
}

/// Spawned pairs in spawn order.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    pairs: Vec<ObjectPair>,
}

impl ObjectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pair: ObjectPair) {
        self.pairs.push(pair);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectPair> {
        self.pairs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn count(&self, kind: ShapeKind) -> usize {
        self.pairs.iter().filter(|pair| pair.kind == kind).count()
    }

    /// Remove every pair, handing them out in spawn order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, ObjectPair> {
        self.pairs.drain(..)
    }
}

impl<'a> IntoIterator for &'a ObjectRegistry {
    type Item = &'a ObjectPair;
    type IntoIter = std::slice::Iter<'a, ObjectPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
