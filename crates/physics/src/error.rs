use thiserror::Error;

use crate::types::BodyHandle;

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("rigid body {0:?} is not in the world")]
    BodyNotFound(BodyHandle),
    #[error("no physics material named '{0}'")]
    UnknownMaterial(String),
    #[error("a material named '{0}' already exists")]
    DuplicateMaterial(String),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
