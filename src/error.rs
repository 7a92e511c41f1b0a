//! Error taxonomy of the simulation core
//!
//! Precondition violations are returned as errors and must stop the driver;
//! degraded paths (unknown entity kinds, missing strategies) are logged instead.

use thiserror::Error;

use crate::sim::element::{ElementId, EntityKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// `set_world` has not been called yet
    #[error("world is not initialized: call set_world() before update() or render_state()")]
    WorldNotInitialized,

    /// A spawn factory built an entity that does not carry the id it was given
    #[error("spawn factory returned element {got} but was allocated id {expected}")]
    FactoryIdMismatch { expected: ElementId, got: ElementId },

    /// The player is owned by the facade and can't be registered in the manager
    #[error("spawn factory returned a {kind} entity, which the manager does not own")]
    PlayerSpawnedInManager { kind: EntityKind },

    /// The configured player id falls in the range the manager allocates from
    #[error("player id {id} collides with managed ids (must be below {first_managed})")]
    PlayerIdInManagedRange { id: ElementId, first_managed: ElementId },

    /// An operation addressed an entity that isn't live
    #[error("no live entity with id {0}")]
    UnknownEntity(ElementId),

    /// The background collision worker hung up
    #[error("collision worker disconnected")]
    WorkerDisconnected,

    /// The collision worker thread could not be started
    #[error("collision worker unavailable: {0}")]
    WorkerUnavailable(String),
}

pub type SimResult<T> = Result<T, SimError>;
