//! # ECS Error Types
//!
//! Every misuse of the ECS API is reported through [`EcsError`]. None of
//! these are transient: retrying the same call with the same arguments fails
//! the same way.

use thiserror::Error;

use crate::ecs::{Entity, SystemId};

/// Errors that can occur in the ECS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Every entity id in the pool is in use.
    #[error("entity capacity exceeded: all {capacity} ids are in use")]
    CapacityExceeded {
        /// The fixed capacity of the pool.
        capacity: usize,
    },

    /// The entity is out of range or not currently alive.
    #[error("invalid entity: {0}")]
    InvalidEntity(Entity),

    /// The component or system type was never registered.
    #[error("type not registered: {0}")]
    UnregisteredType(&'static str),

    /// The component or system type was registered twice.
    #[error("type already registered: {0}")]
    DuplicateRegistration(&'static str),

    /// The entity already owns a component of this type.
    #[error("{entity} already has a `{component}` component")]
    DuplicateComponent {
        /// The entity the component was added to.
        entity: Entity,
        /// Name of the component type.
        component: &'static str,
    },

    /// The entity does not own a component of this type.
    #[error("{entity} has no `{component}` component")]
    ComponentNotPresent {
        /// The entity that was queried.
        entity: Entity,
        /// Name of the component type.
        component: &'static str,
    },

    /// No more component type ids fit into a signature.
    #[error("component type limit reached: at most {limit} types")]
    ComponentLimitReached {
        /// Maximum number of component types.
        limit: usize,
    },

    /// The system handle does not belong to this world.
    #[error("unknown system handle: {0}")]
    UnknownSystem(SystemId),

    /// Requested world capacity is zero or above the build-time maximum.
    #[error("invalid capacity {requested}: must be between 1 and {max}")]
    InvalidCapacity {
        /// The capacity that was asked for.
        requested: usize,
        /// The largest capacity allowed.
        max: usize,
    },
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
