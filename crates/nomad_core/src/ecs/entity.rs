//! # Entity Management
//!
//! Entities are bare integer ids in `[0, capacity)`. The [`EntityRegistry`]
//! owns the pool of free ids, a liveness flag per id and the signature of
//! every entity.
//!
//! Freed ids go to the back of a FIFO queue, so a destroyed id only comes
//! back after every id queued before it has been handed out.

use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use super::signature::Signature;
use crate::error::{EcsError, EcsResult};

/// Build-time upper bound on the number of live entities in a world.
pub const MAX_ENTITIES: usize = 5000;

/// Opaque handle to an entity.
///
/// Two entities are equal iff their ids are equal. Ordering is by id and is
/// only used for set storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u32);

impl Entity {
    /// Creates an entity handle from a raw id.
    ///
    /// The handle is only meaningful to a world if that world issued the id
    /// and has not destroyed it since.
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the id as an array index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Pool of entity ids plus the signature of every live entity.
///
/// The registry never cascades: purging an entity from component stores and
/// system interest sets is the job of [`World`](super::World).
pub struct EntityRegistry {
    /// Ids available for reuse, oldest first.
    free: VecDeque<Entity>,
    /// Signature of every entity slot (empty when dead).
    signatures: Box<[Signature]>,
    /// Whether each entity slot is currently alive.
    alive: Box<[bool]>,
    /// Number of currently alive entities.
    living_count: usize,
}

impl EntityRegistry {
    /// Creates a registry with `capacity` ids, all free.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidCapacity`] if `capacity` is zero or larger than
    /// [`MAX_ENTITIES`].
    pub fn new(capacity: usize) -> EcsResult<Self> {
        if capacity == 0 || capacity > MAX_ENTITIES {
            return Err(EcsError::InvalidCapacity {
                requested: capacity,
                max: MAX_ENTITIES,
            });
        }
        Ok(Self::filled(capacity))
    }

    /// Builds the pool. `capacity` has already been validated.
    #[allow(clippy::cast_possible_truncation)]
    fn filled(capacity: usize) -> Self {
        // Ids leave the queue in ascending order on a fresh registry
        let free = (0..capacity as u32).map(Entity).collect();

        Self {
            free,
            signatures: vec![Signature::EMPTY; capacity].into_boxed_slice(),
            alive: vec![false; capacity].into_boxed_slice(),
            living_count: 0,
        }
    }

    /// Returns the fixed capacity of the pool.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.alive.len()
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn living_count(&self) -> usize {
        self.living_count
    }

    /// Takes the oldest free id and marks it alive with an empty signature.
    ///
    /// # Errors
    ///
    /// [`EcsError::CapacityExceeded`] if every id is in use.
    pub fn create(&mut self) -> EcsResult<Entity> {
        let Some(entity) = self.free.pop_front() else {
            return Err(EcsError::CapacityExceeded {
                capacity: self.capacity(),
            });
        };

        let idx = entity.index();
        self.signatures[idx] = Signature::EMPTY;
        self.alive[idx] = true;
        self.living_count += 1;

        trace!(entity = entity.id(), living = self.living_count, "entity created");
        Ok(entity)
    }

    /// Resets the entity's signature and returns its id to the back of the
    /// free queue.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] if the entity is out of range or not alive.
    pub fn destroy(&mut self, entity: Entity) -> EcsResult<()> {
        self.ensure_alive(entity)?;

        let idx = entity.index();
        self.signatures[idx].reset();
        self.alive[idx] = false;
        self.living_count -= 1;
        self.free.push_back(entity);

        trace!(entity = entity.id(), living = self.living_count, "entity destroyed");
        Ok(())
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Fails with [`EcsError::InvalidEntity`] unless the entity is alive.
    ///
    /// # Errors
    ///
    /// See above.
    #[inline]
    pub fn ensure_alive(&self, entity: Entity) -> EcsResult<()> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity(entity))
        }
    }

    /// Returns the entity's current signature.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] if the entity is out of range or not alive.
    #[inline]
    pub fn signature(&self, entity: Entity) -> EcsResult<Signature> {
        self.ensure_alive(entity)?;
        Ok(self.signatures[entity.index()])
    }

    /// Overwrites the entity's signature.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] if the entity is out of range or not alive.
    #[inline]
    pub fn set_signature(&mut self, entity: Entity, signature: Signature) -> EcsResult<()> {
        self.ensure_alive(entity)?;
        self.signatures[entity.index()] = signature;
        Ok(())
    }

    /// Iterates over all alive entities and their signatures, in id order.
    pub fn iter_alive(&self) -> impl Iterator<Item = (Entity, Signature)> + '_ {
        self.alive
            .iter()
            .zip(self.signatures.iter())
            .enumerate()
            .filter(|(_, (alive, _))| **alive)
            .map(|(idx, (_, signature))| (Self::entity_at(idx), *signature))
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    const fn entity_at(idx: usize) -> Entity {
        Entity(idx as u32)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::filled(MAX_ENTITIES)
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("capacity", &self.capacity())
            .field("living_count", &self.living_count)
            .field("free", &self.free.len())
            .finish()
    }
}
