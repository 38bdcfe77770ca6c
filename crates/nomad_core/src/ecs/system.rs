//! # System Interest Sets
//!
//! A system is identified by a Rust type and described by the signature it
//! requires. The [`SystemRegistry`] keeps, for every system, the set of
//! entities whose signature matches, and updates those sets incrementally
//! whenever a single entity's signature changes.

use std::any::{type_name, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::debug;

use super::entity::Entity;
use super::signature::Signature;
use crate::error::{EcsError, EcsResult};

/// Marker trait for types that identify a system.
///
/// The system's logic lives outside the ECS; registering the type only
/// creates its interest set.
pub trait System: 'static {}

/// Source of per-registry tags, so handles cannot cross worlds.
static NEXT_REGISTRY: AtomicU32 = AtomicU32::new(0);

/// Handle to a registered system's interest record.
///
/// Only valid for the registry (and thus the world) that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId {
    registry: u32,
    index: u32,
}

impl SystemId {
    /// Returns the handle's position within its registry.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}.{}", self.registry, self.index)
    }
}

/// Required signature plus current members of one system.
#[derive(Debug)]
struct InterestRecord {
    name: &'static str,
    required: Signature,
    entities: BTreeSet<Entity>,
}

impl InterestRecord {
    /// Inserts or erases `entity` depending on whether `signature` matches.
    #[inline]
    fn update(&mut self, entity: Entity, signature: Signature) {
        if signature.matches(self.required) {
            self.entities.insert(entity);
        } else {
            self.entities.remove(&entity);
        }
    }
}

/// Interest records of every registered system.
#[derive(Debug)]
pub struct SystemRegistry {
    tag: u32,
    by_type: HashMap<TypeId, SystemId>,
    records: Vec<InterestRecord>,
}

impl SystemRegistry {
    /// Creates an empty registry with a fresh handle tag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag: NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed),
            by_type: HashMap::new(),
            records: Vec::new(),
        }
    }

    /// Returns the number of registered systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks if no system is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Creates an empty interest record for `S`.
    ///
    /// Use [`SystemRegistry::seed`] to fill it with entities that already
    /// exist.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateRegistration`] if `S` is already registered.
    #[allow(clippy::cast_possible_truncation)]
    pub fn register<S: System>(&mut self, required: Signature) -> EcsResult<SystemId> {
        let key = TypeId::of::<S>();
        if self.by_type.contains_key(&key) {
            return Err(EcsError::DuplicateRegistration(type_name::<S>()));
        }

        let id = SystemId {
            registry: self.tag,
            index: self.records.len() as u32,
        };
        self.records.push(InterestRecord {
            name: type_name::<S>(),
            required,
            entities: BTreeSet::new(),
        });
        self.by_type.insert(key, id);

        debug!(system = type_name::<S>(), ?required, "registered system");
        Ok(id)
    }

    /// Adds every matching entity from `entities` to `system`'s interest set.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownSystem`] if `system` was not issued by this registry.
    pub fn seed<I>(&mut self, system: SystemId, entities: I) -> EcsResult<()>
    where
        I: IntoIterator<Item = (Entity, Signature)>,
    {
        let record = self.record_mut(system)?;
        let required = record.required;
        record.entities.extend(
            entities
                .into_iter()
                .filter(|(_, signature)| signature.matches(required))
                .map(|(entity, _)| entity),
        );
        Ok(())
    }

    /// Re-evaluates `entity`'s membership in every system.
    pub fn on_entity_signature_changed(&mut self, entity: Entity, signature: Signature) {
        for record in &mut self.records {
            record.update(entity, signature);
        }
    }

    /// Erases `entity` from every interest set regardless of signature.
    pub fn on_entity_destroyed(&mut self, entity: Entity) {
        for record in &mut self.records {
            record.entities.remove(&entity);
        }
    }

    /// Returns the handle registered for `S`.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredType`] if `S` was never registered.
    #[inline]
    pub fn id_of<S: System>(&self) -> EcsResult<SystemId> {
        self.by_type
            .get(&TypeId::of::<S>())
            .copied()
            .ok_or(EcsError::UnregisteredType(type_name::<S>()))
    }

    /// Returns the entities currently matching `system`, ordered by id.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownSystem`] if `system` was not issued by this registry.
    #[inline]
    pub fn entities(&self, system: SystemId) -> EcsResult<&BTreeSet<Entity>> {
        self.record(system).map(|record| &record.entities)
    }

    /// Returns the entities currently matching `S`.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredType`] if `S` was never registered.
    pub fn entities_of<S: System>(&self) -> EcsResult<&BTreeSet<Entity>> {
        self.entities(self.id_of::<S>()?)
    }

    /// Returns the signature `system` requires.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownSystem`] if `system` was not issued by this registry.
    pub fn required_signature(&self, system: SystemId) -> EcsResult<Signature> {
        self.record(system).map(|record| record.required)
    }

    /// Returns the Rust type name of `system`.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownSystem`] if `system` was not issued by this registry.
    pub fn name(&self, system: SystemId) -> EcsResult<&'static str> {
        self.record(system).map(|record| record.name)
    }

    fn record(&self, system: SystemId) -> EcsResult<&InterestRecord> {
        if system.registry != self.tag {
            return Err(EcsError::UnknownSystem(system));
        }
        self.records
            .get(system.index())
            .ok_or(EcsError::UnknownSystem(system))
    }

    fn record_mut(&mut self, system: SystemId) -> EcsResult<&mut InterestRecord> {
        if system.registry != self.tag {
            return Err(EcsError::UnknownSystem(system));
        }
        self.records
            .get_mut(system.index())
            .ok_or(EcsError::UnknownSystem(system))
    }
}

impl Default for SystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}
