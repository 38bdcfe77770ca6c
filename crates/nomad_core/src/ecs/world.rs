//! # ECS World
//!
//! The single entry point for structural changes. Every mutating call runs
//! the same protocol so that stores, signatures and interest sets never
//! disagree once the call returns:
//!
//! ```text
//! create_entity:     take id (empty signature) -> recompute interest
//! add_component:     validate -> store value -> set bit   -> write signature -> recompute interest
//! remove_component:  validate -> take value  -> clear bit -> write signature -> recompute interest
//! destroy_entity:    validate -> free id (signature reset) -> purge stores  -> purge interest sets
//! ```
//!
//! Validation runs before any registry is touched, so a failed call leaves
//! the world exactly as it was.

use std::collections::BTreeSet;

use tracing::debug;

use super::component::{Component, ComponentTypeId};
use super::entity::{Entity, EntityRegistry, MAX_ENTITIES};
use super::registry::ComponentRegistry;
use super::signature::Signature;
use super::system::{System, SystemId, SystemRegistry};
use crate::error::EcsResult;

/// The ECS World - entity pool, component stores and system interest sets.
///
/// The world is a plain owned value. Whoever needs it gets a reference.
///
/// # Capacity
///
/// The entity capacity is fixed at creation. It defaults to
/// [`MAX_ENTITIES`] and can be lowered with [`World::with_capacity`].
///
/// # Example
///
/// ```rust
/// use nomad_core::{Component, EcsError, Signature, System, World};
///
/// #[derive(Debug, PartialEq)]
/// struct Position { x: f32, y: f32 }
/// impl Component for Position {}
///
/// struct Mover;
/// impl System for Mover {}
///
/// # fn main() -> nomad_core::EcsResult<()> {
/// let mut world = World::with_capacity(16)?;
/// let position = world.register_component::<Position>()?;
///
/// let e0 = world.create_entity()?;
/// world.add_component(e0, Position { x: 1.0, y: 2.0 })?;
/// assert!(world.signature(e0)?.test(position));
///
/// let mover = world.register_system::<Mover>(Signature::EMPTY.with(position))?;
/// assert!(world.system_entities(mover)?.contains(&e0));
///
/// world.remove_component::<Position>(e0)?;
/// assert!(!world.signature(e0)?.test(position));
/// assert!(world.system_entities(mover)?.is_empty());
/// assert!(matches!(
///     world.get_component::<Position>(e0),
///     Err(EcsError::ComponentNotPresent { .. })
/// ));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct World {
    entities: EntityRegistry,
    components: ComponentRegistry,
    systems: SystemRegistry,
}

impl World {
    /// Creates a world with room for [`MAX_ENTITIES`] live entities.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: EntityRegistry::default(),
            components: ComponentRegistry::new(MAX_ENTITIES),
            systems: SystemRegistry::new(),
        }
    }

    /// Creates a world with room for `capacity` live entities.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidCapacity`](crate::EcsError::InvalidCapacity) if
    /// `capacity` is zero or above [`MAX_ENTITIES`].
    pub fn with_capacity(capacity: usize) -> EcsResult<Self> {
        Ok(Self {
            entities: EntityRegistry::new(capacity)?,
            components: ComponentRegistry::new(capacity),
            systems: SystemRegistry::new(),
        })
    }

    /// Returns the maximum number of live entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub fn living_count(&self) -> usize {
        self.entities.living_count()
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity with an empty signature.
    ///
    /// Systems that require nothing pick it up immediately.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if every id is in use.
    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        let entity = self.entities.create()?;
        self.systems.on_entity_signature_changed(entity, Signature::EMPTY);
        Ok(entity)
    }

    /// Destroys an entity, dropping all of its components and removing it
    /// from every interest set. Its id goes back to the free queue.
    ///
    /// # Errors
    ///
    /// `InvalidEntity` if the entity was never created or is already
    /// destroyed.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.entities.destroy(entity)?;
        self.components.on_entity_destroyed(entity);
        self.systems.on_entity_destroyed(entity);
        Ok(())
    }

    /// Returns the entity's current signature.
    ///
    /// # Errors
    ///
    /// `InvalidEntity` if the entity is not alive.
    #[inline]
    pub fn signature(&self, entity: Entity) -> EcsResult<Signature> {
        self.entities.signature(entity)
    }

    /// Iterates over every live entity whose signature matches `required`,
    /// in id order.
    ///
    /// This scans the whole pool. Prefer a registered system's interest set
    /// for per-frame queries.
    pub fn entities_matching(&self, required: Signature) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .iter_alive()
            .filter(move |(_, signature)| signature.matches(required))
            .map(|(entity, _)| entity)
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Registers `C` and returns its type id.
    ///
    /// # Errors
    ///
    /// `DuplicateRegistration` or `ComponentLimitReached`.
    pub fn register_component<C: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        self.components.register::<C>()
    }

    /// Returns the type id assigned to `C`.
    ///
    /// # Errors
    ///
    /// `UnregisteredType` if `C` was never registered.
    #[inline]
    pub fn component_type_id<C: Component>(&self) -> EcsResult<ComponentTypeId> {
        self.components.type_id::<C>()
    }

    /// Attaches `value` to `entity`.
    ///
    /// # Errors
    ///
    /// `InvalidEntity`, `UnregisteredType` or `DuplicateComponent`, checked
    /// in that order.
    pub fn add_component<C: Component>(&mut self, entity: Entity, value: C) -> EcsResult<()> {
        let mut signature = self.entities.signature(entity)?;
        let id = self.components.type_id::<C>()?;

        self.components.add(entity, value)?;

        signature.set(id);
        self.entities.set_signature(entity, signature)?;
        self.systems.on_entity_signature_changed(entity, signature);
        Ok(())
    }

    /// Detaches and returns `entity`'s `C`.
    ///
    /// # Errors
    ///
    /// `InvalidEntity`, `UnregisteredType` or `ComponentNotPresent`, checked
    /// in that order.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> EcsResult<C> {
        let mut signature = self.entities.signature(entity)?;
        let id = self.components.type_id::<C>()?;

        let value = self.components.remove::<C>(entity)?;

        signature.clear(id);
        self.entities.set_signature(entity, signature)?;
        self.systems.on_entity_signature_changed(entity, signature);
        Ok(value)
    }

    /// Returns a mutable reference to `entity`'s `C`.
    ///
    /// # Errors
    ///
    /// `InvalidEntity`, `UnregisteredType` or `ComponentNotPresent`.
    #[inline]
    pub fn get_component<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.entities.ensure_alive(entity)?;
        self.components.get_mut::<C>(entity)
    }

    /// Returns a shared reference to `entity`'s `C`.
    ///
    /// # Errors
    ///
    /// `InvalidEntity`, `UnregisteredType` or `ComponentNotPresent`.
    #[inline]
    pub fn component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.entities.ensure_alive(entity)?;
        self.components.get::<C>(entity)
    }

    /// Checks whether `entity` currently has a `C`, using its signature.
    ///
    /// # Errors
    ///
    /// `InvalidEntity` or `UnregisteredType`.
    #[inline]
    pub fn has_component<C: Component>(&self, entity: Entity) -> EcsResult<bool> {
        let signature = self.entities.signature(entity)?;
        Ok(signature.test(self.components.type_id::<C>()?))
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers system `S` with the signature it requires.
    ///
    /// Entities that already match are added to the new interest set right
    /// away.
    ///
    /// # Errors
    ///
    /// `DuplicateRegistration` if `S` is already registered.
    pub fn register_system<S: System>(&mut self, required: Signature) -> EcsResult<SystemId> {
        let id = self.systems.register::<S>(required)?;
        self.systems.seed(id, self.entities.iter_alive())?;

        debug!(
            system = id.index(),
            members = self.systems.entities(id)?.len(),
            "seeded system interest set"
        );
        Ok(id)
    }

    /// Returns the handle of system `S`.
    ///
    /// # Errors
    ///
    /// `UnregisteredType` if `S` was never registered.
    #[inline]
    pub fn system_id<S: System>(&self) -> EcsResult<SystemId> {
        self.systems.id_of::<S>()
    }

    /// Returns the entities currently matching `system`, ordered by id.
    ///
    /// # Errors
    ///
    /// `UnknownSystem` if the handle came from another world.
    #[inline]
    pub fn system_entities(&self, system: SystemId) -> EcsResult<&BTreeSet<Entity>> {
        self.systems.entities(system)
    }

    /// Returns the entities currently matching system `S`.
    ///
    /// # Errors
    ///
    /// `UnregisteredType` if `S` was never registered.
    #[inline]
    pub fn system_entities_of<S: System>(&self) -> EcsResult<&BTreeSet<Entity>> {
        self.systems.entities_of::<S>()
    }

    /// Returns the signature `system` requires.
    ///
    /// # Errors
    ///
    /// `UnknownSystem` if the handle came from another world.
    #[inline]
    pub fn system_signature(&self, system: SystemId) -> EcsResult<Signature> {
        self.systems.required_signature(system)
    }

    /// Runs `f` on the `C` of every entity in `system`'s interest set, in id
    /// order.
    ///
    /// # Errors
    ///
    /// `UnknownSystem`, `UnregisteredType`, or `ComponentNotPresent` if the
    /// system does not require `C` and a member lacks one. On error `f` has
    /// not been called.
    pub fn for_each_mut<C, F>(&mut self, system: SystemId, mut f: F) -> EcsResult<()>
    where
        C: Component,
        F: FnMut(Entity, &mut C),
    {
        let required = self.systems.required_signature(system)?;
        let id = self.components.type_id::<C>()?;
        let members = self.systems.entities(system)?;
        let store = self.components.store_mut::<C>()?;
        if !required.test(id) {
            // Membership does not imply C here
            for &entity in members {
                store.get(entity)?;
            }
        }
        for &entity in members {
            f(entity, store.get_mut(entity)?);
        }
        Ok(())
    }

    // =========================================================================
    // Read-only registry access
    // =========================================================================

    /// Returns the entity registry.
    #[inline]
    #[must_use]
    pub fn entity_registry(&self) -> &EntityRegistry {
        &self.entities
    }

    /// Returns the component registry.
    #[inline]
    #[must_use]
    pub fn component_registry(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Returns the system registry.
    #[inline]
    #[must_use]
    pub fn system_registry(&self) -> &SystemRegistry {
        &self.systems
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
