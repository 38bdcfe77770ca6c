//! # Component Registry
//!
//! Assigns every registered component type a dense [`ComponentTypeId`] and
//! owns the type's [`ComponentStore`].
//!
//! ## Design
//! - `by_type` maps `TypeId -> ComponentTypeId`
//! - `stores[id]` is the boxed store created when `id` was assigned
//! - Typed access downcasts `stores[id]` back to `ComponentStore<C>`; the
//!   downcast can only fail if the id came from a different `TypeId`
//!
//! ## Invariants
//! - Ids are `0..len()`, assigned in registration order, never reused
//! - Every entry in `by_type` has a matching store

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::component::{Component, ComponentTypeId, MAX_COMPONENTS};
use super::entity::Entity;
use super::storage::{ComponentStore, ErasedStore};
use crate::error::{EcsError, EcsResult};

/// Type-id bookkeeping and type-erased dispatch to component stores.
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentTypeId>,
    stores: Vec<Box<dyn ErasedStore>>,
    /// Capacity handed to every new store.
    capacity: usize,
}

impl ComponentRegistry {
    /// Creates an empty registry whose stores will hold `capacity` entities.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            by_type: HashMap::with_capacity(MAX_COMPONENTS),
            stores: Vec::with_capacity(MAX_COMPONENTS),
            capacity,
        }
    }

    /// Returns the number of registered component types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Checks if no component type is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Assigns the next id to `C` and creates its store.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DuplicateRegistration`] if `C` is already registered
    /// - [`EcsError::ComponentLimitReached`] if [`MAX_COMPONENTS`] types exist
    pub fn register<C: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        let key = TypeId::of::<C>();
        if self.by_type.contains_key(&key) {
            return Err(EcsError::DuplicateRegistration(type_name::<C>()));
        }
        if self.stores.len() >= MAX_COMPONENTS {
            return Err(EcsError::ComponentLimitReached {
                limit: MAX_COMPONENTS,
            });
        }

        let id = ComponentTypeId::from_index(self.stores.len());
        self.stores
            .push(Box::new(ComponentStore::<C>::new(self.capacity)));
        self.by_type.insert(key, id);

        debug!(component = type_name::<C>(), id = id.index(), "registered component type");
        Ok(id)
    }

    /// Returns the id assigned to `C`.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredType`] if `C` was never registered.
    #[inline]
    pub fn type_id<C: Component>(&self) -> EcsResult<ComponentTypeId> {
        self.by_type
            .get(&TypeId::of::<C>())
            .copied()
            .ok_or(EcsError::UnregisteredType(type_name::<C>()))
    }

    /// Checks if `C` is registered.
    #[inline]
    #[must_use]
    pub fn is_registered<C: Component>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<C>())
    }

    /// Returns the Rust type name registered under `id`.
    #[must_use]
    pub fn type_name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.stores.get(id.index()).map(|store| store.component_name())
    }

    /// Returns the typed store for `C`.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredType`] if `C` was never registered.
    pub fn store<C: Component>(&self) -> EcsResult<&ComponentStore<C>> {
        let id = self.type_id::<C>()?;
        self.stores
            .get(id.index())
            .and_then(|store| store.as_any().downcast_ref::<ComponentStore<C>>())
            .ok_or(EcsError::UnregisteredType(type_name::<C>()))
    }

    /// Returns the typed store for `C` mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredType`] if `C` was never registered.
    pub fn store_mut<C: Component>(&mut self) -> EcsResult<&mut ComponentStore<C>> {
        let id = self.type_id::<C>()?;
        self.stores
            .get_mut(id.index())
            .and_then(|store| store.as_any_mut().downcast_mut::<ComponentStore<C>>())
            .ok_or(EcsError::UnregisteredType(type_name::<C>()))
    }

    /// Stores `value` for `entity` in `C`'s store.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredType`] or any error of [`ComponentStore::insert`].
    #[inline]
    pub fn add<C: Component>(&mut self, entity: Entity, value: C) -> EcsResult<()> {
        self.store_mut::<C>()?.insert(entity, value)
    }

    /// Removes and returns `entity`'s value from `C`'s store.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredType`] or [`EcsError::ComponentNotPresent`].
    #[inline]
    pub fn remove<C: Component>(&mut self, entity: Entity) -> EcsResult<C> {
        self.store_mut::<C>()?.remove(entity)
    }

    /// Gets `entity`'s value from `C`'s store.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredType`] or [`EcsError::ComponentNotPresent`].
    #[inline]
    pub fn get<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.store::<C>()?.get(entity)
    }

    /// Gets `entity`'s value from `C`'s store mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredType`] or [`EcsError::ComponentNotPresent`].
    #[inline]
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.store_mut::<C>()?.get_mut(entity)
    }

    /// Purges `entity` from every store.
    pub fn on_entity_destroyed(&mut self, entity: Entity) {
        for store in &mut self.stores {
            store.on_entity_destroyed(entity);
        }
    }

    /// Checks whether any store still holds a value for `entity`.
    #[must_use]
    pub fn holds_any(&self, entity: Entity) -> bool {
        self.stores.iter().any(|store| store.contains(entity))
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stores.iter().map(|store| (store.component_name(), store.len())))
            .finish()
    }
}
