//! # Component Storage
//!
//! Dense, fixed-capacity storage for a single component type.
//!
//! ```text
//! sparse (entity -> slot):  [ -, 2, -, 0, 1, - ]
//! dense  (slot -> value):   [ C3, C4, C1 ]
//! owners (slot -> entity):  [ e3, e4, e1 ]
//! ```
//!
//! - Insert appends to the dense array: O(1)
//! - Remove swaps the last value into the hole and shrinks: O(1)
//! - Iteration walks contiguous memory with no gaps
//!
//! Dense order is not stable across removals.

use std::any::{type_name, Any};

use super::component::Component;
use super::entity::Entity;
use crate::error::{EcsError, EcsResult};

/// Pre-allocated storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust
/// use nomad_core::{Component, ComponentStore, Entity};
///
/// struct Health(u32);
/// impl Component for Health {}
///
/// # fn main() -> nomad_core::EcsResult<()> {
/// let mut store: ComponentStore<Health> = ComponentStore::new(16);
/// store.insert(Entity::from_raw(3), Health(10))?;
/// store.get_mut(Entity::from_raw(3))?.0 -= 1;
/// assert_eq!(store.get(Entity::from_raw(3))?.0, 9);
/// # Ok(())
/// # }
/// ```
pub struct ComponentStore<C: Component> {
    /// Live component values, gapless.
    dense: Vec<C>,
    /// Owner of each dense slot.
    owners: Vec<Entity>,
    /// Dense slot of each entity id, `None` when absent.
    sparse: Box<[Option<usize>]>,
}

impl<C: Component> ComponentStore<C> {
    /// Creates an empty store able to hold one value for each of `capacity`
    /// entity ids.
    ///
    /// All memory is allocated up front.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            owners: Vec::with_capacity(capacity),
            sparse: vec![None; capacity].into_boxed_slice(),
        }
    }

    /// Returns the capacity of this store.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.sparse.len()
    }

    /// Returns the number of stored values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Checks if the store holds no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Checks if the entity has a value in this store.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot_of(entity).is_some()
    }

    #[inline]
    fn slot_of(&self, entity: Entity) -> Option<usize> {
        self.sparse.get(entity.index()).copied().flatten()
    }

    fn not_present(entity: Entity) -> EcsError {
        EcsError::ComponentNotPresent {
            entity,
            component: type_name::<C>(),
        }
    }

    /// Appends a value for `entity` at the next dense slot.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if the id is beyond the store's capacity
    /// - [`EcsError::DuplicateComponent`] if the entity already has a value
    pub fn insert(&mut self, entity: Entity, value: C) -> EcsResult<()> {
        let next_slot = self.dense.len();
        let slot = self
            .sparse
            .get_mut(entity.index())
            .ok_or(EcsError::InvalidEntity(entity))?;

        if slot.is_some() {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: type_name::<C>(),
            });
        }

        *slot = Some(next_slot);
        self.dense.push(value);
        self.owners.push(entity);
        Ok(())
    }

    /// Removes and returns the entity's value.
    ///
    /// The last dense value moves into the vacated slot. When the removed
    /// value already is the last one, nothing moves.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotPresent`] if the entity has no value.
    pub fn remove(&mut self, entity: Entity) -> EcsResult<C> {
        let slot = self.slot_of(entity).ok_or_else(|| Self::not_present(entity))?;
        Ok(self.remove_at(slot))
    }

    /// `slot` must be occupied.
    fn remove_at(&mut self, slot: usize) -> C {
        let value = self.dense.swap_remove(slot);
        let owner = self.owners.swap_remove(slot);

        // If something was moved into `slot`, repoint its owner
        if let Some(&moved) = self.owners.get(slot) {
            self.sparse[moved.index()] = Some(slot);
        }
        self.sparse[owner.index()] = None;

        value
    }

    /// Gets the entity's value.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotPresent`] if the entity has no value.
    #[inline]
    pub fn get(&self, entity: Entity) -> EcsResult<&C> {
        let slot = self.slot_of(entity).ok_or_else(|| Self::not_present(entity))?;
        Ok(&self.dense[slot])
    }

    /// Gets the entity's value mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotPresent`] if the entity has no value.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> EcsResult<&mut C> {
        let slot = self.slot_of(entity).ok_or_else(|| Self::not_present(entity))?;
        Ok(&mut self.dense[slot])
    }

    /// Removes the entity's value if it has one.
    #[inline]
    pub fn on_entity_destroyed(&mut self, entity: Entity) {
        if let Some(slot) = self.slot_of(entity) {
            self.remove_at(slot);
        }
    }

    /// Returns the dense values. Order is not stable across removals.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.dense
    }

    /// Returns the owner of every dense slot, parallel to [`Self::as_slice`].
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.owners
    }

    /// Iterates over `(owner, value)` pairs in dense order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    /// Iterates mutably over `(owner, value)` pairs in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut C)> {
        self.owners.iter().copied().zip(self.dense.iter_mut())
    }
}

/// Type-erased view of a [`ComponentStore`].
///
/// The registry keeps one boxed store per component type behind this trait
/// and recovers the concrete store through [`ErasedStore::as_any`] when the
/// type is known statically.
pub trait ErasedStore: Any {
    /// Removes the entity's value if it has one.
    fn on_entity_destroyed(&mut self, entity: Entity);

    /// Checks if the entity has a value in this store.
    fn contains(&self, entity: Entity) -> bool;

    /// Returns the number of stored values.
    fn len(&self) -> usize;

    /// Checks if the store holds no values.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the Rust name of the stored component type.
    fn component_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete store.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete store.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStore for ComponentStore<C> {
    fn on_entity_destroyed(&mut self, entity: Entity) {
        ComponentStore::on_entity_destroyed(self, entity);
    }

    fn contains(&self, entity: Entity) -> bool {
        ComponentStore::contains(self, entity)
    }

    fn len(&self) -> usize {
        ComponentStore::len(self)
    }

    fn component_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {}

    #[allow(dead_code)]
    struct Tag;

    impl Component for Tag {}

    fn pos(v: f32) -> Position {
        Position { x: v, y: -v }
    }

    fn e(id: u32) -> Entity {
        Entity::from_raw(id)
    }

    #[test]
    fn test_store_creation() {
        let store: ComponentStore<Position> = ComponentStore::new(1000);
        assert_eq!(store.capacity(), 1000);
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_get() {
        let mut store = ComponentStore::new(10);
        store.insert(e(4), pos(1.0)).unwrap();

        assert_eq!(*store.get(e(4)).unwrap(), pos(1.0));
        store.get_mut(e(4)).unwrap().x = 9.0;
        assert!((store.get(e(4)).unwrap().x - 9.0).abs() < f32::EPSILON);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut store = ComponentStore::new(10);
        store.insert(e(1), pos(1.0)).unwrap();

        let err = store.insert(e(1), pos(2.0)).unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { entity, .. } if entity == e(1)));
        // First value survives
        assert_eq!(*store.get(e(1)).unwrap(), pos(1.0));
    }

    #[test]
    fn test_out_of_range_insert_rejected() {
        let mut store = ComponentStore::new(2);
        assert_eq!(
            store.insert(e(2), pos(0.0)),
            Err(EcsError::InvalidEntity(e(2)))
        );
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let mut store: ComponentStore<Position> = ComponentStore::new(10);
        assert!(matches!(
            store.get(e(3)),
            Err(EcsError::ComponentNotPresent { .. })
        ));
        assert!(store.remove(e(3)).is_err());
        assert!(store.get(e(99)).is_err());
    }

    #[test]
    fn test_remove_from_middle_compacts() {
        let mut store = ComponentStore::new(10);
        for id in 0..4 {
            store.insert(e(id), pos(id as f32)).unwrap();
        }

        assert_eq!(store.remove(e(1)).unwrap(), pos(1.0));

        // Last value moved into the hole
        assert_eq!(store.entities(), &[e(0), e(3), e(2)]);
        assert_eq!(store.len(), 3);
        for id in [0, 2, 3] {
            assert_eq!(*store.get(e(id)).unwrap(), pos(id as f32));
        }
        assert!(!store.contains(e(1)));
    }

    #[test]
    fn test_remove_last_is_self_swap() {
        let mut store = ComponentStore::new(10);
        store.insert(e(5), pos(5.0)).unwrap();
        store.insert(e(6), pos(6.0)).unwrap();

        assert_eq!(store.remove(e(6)).unwrap(), pos(6.0));
        assert_eq!(*store.get(e(5)).unwrap(), pos(5.0));
        assert!(!store.contains(e(6)));

        // Sole remaining value
        assert_eq!(store.remove(e(5)).unwrap(), pos(5.0));
        assert!(store.is_empty());
        assert!(!store.contains(e(5)));

        // Slots are reusable afterwards
        store.insert(e(6), pos(7.0)).unwrap();
        assert_eq!(*store.get(e(6)).unwrap(), pos(7.0));
    }

    #[test]
    fn test_on_entity_destroyed_is_noop_when_absent() {
        let mut store = ComponentStore::new(10);
        store.insert(e(0), pos(0.0)).unwrap();

        store.on_entity_destroyed(e(7));
        assert_eq!(store.len(), 1);

        store.on_entity_destroyed(e(0));
        assert!(store.is_empty());
    }

    #[test]
    fn test_on_entity_destroyed_repoints_moved_value() {
        let mut store = ComponentStore::new(10);
        for id in 0..3 {
            store.insert(e(id), pos(id as f32)).unwrap();
        }

        store.on_entity_destroyed(e(0));

        assert_eq!(store.entities(), &[e(2), e(1)]);
        assert_eq!(*store.get(e(2)).unwrap(), pos(2.0));
        assert_eq!(store.remove(e(2)).unwrap(), pos(2.0));
        assert_eq!(*store.get(e(1)).unwrap(), pos(1.0));
    }

    #[test]
    fn test_erased_downcast() {
        let mut boxed: Box<dyn ErasedStore> = Box::new(ComponentStore::<Position>::new(4));
        assert!(boxed.component_name().ends_with("Position"));

        boxed
            .as_any_mut()
            .downcast_mut::<ComponentStore<Position>>()
            .unwrap()
            .insert(e(2), pos(2.0))
            .unwrap();

        assert!(boxed.contains(e(2)));
        assert!(boxed.as_any().downcast_ref::<ComponentStore<Tag>>().is_none());
    }
}
