//! # NOMAD Core
//!
//! A fixed-capacity Entity Component System:
//! - Entities are plain integer ids handed out from a FIFO pool
//! - Components live in dense per-type arrays with a sparse entity index
//! - Systems keep an interest set of every entity whose signature matches
//!
//! ## Architecture Rules
//!
//! 1. **Every structural change goes through [`World`]** - stores, signatures
//!    and interest sets are updated together or not at all
//! 2. **Checked access** - a missing entity, type or component is an
//!    [`EcsError`], never a default value
//! 3. **O(1) structural changes** - add, remove and lookup never scan
//!
//! ## Example
//!
//! ```rust
//! use nomad_core::{Component, Signature, System, World};
//!
//! struct Position { x: f32, y: f32 }
//! impl Component for Position {}
//!
//! struct Drawable;
//! impl System for Drawable {}
//!
//! # fn main() -> nomad_core::EcsResult<()> {
//! let mut world = World::new();
//! let position = world.register_component::<Position>()?;
//! let drawable = world.register_system::<Drawable>(Signature::EMPTY.with(position))?;
//!
//! let entity = world.create_entity()?;
//! world.add_component(entity, Position { x: 1.0, y: 2.0 })?;
//! assert!(world.system_entities(drawable)?.contains(&entity));
//!
//! world.get_component::<Position>(entity)?.x += 1.0;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;

pub use ecs::{
    Component, ComponentRegistry, ComponentStore, ComponentTypeId, Entity, EntityRegistry,
    ErasedStore, Signature, System, SystemId, SystemRegistry, World, MAX_COMPONENTS,
    MAX_ENTITIES,
};
pub use error::{EcsError, EcsResult};
