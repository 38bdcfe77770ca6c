//! # Entity Component System
//!
//! ## Design Philosophy
//!
//! - Entity capacity is fixed when the world is created
//! - Components are stored in dense arrays for cache efficiency
//! - Entity ids are simple indices, recycled through a FIFO queue
//! - Signatures are bitsets, one bit per registered component type
//!
//! The three registries ([`EntityRegistry`], [`ComponentRegistry`],
//! [`SystemRegistry`]) never call each other. [`World`] is the only place
//! that sequences them.

mod component;
mod entity;
mod registry;
mod signature;
mod storage;
mod system;
mod world;

pub use component::{Component, ComponentTypeId, MAX_COMPONENTS};
pub use entity::{Entity, EntityRegistry, MAX_ENTITIES};
pub use registry::ComponentRegistry;
pub use signature::{Signature, SignatureIter};
pub use storage::{ComponentStore, ErasedStore};
pub use system::{System, SystemId, SystemRegistry};
pub use world::World;
