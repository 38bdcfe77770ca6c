//! # Component Types
//!
//! Components are pure data containers with no behavior. Each distinct Rust
//! type gets a small [`ComponentTypeId`] when it is registered with a world;
//! that id is the bit the type occupies in every [`Signature`].
//!
//! [`Signature`]: super::Signature

use std::fmt;

/// Maximum number of component types a world can register.
///
/// This is the width of a [`Signature`](super::Signature).
pub const MAX_COMPONENTS: usize = 32;

/// Marker trait for ECS components.
///
/// Any owned `'static` type can be a component; the trait only exists so
/// that storing a type in the ECS is an explicit decision.
///
/// # Example
///
/// ```rust
/// use nomad_core::Component;
///
/// #[derive(Clone, Copy, Debug, Default)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {}
/// ```
pub trait Component: Sized + 'static {}

/// Dense id assigned to a component type at registration.
///
/// Ids start at 0 and are handed out in registration order. They are never
/// reused for the lifetime of the world that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentTypeId(u8);

impl ComponentTypeId {
    /// Creates an id from a registry slot. Callers keep `index < MAX_COMPONENTS`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn from_index(index: usize) -> Self {
        debug_assert!(index < MAX_COMPONENTS);
        Self(index as u8)
    }

    /// Returns the id as an index (also its bit position in a signature).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_index_roundtrip() {
        let id = ComponentTypeId::from_index(31);
        assert_eq!(id.index(), 31);
        assert_eq!(id.to_string(), "component#31");
    }
}
