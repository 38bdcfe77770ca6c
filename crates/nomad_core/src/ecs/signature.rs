//! # Signatures
//!
//! A signature is a bitset over component type ids. Entities carry one to
//! record which components they own; systems carry one to describe which
//! components they require.
//!
//! ## Performance
//!
//! - Set / clear / test: O(1), single bit operation
//! - Match: one AND and one compare
//! - Iterate: O(set bits) via `trailing_zeros`

use std::fmt;
use std::ops::{BitAnd, BitOr};

use super::component::{ComponentTypeId, MAX_COMPONENTS};

/// Fixed-width bitset of component type ids.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(u32);

impl Signature {
    /// Signature with no bits set.
    pub const EMPTY: Self = Self(0);

    /// Creates a signature from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Creates a signature with exactly the given ids set.
    #[must_use]
    pub fn from_ids(ids: &[ComponentTypeId]) -> Self {
        ids.iter().copied().collect()
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns a copy of this signature with `id` set.
    #[inline]
    #[must_use]
    pub const fn with(self, id: ComponentTypeId) -> Self {
        Self(self.0 | (1 << id.index()))
    }

    /// Returns a copy of this signature with `id` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, id: ComponentTypeId) -> Self {
        Self(self.0 & !(1 << id.index()))
    }

    /// Sets the bit for `id`.
    #[inline]
    pub fn set(&mut self, id: ComponentTypeId) {
        *self = self.with(id);
    }

    /// Clears the bit for `id`.
    #[inline]
    pub fn clear(&mut self, id: ComponentTypeId) {
        *self = self.without(id);
    }

    /// Clears every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Checks whether the bit for `id` is set.
    #[inline]
    #[must_use]
    pub const fn test(self, id: ComponentTypeId) -> bool {
        (self.0 >> id.index()) & 1 == 1
    }

    /// Checks whether every bit of `required` is also set in `self`.
    ///
    /// This is the system membership test: `(self & required) == required`.
    /// The empty signature is matched by everything.
    #[inline]
    #[must_use]
    pub const fn matches(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Checks if no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of set bits.
    #[inline]
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates over the ids of the set bits, lowest first.
    #[inline]
    pub fn iter(self) -> SignatureIter {
        SignatureIter { remaining: self.0 }
    }
}

impl BitAnd for Signature {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Signature {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl FromIterator<ComponentTypeId> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentTypeId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:0width$b})", self.0, width = MAX_COMPONENTS)
    }
}

/// Iterator over the component ids set in a [`Signature`].
#[derive(Clone, Debug)]
pub struct SignatureIter {
    remaining: u32,
}

impl Iterator for SignatureIter {
    type Item = ComponentTypeId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let bit = self.remaining.trailing_zeros() as usize;
        // Clear lowest set bit
        self.remaining &= self.remaining - 1;
        Some(ComponentTypeId::from_index(bit))
    }
}
