//! # Frame Loop Components
//!
//! Plain data stored per entity. Both types are `Pod` so a GPU backend can
//! upload them as raw bytes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use nomad_core::Component;

use crate::render::{MeshHandle, ShaderHandle};

/// Render state: which mesh to draw with which shader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Renderable {
    /// Vertex/index buffers.
    pub mesh: MeshHandle,
    /// Linked shader program.
    pub shader: ShaderHandle,
    /// Number of indices to draw.
    pub index_count: u32,
}

impl Component for Renderable {}

/// Model matrix of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Transform {
    /// Model-to-world matrix.
    pub model: Mat4,
}

impl Component for Transform {}

impl Transform {
    /// Creates a transform placed at `translation`.
    #[inline]
    #[must_use]
    pub fn at(translation: Vec3) -> Self {
        Self {
            model: Mat4::from_translation(translation),
        }
    }

    /// Translates in model space (`model = model * T(delta)`).
    #[inline]
    pub fn translate(&mut self, delta: Vec3) {
        self.model *= Mat4::from_translation(delta);
    }

    /// Returns the world-space position of the model origin.
    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
        }
    }
}
