//! # Frame Loop Systems
//!
//! Each system is a marker type whose interest set the [`World`] keeps up to
//! date. The free functions below iterate those sets once per frame.

use glam::Vec3;
use nomad_core::{EcsResult, Signature, System, SystemId, World};

use crate::components::{Renderable, Transform};
use crate::render::{Camera, DrawCommand, RenderBackend};

/// Moves every entity with a [`Transform`].
#[derive(Debug)]
pub struct MovementSystem;

impl System for MovementSystem {}

/// Draws every entity with a [`Transform`] and a [`Renderable`].
#[derive(Debug)]
pub struct RenderSystem;

impl System for RenderSystem {}

/// Ids of the registered frame loop systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemSet {
    /// [`MovementSystem`].
    pub movement: SystemId,
    /// [`RenderSystem`].
    pub render: SystemId,
}

/// Registers the frame loop's component types and systems on `world`.
///
/// # Errors
///
/// Fails if any of them is already registered.
pub fn register(world: &mut World) -> EcsResult<SystemSet> {
    let transform = world.register_component::<Transform>()?;
    let renderable = world.register_component::<Renderable>()?;

    let movement = world.register_system::<MovementSystem>(Signature::EMPTY.with(transform))?;
    let render = world
        .register_system::<RenderSystem>(Signature::EMPTY.with(transform).with(renderable))?;

    Ok(SystemSet { movement, render })
}

/// Translates every member of `system` by `delta`.
///
/// # Errors
///
/// Fails if `system` is unknown or a member has no [`Transform`].
pub fn apply_movement(world: &mut World, system: SystemId, delta: Vec3) -> EcsResult<()> {
    if delta == Vec3::ZERO {
        return Ok(());
    }
    world.for_each_mut::<Transform, _>(system, |_, transform| transform.translate(delta))
}

/// Submits one draw per member of `system` and returns how many were drawn.
///
/// Does not clear or present; the caller brackets the pass.
///
/// # Errors
///
/// Fails if `system` is unknown or a member lacks either component.
pub fn render_frame<B: RenderBackend>(
    world: &World,
    system: SystemId,
    camera: &Camera,
    backend: &mut B,
) -> EcsResult<usize> {
    let members = world.system_entities(system)?;
    for &entity in members {
        let transform = world.component::<Transform>(entity)?;
        let renderable = world.component::<Renderable>(entity)?;
        backend.draw(&DrawCommand::new(renderable, transform, camera));
    }
    Ok(members.len())
}
