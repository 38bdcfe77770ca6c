//! World-level invariants, checked after every mutation.
//!
//! Run with: cargo test -p nomad_core --test world_invariants

use nomad_core::{
    Component, ComponentTypeId, EcsError, Entity, Signature, System, SystemId, World,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[allow(dead_code)]
#[derive(Clone, Copy, Debug, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {}

#[allow(dead_code)]
#[derive(Clone, Copy, Debug, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}
impl Component for Velocity {}

#[allow(dead_code)]
#[derive(Clone, Debug, PartialEq)]
struct Label(String);
impl Component for Label {}

#[allow(dead_code)]
struct Render;
impl System for Render {}

#[allow(dead_code)]
struct Physics;
impl System for Physics {}

#[allow(dead_code)]
struct Everything;
impl System for Everything {}

struct Fixture {
    world: World,
    position: ComponentTypeId,
    velocity: ComponentTypeId,
    label: ComponentTypeId,
    systems: Vec<SystemId>,
}

fn fixture(capacity: usize) -> Fixture {
    let mut world = World::with_capacity(capacity).unwrap();
    let position = world.register_component::<Position>().unwrap();
    let velocity = world.register_component::<Velocity>().unwrap();
    let label = world.register_component::<Label>().unwrap();

    let systems = vec![
        world
            .register_system::<Render>(Signature::EMPTY.with(position))
            .unwrap(),
        world
            .register_system::<Physics>(Signature::EMPTY.with(position).with(velocity))
            .unwrap(),
        world.register_system::<Everything>(Signature::EMPTY).unwrap(),
    ];

    Fixture {
        world,
        position,
        velocity,
        label,
        systems,
    }
}

/// Checks signature consistency, interest correctness and that no dead id
/// lingers anywhere.
fn assert_invariants(fx: &Fixture) {
    let world = &fx.world;
    let capacity = u32::try_from(world.capacity()).unwrap();

    for raw in 0..capacity {
        let entity = Entity::from_raw(raw);
        let registry = world.component_registry();

        if !world.is_alive(entity) {
            assert!(!registry.holds_any(entity), "{entity} is dead but owns components");
            for &system in &fx.systems {
                assert!(
                    !world.system_entities(system).unwrap().contains(&entity),
                    "{entity} is dead but is in {system}"
                );
            }
            continue;
        }

        let signature = world.signature(entity).unwrap();
        assert_eq!(
            signature.test(fx.position),
            registry.store::<Position>().unwrap().contains(entity)
        );
        assert_eq!(
            signature.test(fx.velocity),
            registry.store::<Velocity>().unwrap().contains(entity)
        );
        assert_eq!(
            signature.test(fx.label),
            registry.store::<Label>().unwrap().contains(entity)
        );

        for &system in &fx.systems {
            let required = world.system_signature(system).unwrap();
            assert_eq!(
                world.system_entities(system).unwrap().contains(&entity),
                signature.matches(required),
                "{entity} with {signature:?} vs {system} requiring {required:?}"
            );
        }
    }
}

#[test]
fn randomized_operations_preserve_invariants() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
    let mut fx = fixture(64);
    let mut live: Vec<Entity> = Vec::new();

    for step in 0..5_000 {
        let roll = rng.gen_range(0..100);

        if live.is_empty() || roll < 15 {
            match fx.world.create_entity() {
                Ok(entity) => {
                    assert!(fx.world.signature(entity).unwrap().is_empty());
                    live.push(entity);
                }
                Err(err) => {
                    assert_eq!(err, EcsError::CapacityExceeded { capacity: 64 });
                    assert_eq!(live.len(), 64);
                }
            }
        } else if roll < 25 {
            let entity = live.swap_remove(rng.gen_range(0..live.len()));
            fx.world.destroy_entity(entity).unwrap();
        } else {
            let entity = live[rng.gen_range(0..live.len())];
            let value = step as f32;
            match rng.gen_range(0..6) {
                0 => {
                    let had = fx.world.has_component::<Position>(entity).unwrap();
                    let result = fx.world.add_component(entity, Position { x: value, y: -value });
                    assert_eq!(result.is_ok(), !had);
                }
                1 => {
                    let had = fx.world.has_component::<Velocity>(entity).unwrap();
                    let result = fx.world.add_component(entity, Velocity { dx: value, dy: value });
                    assert_eq!(result.is_ok(), !had);
                }
                2 => {
                    let had = fx.world.has_component::<Label>(entity).unwrap();
                    let result = fx.world.add_component(entity, Label(format!("step {step}")));
                    assert_eq!(result.is_ok(), !had);
                }
                3 => {
                    let had = fx.world.has_component::<Position>(entity).unwrap();
                    assert_eq!(fx.world.remove_component::<Position>(entity).is_ok(), had);
                }
                4 => {
                    let had = fx.world.has_component::<Velocity>(entity).unwrap();
                    assert_eq!(fx.world.remove_component::<Velocity>(entity).is_ok(), had);
                }
                _ => {
                    let had = fx.world.has_component::<Label>(entity).unwrap();
                    assert_eq!(fx.world.remove_component::<Label>(entity).is_ok(), had);
                }
            }
        }

        assert_eq!(fx.world.living_count(), live.len());
        assert_invariants(&fx);
    }
}

#[test]
fn destroyed_id_is_reissued_exactly_once_with_clean_signature() {
    let mut fx = fixture(16);
    let entities: Vec<Entity> = (0..16).map(|_| fx.world.create_entity().unwrap()).collect();

    let victim = entities[5];
    fx.world
        .add_component(victim, Position { x: 1.0, y: 1.0 })
        .unwrap();
    fx.world.destroy_entity(victim).unwrap();

    // Free up the rest so `capacity` more creations are possible
    for &entity in entities.iter().filter(|&&e| e != victim) {
        fx.world.destroy_entity(entity).unwrap();
    }

    let reissued: Vec<Entity> = (0..16).map(|_| fx.world.create_entity().unwrap()).collect();
    assert_eq!(reissued.iter().filter(|&&e| e == victim).count(), 1);
    // FIFO: the victim was freed first, so it comes back first
    assert_eq!(reissued[0], victim);
    assert!(fx.world.signature(victim).unwrap().is_empty());
    assert!(fx.world.component::<Position>(victim).is_err());
    assert_invariants(&fx);
}

#[test]
fn capacity_boundary() {
    let mut world = World::with_capacity(32).unwrap();
    let entities: Vec<Entity> = (0..32).map(|_| world.create_entity().unwrap()).collect();

    assert_eq!(
        world.create_entity(),
        Err(EcsError::CapacityExceeded { capacity: 32 })
    );

    world.destroy_entity(entities[17]).unwrap();
    assert_eq!(world.create_entity().unwrap(), entities[17]);
    assert!(world.create_entity().is_err());
}

#[test]
fn full_default_capacity() {
    let mut world = World::new();
    for _ in 0..world.capacity() {
        world.create_entity().unwrap();
    }
    assert!(matches!(
        world.create_entity(),
        Err(EcsError::CapacityExceeded { .. })
    ));
}

#[test]
fn swap_remove_preserves_other_values() {
    let mut fx = fixture(16);
    let entities: Vec<Entity> = (0..6).map(|_| fx.world.create_entity().unwrap()).collect();
    for (i, &entity) in entities.iter().enumerate() {
        let v = i as f32;
        fx.world.add_component(entity, Position { x: v, y: v * 2.0 }).unwrap();
    }

    // Remove from the middle, then the (new) last, then the front
    fx.world.remove_component::<Position>(entities[2]).unwrap();
    let last = *fx
        .world
        .component_registry()
        .store::<Position>()
        .unwrap()
        .entities()
        .last()
        .unwrap();
    fx.world.remove_component::<Position>(last).unwrap();
    fx.world.remove_component::<Position>(entities[0]).unwrap();

    for (i, &entity) in entities.iter().enumerate() {
        let v = i as f32;
        if entity == entities[2] || entity == last || entity == entities[0] {
            assert!(fx.world.component::<Position>(entity).is_err());
        } else {
            assert_eq!(
                fx.world.component::<Position>(entity).unwrap(),
                &Position { x: v, y: v * 2.0 }
            );
        }
    }
    assert_invariants(&fx);
}

#[test]
fn removing_sole_component_is_safe() {
    let mut fx = fixture(4);
    let entity = fx.world.create_entity().unwrap();
    fx.world
        .add_component(entity, Label("only".to_owned()))
        .unwrap();

    assert_eq!(
        fx.world.remove_component::<Label>(entity).unwrap(),
        Label("only".to_owned())
    );
    assert!(fx.world.component_registry().store::<Label>().unwrap().is_empty());

    // Re-adding after the self-swap works
    fx.world
        .add_component(entity, Label("again".to_owned()))
        .unwrap();
    assert_eq!(
        fx.world.component::<Label>(entity).unwrap(),
        &Label("again".to_owned())
    );
    assert_invariants(&fx);
}

#[test]
fn destroyed_entity_leaves_no_trace() {
    let mut fx = fixture(8);
    let entity = fx.world.create_entity().unwrap();
    fx.world.add_component(entity, Position { x: 0.0, y: 0.0 }).unwrap();
    fx.world.add_component(entity, Velocity { dx: 1.0, dy: 0.0 }).unwrap();
    assert!(fx.world.system_entities_of::<Physics>().unwrap().contains(&entity));

    fx.world.destroy_entity(entity).unwrap();

    for &system in &fx.systems {
        assert!(!fx.world.system_entities(system).unwrap().contains(&entity));
    }
    assert_eq!(
        fx.world.get_component::<Position>(entity).unwrap_err(),
        EcsError::InvalidEntity(entity)
    );
    assert_eq!(
        fx.world.get_component::<Velocity>(entity).unwrap_err(),
        EcsError::InvalidEntity(entity)
    );
    assert_invariants(&fx);
}

#[test]
fn registration_errors() {
    let mut fx = fixture(4);
    assert!(matches!(
        fx.world.register_component::<Position>(),
        Err(EcsError::DuplicateRegistration(_))
    ));
    assert!(matches!(
        fx.world.register_system::<Render>(Signature::EMPTY),
        Err(EcsError::DuplicateRegistration(_))
    ));

    #[allow(dead_code)]
    struct Unknown;
    impl Component for Unknown {}
    assert!(matches!(
        fx.world.component_type_id::<Unknown>(),
        Err(EcsError::UnregisteredType(_))
    ));

    let other = World::with_capacity(1).unwrap();
    assert!(matches!(
        other.system_entities(fx.systems[2]),
        Err(EcsError::UnknownSystem(_))
    ));
}

#[test]
fn system_handles_do_not_cross_worlds() {
    let mut wa = World::with_capacity(4).unwrap();
    let mut wb = World::with_capacity(4).unwrap();
    let pos_a = wa.register_component::<Position>().unwrap();
    let pos_b = wb.register_component::<Position>().unwrap();
    let handle_a = wa.register_system::<Render>(Signature::EMPTY.with(pos_a)).unwrap();
    let handle_b = wb.register_system::<Render>(Signature::EMPTY.with(pos_b)).unwrap();

    let e = wb.create_entity().unwrap();
    wb.add_component(e, Position { x: 0.0, y: 0.0 }).unwrap();

    assert!(matches!(
        wb.system_entities(handle_a),
        Err(EcsError::UnknownSystem(id)) if id == handle_a
    ));
    assert!(matches!(
        wb.for_each_mut::<Position, _>(handle_a, |_, p| p.x += 1.0),
        Err(EcsError::UnknownSystem(_))
    ));
    assert!(wa.system_entities(handle_a).unwrap().is_empty());
    assert!(wb.system_entities(handle_b).unwrap().contains(&e));
    assert!(wb.component::<Position>(e).unwrap().x.abs() < f32::EPSILON);
}
