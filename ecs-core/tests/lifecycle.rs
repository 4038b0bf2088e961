// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Entity lifecycle, cloning, introspection and deferred mutation
//!
//! End-to-end tests exercising the public API the way an update loop or a
//! snapshot layer would.

use ecs_core::ecs::{Component, ComponentStore, Entity, EntityAllocator, IdSource, Writeback};
use ecs_core::{EcsConfig, EcsError, Universe, World};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct Health(u32);
impl Component for Health {}

#[derive(Debug, Clone, PartialEq)]
struct Position {
    x: f64,
    y: f64,
    z: f64,
}
impl Component for Position {}

#[derive(Debug, Clone, PartialEq)]
struct Label(String);
impl Component for Label {}

#[test]
fn test_allocator_sequences_keep_handles_consistent() {
    let mut alloc = EntityAllocator::new();
    let mut live: Vec<Entity> = Vec::new();
    let mut retired: Vec<Entity> = Vec::new();

    for step in 0..500u64 {
        if step % 3 == 2 && !live.is_empty() {
            let victim = live.remove((step as usize * 7) % live.len());
            assert!(alloc.deallocate(victim));
            assert!(!alloc.is_live(victim));
            retired.push(victim);
        } else {
            let entity = alloc.allocate();
            assert!(alloc.is_live(entity));
            live.push(entity);
        }
    }

    assert_eq!(alloc.live_count(), live.len());
    assert!(live.iter().all(|&e| alloc.is_live(e)));
    for &stale in &retired {
        assert!(!alloc.is_live(stale));
        assert!(!alloc.deallocate(stale));
    }

    let unique: HashSet<Entity> = live.iter().copied().collect();
    assert_eq!(unique.len(), live.len());
}

#[test]
fn test_reused_id_gets_new_generation() {
    let mut world = World::new();
    let first = world.create_entity();
    world.destroy_entity(first);

    let second = world.create_entity();
    assert_eq!(second.id(), first.id());
    assert!(second.generation() > first.generation());
    assert!(world.is_alive(second));
    assert!(!world.is_alive(first));
}

#[test]
fn test_remove_keeps_other_values() {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..50).map(|_| world.create_entity()).collect();
    for (i, &entity) in entities.iter().enumerate() {
        world.add_component(entity, Health(i as u32)).unwrap();
    }

    let mut survivors: Vec<(Entity, u32)> = entities
        .iter()
        .enumerate()
        .map(|(i, &e)| (e, i as u32))
        .collect();

    for victim_index in [0usize, 17, 48, 5, 30] {
        let victim = entities[victim_index];
        let before = world.store::<Health>().unwrap().len();
        assert_eq!(world.remove_component::<Health>(victim), Ok(true));
        assert!(!world.has_component::<Health>(victim));
        assert_eq!(world.store::<Health>().unwrap().len(), before - 1);

        survivors.retain(|&(e, _)| e != victim);
        for &(entity, value) in &survivors {
            assert_eq!(world.get_component::<Health>(entity).unwrap(), &Health(value));
        }
    }
}

#[test]
fn test_add_remove_add_round_trip() {
    let mut world = World::new();
    let entity = world.create_entity();

    world.add_component(entity, Label("first".into())).unwrap();
    assert_eq!(world.get_component::<Label>(entity).unwrap().0, "first");

    world.remove_component::<Label>(entity).unwrap();
    world.add_component(entity, Label("second".into())).unwrap();
    assert_eq!(world.get_component::<Label>(entity).unwrap().0, "second");
}

#[test]
fn test_clone_entity_copies_every_component() {
    let mut world = World::new();
    let source = world.create_entity();
    world.add_component(source, Health(100)).unwrap();
    world
        .add_component(source, Position { x: 0.0, y: 0.0, z: 0.0 })
        .unwrap();

    let clone = world.clone_entity(source).unwrap();
    assert_ne!(clone, source);
    assert_eq!(world.get_component::<Health>(clone).unwrap(), &Health(100));
    assert_eq!(
        world.get_component::<Position>(clone).unwrap(),
        &Position { x: 0.0, y: 0.0, z: 0.0 }
    );

    // The copies are independent.
    world.get_component_mut::<Health>(clone).unwrap().0 = 1;
    assert_eq!(world.get_component::<Health>(source).unwrap(), &Health(100));
}

#[test]
fn test_clone_of_stale_entity_fails() {
    let mut world = World::new();
    let source = world.create_entity();
    world.destroy_entity(source);
    assert_eq!(world.clone_entity(source), Err(EcsError::InvalidEntity(source)));
    assert_eq!(world.entity_count(), 0);
}

#[test]
fn test_components_of_enumerates_everything() {
    let mut world = World::new();
    let entity = world.create_entity();
    let other = world.create_entity();
    world.add_component(entity, Health(3)).unwrap();
    world.add_component(entity, Label("hero".into())).unwrap();
    world.add_component(other, Health(9)).unwrap();

    let components = world.components_of(entity).unwrap();
    assert_eq!(components.len(), 2);
    let health = components.iter().find_map(|c| c.downcast::<Health>());
    let label = components.iter().find_map(|c| c.downcast::<Label>());
    assert_eq!(health, Some(&Health(3)));
    assert_eq!(label, Some(&Label("hero".into())));

    world.destroy_entity(entity);
    assert_eq!(
        world.components_of(entity).unwrap_err(),
        EcsError::InvalidEntity(entity)
    );
}

#[test]
fn test_store_identity_is_stable() {
    let mut world = World::new();
    let first = world.store_mut::<Health>() as *const ComponentStore<Health>;
    let entity = world.create_entity();
    world.add_component(entity, Health(1)).unwrap();
    world.store_mut::<Position>();
    let second = world.store_mut::<Health>() as *const ComponentStore<Health>;
    assert!(std::ptr::eq(first, second));
}

#[test]
fn test_deferred_view_scenario() {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..3).map(|_| world.create_entity()).collect();
    for (&entity, value) in entities.iter().zip([10, 20, 30]) {
        world.add_component(entity, Health(value)).unwrap();
    }

    let mut view = world.deferred::<Health>();
    view[1] = Health(99);
    let target = view.entity_at(1).unwrap();
    assert_eq!(view.release(), Writeback { applied: 1, dropped: 0 });

    assert_eq!(world.get_component::<Health>(target).unwrap(), &Health(99));
    assert_eq!(world.get_component::<Health>(entities[0]).unwrap(), &Health(10));
    assert_eq!(world.get_component::<Health>(entities[2]).unwrap(), &Health(30));
}

#[test]
fn test_deferred_view_allows_destroying_while_iterating() {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..10).map(|_| world.create_entity()).collect();
    for (i, &entity) in entities.iter().enumerate() {
        world.add_component(entity, Health(i as u32 * 10)).unwrap();
    }

    let mut view = world.deferred::<Health>();
    let mut doomed = Vec::new();
    for i in 0..view.len() {
        if view[i].0 >= 50 {
            doomed.extend(view.entity_at(i));
        } else {
            view[i].0 += 1;
        }
    }
    for entity in doomed {
        assert!(view.world_mut().destroy_entity(entity));
    }
    assert_eq!(view.release(), Writeback { applied: 5, dropped: 0 });

    let store = world.store::<Health>().unwrap();
    assert_eq!(store.len(), 5);
    for (entity, health) in store.iter() {
        assert!(world.is_alive(entity));
        assert_eq!(health.0 % 10, 1);
    }
}

#[test]
fn test_worlds_on_separate_threads_share_id_space() {
    let source = IdSource::shared();
    let config = EcsConfig::default().with_prewarm_batch(8);
    let mut worlds: Vec<World> = (0..4)
        .map(|_| World::with_id_source(Arc::clone(&source), &config))
        .collect();

    let ids: Vec<Vec<Entity>> = std::thread::scope(|scope| {
        let handles: Vec<_> = worlds
            .iter_mut()
            .map(|world| {
                scope.spawn(move || {
                    (0..1000)
                        .map(|i| {
                            let entity = world.create_entity();
                            world.add_component(entity, Health(i)).unwrap();
                            entity
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let unique: HashSet<u64> = ids.iter().flatten().map(|e| e.id().raw()).collect();
    assert_eq!(unique.len(), 4000);
    assert_eq!(worlds[0].entity_count(), 1000);
}

#[test]
fn test_universe_default_world_and_isolation() {
    let mut universe = Universe::new();
    let sim = universe.create_world();

    let hero = universe.default_world_mut().create_entity();
    universe
        .default_world_mut()
        .add_component(hero, Health(10))
        .unwrap();

    let sim_world = universe.world_mut(sim).unwrap();
    assert_eq!(
        sim_world.add_component(hero, Health(1)),
        Err(EcsError::InvalidEntity(hero))
    );

    universe.clear_world(sim).unwrap();
    assert_eq!(
        universe.default_world().get_component::<Health>(hero).unwrap(),
        &Health(10)
    );
}
