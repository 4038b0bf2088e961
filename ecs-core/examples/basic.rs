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
//! Basic example demonstrating the ECS core
//!
//! This example creates a world, attaches components, runs a few queries and
//! applies a deferred update while destroying entities mid-iteration.
//!
//! Run with `RUST_LOG=debug` to see store and world lifecycle logging.

use ecs_core::ecs::{Component, World};
use ecs_core::{EcsConfig, Universe};

#[derive(Debug, Clone, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

impl Component for Position {}

#[derive(Debug, Clone, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}

impl Component for Velocity {}

#[derive(Debug, Clone, PartialEq)]
struct Health(i32);

impl Component for Health {}

fn integrate(world: &mut World, dt: f32) {
    let moving = world.query().with::<Position>().with::<Velocity>().execute(world);
    for entity in moving {
        let velocity = match world.get_component::<Velocity>(entity) {
            Ok(v) => v.clone(),
            Err(err) => {
                eprintln!("  skipping {}: {}", entity, err);
                continue;
            }
        };
        if let Ok(position) = world.get_component_mut::<Position>(entity) {
            position.x += velocity.dx * dt;
            position.y += velocity.dy * dt;
        }
    }
}

fn main() {
    env_logger::init();

    println!("ECS Core - Basic Example");
    println!("========================\n");

    let mut universe = Universe::with_config(EcsConfig::from_env());
    let world = universe.default_world_mut();

    let entities: Vec<_> = (0..5).map(|_| world.create_entity()).collect();
    for (i, &entity) in entities.iter().enumerate() {
        world
            .add_component(entity, Position { x: i as f32, y: 0.0 })
            .expect("entity is live");
        world
            .add_component(entity, Health(20 * i as i32))
            .expect("entity is live");
        if i % 2 == 0 {
            world
                .add_component(entity, Velocity { dx: 1.0, dy: 0.5 })
                .expect("entity is live");
        }
    }
    println!("Created {} entities", world.entity_count());

    integrate(world, 0.5);
    for entity in world.entities_with::<(Position, Velocity)>() {
        println!("  {} moved to {:?}", entity, world.get_component::<Position>(entity));
    }

    let stationary = world.entities_without::<(Velocity,)>();
    println!("Stationary entities: {:?}", stationary);

    // Damage everyone, destroying whoever drops to zero.
    let mut view = world.deferred::<Health>();
    let mut fallen = Vec::new();
    for i in 0..view.len() {
        view[i].0 -= 25;
        if view[i].0 <= 0 {
            fallen.extend(view.entity_at(i));
        }
    }
    for entity in fallen {
        view.world_mut().destroy_entity(entity);
    }
    let report = view.release();
    println!(
        "Deferred update: {} writes applied, {} dropped",
        report.applied, report.dropped
    );
    println!("Survivors: {}", world.entity_count());

    if let Some(&survivor) = world.entities_with::<(Health,)>().first() {
        let twin = world.clone_entity(survivor).expect("survivor is live");
        for component in world.components_of(twin).expect("clone is live") {
            println!("  clone {} has {}", twin, component.name);
        }
    }
}
