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
//! Benchmarks for multi-type queries
//!
//! The intersection iterates the smallest store, so its cost should track the
//! rarest component rather than the world size. The `rare_*` cases keep one
//! store small while the other grows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ecs_core::ecs::{Component, World};

#[derive(Clone)]
struct Common(u32);
impl Component for Common {}

#[derive(Clone)]
struct Rare(u32);
impl Component for Rare {}

fn world_with(common: usize, rare_every: usize) -> World {
    let mut world = World::new();
    for i in 0..common {
        let entity = world.create_entity();
        world.add_component(entity, Common(i as u32)).unwrap();
        if i % rare_every == 0 {
            world.add_component(entity, Rare(i as u32)).unwrap();
        }
    }
    world
}

fn bench_entities_with(c: &mut Criterion) {
    let mut group = c.benchmark_group("entities_with");

    for entity_count in [1000, 10000, 100000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));
        group.bench_with_input(
            BenchmarkId::new("rare_1_in_100", entity_count),
            entity_count,
            |b, &count| {
                let world = world_with(count, 100);
                b.iter(|| black_box(world.entities_with::<(Common, Rare)>()));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("dense_1_in_2", entity_count),
            entity_count,
            |b, &count| {
                let world = world_with(count, 2);
                b.iter(|| black_box(world.entities_with::<(Common, Rare)>()));
            },
        );
    }

    group.finish();
}

fn bench_entities_without(c: &mut Criterion) {
    let mut group = c.benchmark_group("entities_without");

    for entity_count in [1000, 10000, 100000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(entity_count),
            entity_count,
            |b, &count| {
                let world = world_with(count, 10);
                b.iter(|| black_box(world.entities_without::<(Rare,)>()));
            },
        );
    }

    group.finish();
}

fn bench_deferred_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("deferred_update");

    for entity_count in [1000, 10000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(entity_count),
            entity_count,
            |b, &count| {
                let mut world = world_with(count, 1);
                b.iter(|| {
                    let mut view = world.deferred::<Common>();
                    view.for_each_mut(|_, value| value.0 = value.0.wrapping_add(1));
                    black_box(view.release());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_entities_with,
    bench_entities_without,
    bench_deferred_update
);
criterion_main!(benches);
