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
//! # ECS Core
//!
//! The in-memory data engine of an Entity Component System: it stores
//! per-entity component data, keeps entity handles valid across id reuse, and
//! answers "which entities have this combination of component types" queries.
//!
//! ## Features
//!
//! - **Generational handles**: stale entity handles are detected, never aliased
//! - **Dense stores**: O(1) add, remove and lookup with swap-remove packing
//! - **Isolated worlds**: each world owns its stores; a universe multiplexes many
//! - **Set queries**: smallest-first intersection and set-difference filters
//! - **Deferred mutation**: mutate values while iterating, written back on release
//! - **Parallelization**: optional Rayon integration for deferred bulk updates
//!
//! ## Example
//!
//! ```rust
//! use ecs_core::ecs::{Component, World};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Position(f32, f32);
//! impl Component for Position {}
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Velocity(f32, f32);
//! impl Component for Velocity {}
//!
//! let mut world = World::new();
//! let entity = world.create_entity();
//! world.add_component(entity, Position(0.0, 0.0)).unwrap();
//! world.add_component(entity, Velocity(1.0, 0.0)).unwrap();
//!
//! let moving = world.query().with::<Position>().with::<Velocity>().execute(&world);
//! assert_eq!(moving, vec![entity]);
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// Error types
pub mod error;

/// Capacity configuration
pub mod config;

pub use config::EcsConfig;
pub use ecs::{Component, Entity, Query, Universe, World, WorldId};
pub use error::{EcsError, EcsResult};
