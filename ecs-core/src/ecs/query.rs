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
//! Query builder
//!
//! A [`Query`] names the component types an entity must have and the ones it
//! must not have. Builders are immutable: [`Query::with`] and
//! [`Query::without`] return a new query, so a partially built query can be
//! kept as a template and extended in several directions.
//!
//! # Examples
//!
//! ```
//! use ecs_core::ecs::{Component, Query, World};
//!
//! #[derive(Clone)]
//! struct Position(f32);
//! impl Component for Position {}
//!
//! #[derive(Clone)]
//! struct Frozen;
//! impl Component for Frozen {}
//!
//! let mut world = World::new();
//! let moving = world.create_entity();
//! let frozen = world.create_entity();
//! world.add_component(moving, Position(0.0)).unwrap();
//! world.add_component(frozen, Position(1.0)).unwrap();
//! world.add_component(frozen, Frozen).unwrap();
//!
//! let positioned = Query::new().with::<Position>();
//! assert_eq!(positioned.without::<Frozen>().execute(&world), vec![moving]);
//! assert_eq!(positioned.execute(&world).len(), 2);
//! ```

use crate::ecs::{Component, ComponentKind, Entity, World};
use std::any::TypeId;

/// Immutable description of the required and excluded component types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    required: Vec<ComponentKind>,
    excluded: Vec<ComponentKind>,
}

impl Query {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// A new query that additionally requires component `T`
    pub fn with<T: Component>(&self) -> Query {
        let mut next = self.clone();
        push_unique(&mut next.required, ComponentKind::of::<T>());
        next
    }

    /// A new query that additionally excludes component `T`
    pub fn without<T: Component>(&self) -> Query {
        let mut next = self.clone();
        push_unique(&mut next.excluded, ComponentKind::of::<T>());
        next
    }

    /// Required component types, in the order they were added
    pub fn required(&self) -> &[ComponentKind] {
        &self.required
    }

    /// Excluded component types, in the order they were added
    pub fn excluded(&self) -> &[ComponentKind] {
        &self.excluded
    }

    /// Whether the query names no component types at all
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.excluded.is_empty()
    }

    /// Whether no type is both required and excluded
    pub fn is_well_formed(&self) -> bool {
        !self.required.iter().any(|kind| self.excluded.contains(kind))
    }

    /// Resolve the query against `world`
    ///
    /// An empty query returns no entities rather than every entity. A query
    /// that requires and excludes the same type is a caller error; in release
    /// builds the exclusion wins and nothing matches.
    pub fn execute(&self, world: &World) -> Vec<Entity> {
        debug_assert!(
            self.is_well_formed(),
            "query both requires and excludes the same component type"
        );

        let required = type_ids(&self.required);
        let excluded = type_ids(&self.excluded);
        let registry = world.registry();

        match (required.is_empty(), excluded.is_empty()) {
            (true, true) => Vec::new(),
            (false, true) => registry.entities_with_ids(&required),
            (true, false) => registry.entities_without_ids(&excluded),
            (false, false) => registry.entities_matching_ids(&required, &excluded),
        }
    }
}

fn push_unique(kinds: &mut Vec<ComponentKind>, kind: ComponentKind) {
    if !kinds.contains(&kind) {
        kinds.push(kind);
    }
}

fn type_ids(kinds: &[ComponentKind]) -> Vec<TypeId> {
    kinds.iter().map(ComponentKind::type_id).collect()
}
