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
//! World management
//!
//! The World is the central container for all ECS data: it owns the entity
//! allocator and the store registry, validates handles before touching
//! component data, and exposes the query interfaces.

use crate::config::EcsConfig;
use crate::ecs::{
    Component, ComponentRef, ComponentSet, ComponentStore, DeferredView, Entity,
    EntityAllocator, IdSource, Query, StoreRegistry,
};
use crate::error::{EcsError, EcsResult};
use std::sync::Arc;

/// The main ECS world container
///
/// A world is an isolated simulation context with its own entities and
/// component stores. Access to one world must come from one thread at a time;
/// different worlds may be driven from different threads, and worlds sharing
/// an [`IdSource`] never hand out the same entity id.
pub struct World {
    allocator: EntityAllocator,
    registry: StoreRegistry,
}

impl World {
    /// Create a new empty world with default capacities
    pub fn new() -> Self {
        Self::with_config(&EcsConfig::default())
    }

    /// Create a new empty world on the global id source
    pub fn with_config(config: &EcsConfig) -> Self {
        Self::with_id_source(IdSource::global(), config)
    }

    /// Create a new empty world drawing entity ids from `source`
    pub fn with_id_source(source: Arc<IdSource>, config: &EcsConfig) -> Self {
        World {
            allocator: EntityAllocator::with_source(source, config),
            registry: StoreRegistry::new(config.store_capacity),
        }
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        self.allocator.allocate()
    }

    /// Destroy an entity
    ///
    /// Every component is removed first, then the handle is retired so that
    /// copies of it become stale. Returns `false` if the handle was not live.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_live(entity) {
            return false;
        }
        self.registry.remove_entity(entity);
        self.allocator.deallocate(entity)
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_live(entity)
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.allocator.live_count()
    }

    /// The world's entity allocator
    pub fn allocator(&self) -> &EntityAllocator {
        &self.allocator
    }

    /// The world's store registry
    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut StoreRegistry {
        &mut self.registry
    }

    fn ensure_live(&self, entity: Entity) -> EcsResult<()> {
        if self.allocator.is_live(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity(entity))
        }
    }

    /// Attach `value` to a live entity
    ///
    /// Fails with [`EcsError::InvalidEntity`] for a handle that is not live and
    /// with [`EcsError::DuplicateComponent`] if the entity already has a `T`.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> EcsResult<()> {
        self.ensure_live(entity)?;
        self.registry.get_or_create_store::<T>().add(entity, value)
    }

    /// Detach the `T` component of a live entity
    ///
    /// Returns `Ok(false)` if the entity had no `T`.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> EcsResult<bool> {
        self.ensure_live(entity)?;
        Ok(self
            .registry
            .store_mut::<T>()
            .map_or(false, |store| store.remove(entity)))
    }

    /// Get the `T` component of a live entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        self.ensure_live(entity)?;
        self.try_get_component::<T>(entity).ok_or(EcsError::ComponentNotFound {
            entity,
            component: T::name(),
        })
    }

    /// Get the `T` component of an entity, or `None` if it has none
    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.registry.store::<T>()?.try_get(entity)
    }

    /// Get a mutable reference to the `T` component of a live entity
    ///
    /// The reference points into the store's dense array and is released
    /// before any other structural change can happen.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.ensure_live(entity)?;
        match self.registry.store_mut::<T>() {
            Some(store) => store.get_mut(entity),
            None => Err(EcsError::ComponentNotFound {
                entity,
                component: T::name(),
            }),
        }
    }

    /// Check if an entity has a `T` component
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.registry
            .store::<T>()
            .map_or(false, |store| store.contains(entity))
    }

    /// The store for `T`, if any entity has ever been given a `T`
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.registry.store::<T>()
    }

    /// The store for `T`, created on first use
    pub fn store_mut<T: Component>(&mut self) -> &mut ComponentStore<T> {
        self.registry.get_or_create_store::<T>()
    }

    /// Entities that have every component in `S`
    pub fn entities_with<S: ComponentSet>(&self) -> Vec<Entity> {
        self.registry.entities_with::<S>()
    }

    /// Entities that have at least one component but none of those in `S`
    pub fn entities_without<S: ComponentSet>(&self) -> Vec<Entity> {
        self.registry.entities_without::<S>()
    }

    /// Every entity that has at least one component
    pub fn all_entities(&self) -> Vec<Entity> {
        self.registry.all_entities()
    }

    /// Start building a query against this world
    pub fn query(&self) -> Query {
        Query::new()
    }

    /// Create a new entity carrying a copy of every component of `source`
    pub fn clone_entity(&mut self, source: Entity) -> EcsResult<Entity> {
        self.ensure_live(source)?;
        let target = self.allocator.allocate();
        if let Err(err) = self.registry.clone_components(source, target) {
            self.registry.remove_entity(target);
            self.allocator.deallocate(target);
            return Err(err);
        }
        Ok(target)
    }

    /// Every component currently attached to a live entity
    pub fn components_of(&self, entity: Entity) -> EcsResult<Vec<ComponentRef<'_>>> {
        self.ensure_live(entity)?;
        Ok(self.registry.components_of(entity))
    }

    /// Open a deferred mutation view over the `T` store
    pub fn deferred<T: Component>(&mut self) -> DeferredView<'_, T> {
        DeferredView::new(self)
    }

    /// Drop every component store, keeping entities alive
    pub fn clear_stores(&mut self) {
        self.registry.clear();
    }

    /// Drop every component store and retire every entity
    pub fn clear(&mut self) {
        self.registry.clear();
        self.allocator.retire_all();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
