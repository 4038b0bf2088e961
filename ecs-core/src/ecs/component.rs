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
//! Component storage
//!
//! Components are plain data attached to entities. Each component type gets
//! one [`ComponentStore`] per world: a dense array of values, a parallel array
//! of owning entities, and a reverse index from entity to slot.
//!
//! # Aliasing
//!
//! Removal swaps the last slot into the hole, so slot positions are not
//! stable. A reference obtained from [`ComponentStore::get_mut`] or the
//! slices returned by [`ComponentStore::values_mut`] are only valid until the
//! next `add` or `remove` on the same store; the borrow checker enforces this
//! for safe code. Use a [`DeferredView`](crate::ecs::DeferredView) to mutate
//! values while other code changes the store's structure.

use crate::ecs::Entity;
use crate::error::{EcsError, EcsResult};
use log::trace;
use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};

/// Trait that all components must implement
///
/// Components should be plain data structures without behavior. They must
/// be `Clone` so that entities can be cloned and values can be copied into a
/// deferred view.
pub trait Component: Clone + Send + Sync + 'static {
    /// Human-readable name used in errors and introspection
    fn name() -> &'static str {
        type_name::<Self>()
    }
}

/// Runtime identity of a component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKind {
    id: TypeId,
    name: &'static str,
}

impl ComponentKind {
    /// Identity of component type `T`
    pub fn of<T: Component>() -> Self {
        ComponentKind {
            id: TypeId::of::<T>(),
            name: T::name(),
        }
    }

    /// The `TypeId` of the component
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The component's name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Dense storage for every instance of one component type in one world
///
/// `values`, `owners` and `entity_to_slot` always describe the same set of
/// entities: for every slot `i`, `entity_to_slot[owners[i]] == i`.
///
/// # Example
///
/// ```
/// use ecs_core::ecs::{Component, ComponentStore, Entity};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Health(u32);
/// impl Component for Health {}
///
/// let mut store = ComponentStore::<Health>::new();
/// let entity = Entity::new(1, 0);
///
/// store.add(entity, Health(100)).unwrap();
/// assert_eq!(store.get(entity).unwrap(), &Health(100));
/// assert!(store.remove(entity));
/// assert!(!store.contains(entity));
/// ```
pub struct ComponentStore<T: Component> {
    /// Mapping from Entity to dense array index
    entity_to_slot: HashMap<Entity, usize>,
    /// Mapping from dense array index back to Entity (for swap_remove)
    owners: Vec<Entity>,
    /// The component data stored densely
    values: Vec<T>,
}

impl<T: Component> ComponentStore<T> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new store with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        ComponentStore {
            entity_to_slot: HashMap::with_capacity(capacity),
            owners: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of components stored
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of slots available before the dense arrays reallocate
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Reserve space for at least `additional` more components
    pub fn reserve(&mut self, additional: usize) {
        self.entity_to_slot.reserve(additional);
        self.owners.reserve(additional);
        self.values.reserve(additional);
    }

    /// Attach a component to `entity`
    ///
    /// Fails with [`EcsError::DuplicateComponent`] if the entity already
    /// occupies a slot. Amortized O(1).
    pub fn add(&mut self, entity: Entity, value: T) -> EcsResult<()> {
        if self.entity_to_slot.contains_key(&entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: T::name(),
            });
        }

        let slot = self.values.len();
        if slot == self.values.capacity() {
            trace!(
                "Growing {} store beyond {} slots",
                T::name(),
                self.values.capacity()
            );
        }
        self.values.push(value);
        self.owners.push(entity);
        self.entity_to_slot.insert(entity, slot);

        self.debug_check_lengths();
        Ok(())
    }

    /// Detach and return the component of `entity`, if any
    ///
    /// The last slot is swapped into the vacated position, so slot order
    /// is not preserved. O(1).
    pub fn take(&mut self, entity: Entity) -> Option<T> {
        let slot = self.entity_to_slot.remove(&entity)?;
        let last = self.values.len() - 1;
        if slot != last {
            let moved = self.owners[last];
            self.entity_to_slot.insert(moved, slot);
        }
        self.owners.swap_remove(slot);
        let value = self.values.swap_remove(slot);

        self.debug_check_lengths();
        debug_assert!(
            slot >= self.owners.len() || self.entity_to_slot.get(&self.owners[slot]) == Some(&slot),
            "reverse index out of sync after removing {}",
            entity
        );
        Some(value)
    }

    /// Detach the component of `entity`
    ///
    /// Returns `false` if the entity had no component in this store.
    pub fn remove(&mut self, entity: Entity) -> bool {
        self.take(entity).is_some()
    }

    /// Check if an entity has a component in this store
    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_to_slot.contains_key(&entity)
    }

    /// Get the component of `entity`
    pub fn get(&self, entity: Entity) -> EcsResult<&T> {
        self.try_get(entity).ok_or(EcsError::ComponentNotFound {
            entity,
            component: T::name(),
        })
    }

    /// Get the component of `entity`, or `None` if it has none
    pub fn try_get(&self, entity: Entity) -> Option<&T> {
        let slot = *self.entity_to_slot.get(&entity)?;
        Some(&self.values[slot])
    }

    /// Get a mutable reference to the component of `entity`
    ///
    /// The reference points directly into the dense array.
    pub fn get_mut(&mut self, entity: Entity) -> EcsResult<&mut T> {
        match self.entity_to_slot.get(&entity) {
            Some(&slot) => Ok(&mut self.values[slot]),
            None => Err(EcsError::ComponentNotFound {
                entity,
                component: T::name(),
            }),
        }
    }

    /// Get the slot index for an entity, if it exists
    pub fn slot_of(&self, entity: Entity) -> Option<usize> {
        self.entity_to_slot.get(&entity).copied()
    }

    /// Owner of the slot at `index`
    pub fn entity_at(&self, index: usize) -> Option<Entity> {
        self.owners.get(index).copied()
    }

    /// Overwrite the value stored at slot `index`
    ///
    /// Returns `false` if the index is out of bounds.
    pub fn set_at(&mut self, index: usize, value: T) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The dense value array
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The dense value array, for bulk in-place updates
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Owning entities, in the same order as [`values`](Self::values)
    pub fn owners(&self) -> &[Entity] {
        &self.owners
    }

    /// Owning entities collected into a set
    pub fn owners_set(&self) -> HashSet<Entity> {
        self.owners.iter().copied().collect()
    }

    /// Iterate over `(entity, value)` pairs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.owners.iter().copied().zip(self.values.iter())
    }

    /// Remove all components
    pub fn clear(&mut self) {
        self.entity_to_slot.clear();
        self.owners.clear();
        self.values.clear();
    }

    fn debug_check_lengths(&self) {
        debug_assert_eq!(self.entity_to_slot.len(), self.owners.len());
        debug_assert_eq!(self.owners.len(), self.values.len());
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased face of a [`ComponentStore`] used by the registry
pub(crate) trait AnyStore: Send + Sync {
    fn component_name(&self) -> &'static str;
    fn len(&self) -> usize;
    fn contains(&self, entity: Entity) -> bool;
    fn owners(&self) -> &[Entity];
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn clone_component(&mut self, source: Entity, target: Entity) -> EcsResult<()>;
    fn value_of(&self, entity: Entity) -> Option<&dyn Any>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyStore for ComponentStore<T> {
    fn component_name(&self) -> &'static str {
        T::name()
    }

    fn len(&self) -> usize {
        ComponentStore::len(self)
    }

    fn contains(&self, entity: Entity) -> bool {
        ComponentStore::contains(self, entity)
    }

    fn owners(&self) -> &[Entity] {
        ComponentStore::owners(self)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity)
    }

    fn clone_component(&mut self, source: Entity, target: Entity) -> EcsResult<()> {
        let value = self.get(source)?.clone();
        self.add(target, value)
    }

    fn value_of(&self, entity: Entity) -> Option<&dyn Any> {
        self.try_get(entity).map(|value| value as &dyn Any)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
