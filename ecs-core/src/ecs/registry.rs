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
//! Store registry and multi-type set queries
//!
//! A [`StoreRegistry`] belongs to exactly one world. It assigns every
//! component type a small integer [`ComponentTag`] the first time the type is
//! seen and keeps that type's [`ComponentStore`] in a tag-indexed table until
//! the registry is cleared.
//!
//! The query operations combine stores by set intersection and difference:
//!
//! - [`entities_with`](StoreRegistry::entities_with) iterates the smallest
//!   store and checks membership in the others, so the cost is bounded by the rarest
//!   component rather than the most common one.
//! - [`entities_without`](StoreRegistry::entities_without) starts from every
//!   entity known to the world (the union of all store owners) and subtracts
//!   the owners of the excluded stores.

use crate::ecs::component::AnyStore;
use crate::ecs::{Component, ComponentStore, Entity};
use crate::error::{EcsError, EcsResult};
use log::debug;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};

/// Small integer identifying a component type within one registry
///
/// Tags are assigned in registration order starting at zero and are only
/// meaningful for the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTag(u32);

impl ComponentTag {
    /// Position of this tag in registration order
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A set of component types named at compile time
///
/// Implemented for tuples of one to eight [`Component`] types, e.g.
/// `(Position,)` or `(Position, Velocity)`.
pub trait ComponentSet: 'static {
    /// The `TypeId`s of the member types, in declaration order
    fn type_ids() -> Vec<TypeId>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$name>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

/// One component of an entity, as returned by
/// [`StoreRegistry::components_of`]
pub struct ComponentRef<'a> {
    /// Tag of the component's type in the owning registry
    pub tag: ComponentTag,
    /// Name of the component's type
    pub name: &'static str,
    /// The stored value
    pub value: &'a dyn Any,
}

impl<'a> ComponentRef<'a> {
    /// Downcast the value to a concrete component type
    pub fn downcast<T: Component>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }
}

impl std::fmt::Debug for ComponentRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRef")
            .field("tag", &self.tag)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// World-scoped cache of component stores
pub struct StoreRegistry {
    tags: HashMap<TypeId, ComponentTag>,
    stores: Vec<Box<dyn AnyStore>>,
    store_capacity: usize,
}

fn downcast<T: Component>(store: &dyn AnyStore) -> &ComponentStore<T> {
    match store.as_any().downcast_ref::<ComponentStore<T>>() {
        Some(store) => store,
        None => unreachable!("store registered for {} has the wrong type", T::name()),
    }
}

fn downcast_mut<T: Component>(store: &mut dyn AnyStore) -> &mut ComponentStore<T> {
    match store.as_any_mut().downcast_mut::<ComponentStore<T>>() {
        Some(store) => store,
        None => unreachable!("store registered for {} has the wrong type", T::name()),
    }
}

impl StoreRegistry {
    /// Create an empty registry whose stores start with `store_capacity` slots
    pub fn new(store_capacity: usize) -> Self {
        StoreRegistry {
            tags: HashMap::new(),
            stores: Vec::new(),
            store_capacity,
        }
    }

    /// Number of stores currently registered
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    /// Tag assigned to `T`, if its store exists
    pub fn tag_of<T: Component>(&self) -> Option<ComponentTag> {
        self.tags.get(&TypeId::of::<T>()).copied()
    }

    /// Return the store for `T`, creating it on first use
    ///
    /// Repeated calls return the same store instance until the registry is
    /// cleared.
    pub fn get_or_create_store<T: Component>(&mut self) -> &mut ComponentStore<T> {
        let tag = match self.tags.get(&TypeId::of::<T>()) {
            Some(&tag) => tag,
            None => self.register::<T>(),
        };
        downcast_mut::<T>(self.stores[tag.index()].as_mut())
    }

    fn register<T: Component>(&mut self) -> ComponentTag {
        let tag = ComponentTag(self.stores.len() as u32);
        self.stores
            .push(Box::new(ComponentStore::<T>::with_capacity(self.store_capacity)));
        self.tags.insert(TypeId::of::<T>(), tag);
        debug!("Registered {} store with tag {}", T::name(), tag.0);
        tag
    }

    /// The store for `T`, if it has been created
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        let store = self.erased(TypeId::of::<T>())?;
        Some(downcast::<T>(store))
    }

    /// Mutable access to the store for `T`, if it has been created
    pub fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        let tag = *self.tags.get(&TypeId::of::<T>())?;
        Some(downcast_mut::<T>(self.stores[tag.index()].as_mut()))
    }

    fn erased(&self, type_id: TypeId) -> Option<&dyn AnyStore> {
        let tag = self.tags.get(&type_id)?;
        self.stores.get(tag.index()).map(|store| store.as_ref())
    }

    /// Entities that have every component in `S`
    ///
    /// The result follows the packing order of the smallest store.
    pub fn entities_with<S: ComponentSet>(&self) -> Vec<Entity> {
        self.entities_with_ids(&S::type_ids())
    }

    /// Entities known to the world that have none of the components in `S`
    pub fn entities_without<S: ComponentSet>(&self) -> Vec<Entity> {
        self.entities_without_ids(&S::type_ids())
    }

    /// Intersection of the owners of every store named in `required`
    pub(crate) fn entities_with_ids(&self, required: &[TypeId]) -> Vec<Entity> {
        if required.is_empty() {
            return Vec::new();
        }

        let mut stores: Vec<&dyn AnyStore> = Vec::with_capacity(required.len());
        for &type_id in required {
            match self.erased(type_id) {
                Some(store) if store.len() > 0 => stores.push(store),
                _ => return Vec::new(),
            }
        }

        let Some((base_index, base)) = stores
            .iter()
            .enumerate()
            .min_by_key(|(_, store)| store.len())
            .map(|(i, store)| (i, *store))
        else {
            return Vec::new();
        };

        let mut working: HashSet<Entity> = base.owners().iter().copied().collect();
        for (i, store) in stores.iter().enumerate() {
            if i == base_index {
                continue;
            }
            working.retain(|&entity| store.contains(entity));
            if working.is_empty() {
                return Vec::new();
            }
        }

        base.owners()
            .iter()
            .copied()
            .filter(|entity| working.contains(entity))
            .collect()
    }

    /// All known entities minus the owners of every store in `excluded`
    pub(crate) fn entities_without_ids(&self, excluded: &[TypeId]) -> Vec<Entity> {
        let removed = self.owners_union(excluded);
        self.all_entities()
            .into_iter()
            .filter(|entity| !removed.contains(entity))
            .collect()
    }

    /// Intersection of `required`, minus the owners of `excluded`
    pub(crate) fn entities_matching_ids(
        &self,
        required: &[TypeId],
        excluded: &[TypeId],
    ) -> Vec<Entity> {
        let candidates = self.entities_with_ids(required);
        let excluded: Vec<&dyn AnyStore> = excluded
            .iter()
            .filter_map(|&type_id| self.erased(type_id))
            .collect();
        candidates
            .into_iter()
            .filter(|&entity| !excluded.iter().any(|store| store.contains(entity)))
            .collect()
    }

    fn owners_union(&self, type_ids: &[TypeId]) -> HashSet<Entity> {
        type_ids
            .iter()
            .filter_map(|&type_id| self.erased(type_id))
            .flat_map(|store| store.owners().iter().copied())
            .collect()
    }

    /// Every entity that has at least one component in this registry
    ///
    /// Entities appear once, in order of first appearance across stores.
    pub fn all_entities(&self) -> Vec<Entity> {
        let mut seen = HashSet::new();
        let mut entities = Vec::new();
        for store in &self.stores {
            for &entity in store.owners() {
                if seen.insert(entity) {
                    entities.push(entity);
                }
            }
        }
        entities
    }

    /// Remove `entity` from every store, returning how many components were
    /// removed
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        let mut removed = 0;
        for store in &mut self.stores {
            if store.remove_entity(entity) {
                removed += 1;
            }
        }
        removed
    }

    /// Tags of every component type `entity` currently has
    pub fn tags_of(&self, entity: Entity) -> Vec<ComponentTag> {
        self.tags
            .values()
            .copied()
            .filter(|tag| {
                self.stores
                    .get(tag.index())
                    .map_or(false, |store| store.contains(entity))
            })
            .collect()
    }

    /// Copy every component of `source` onto `target`, returning how many
    /// components were copied
    ///
    /// Fails with [`EcsError::DuplicateComponent`] if `target` already has one
    /// of the copied types, and with [`EcsError::MissingStore`] if the registry
    /// is internally inconsistent. Nothing is copied when either error is
    /// returned.
    pub fn clone_components(&mut self, source: Entity, target: Entity) -> EcsResult<usize> {
        let mut tags: Vec<ComponentTag> = self.tags.values().copied().collect();
        tags.sort_unstable();

        let mut pending = Vec::with_capacity(tags.len());
        for tag in tags {
            let store = self
                .stores
                .get(tag.index())
                .ok_or(EcsError::MissingStore { tag: tag.index() })?;
            if !store.contains(source) {
                continue;
            }
            if store.contains(target) {
                return Err(EcsError::DuplicateComponent {
                    entity: target,
                    component: store.component_name(),
                });
            }
            pending.push(tag.index());
        }

        for &index in &pending {
            self.stores[index].clone_component(source, target)?;
        }
        Ok(pending.len())
    }

    /// Every component currently stored for `entity`, in tag order
    pub fn components_of(&self, entity: Entity) -> Vec<ComponentRef<'_>> {
        self.stores
            .iter()
            .enumerate()
            .filter_map(|(index, store)| {
                store.value_of(entity).map(|value| ComponentRef {
                    tag: ComponentTag(index as u32),
                    name: store.component_name(),
                    value,
                })
            })
            .collect()
    }

    /// Drop every store and tag
    pub fn clear(&mut self) {
        debug!("Dropping {} component stores", self.stores.len());
        self.stores.clear();
        self.tags.clear();
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new(crate::config::EcsConfig::default().store_capacity)
    }
}
