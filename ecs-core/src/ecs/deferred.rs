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
//! Deferred mutation over a component store
//!
//! A [`DeferredView`] copies a store's values once and hands out mutable
//! access to the copy. Touched slots are written back when the view is
//! released, which lets a caller mutate values while iterating and still
//! make structural changes to the world (through [`DeferredView::world_mut`])
//! without corrupting the store's packing.
//!
//! # Write-back rules
//!
//! On release, touched indices are written back in ascending order. A write
//! is dropped, not reported as an error, when:
//!
//! - the index is past the end of the live store (it shrank), or
//! - the slot is now owned by a different entity than the one the value was
//!   copied from (a swap-remove moved another entity into it).
//!
//! Dropped writes are counted in the returned [`Writeback`] and logged at
//! `warn` level.

use crate::ecs::{Component, Entity, World};
use log::warn;
use std::collections::HashSet;
use std::ops::{Index, IndexMut};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of releasing a [`DeferredView`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Writeback {
    /// Touched values written into the live store
    pub applied: usize,
    /// Touched values discarded because their slot no longer matched
    pub dropped: usize,
}

/// Snapshot-and-write-back view over the values of one component store
///
/// # Example
///
/// ```
/// use ecs_core::ecs::{Component, World};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Score(u32);
/// impl Component for Score {}
///
/// let mut world = World::new();
/// let entity = world.create_entity();
/// world.add_component(entity, Score(1)).unwrap();
///
/// let mut view = world.deferred::<Score>();
/// for i in 0..view.len() {
///     view[i].0 += 10;
/// }
/// let report = view.release();
/// assert_eq!(report.applied, 1);
/// assert_eq!(world.get_component::<Score>(entity).unwrap(), &Score(11));
/// ```
pub struct DeferredView<'w, T: Component> {
    world: &'w mut World,
    copy: Vec<T>,
    copied_owners: Vec<Entity>,
    touched: HashSet<usize>,
    released: bool,
}

impl<'w, T: Component> DeferredView<'w, T> {
    pub(crate) fn new(world: &'w mut World) -> Self {
        let (copy, copied_owners) = match world.store::<T>() {
            Some(store) => (store.values().to_vec(), store.owners().to_vec()),
            None => (Vec::new(), Vec::new()),
        };
        DeferredView {
            world,
            copy,
            copied_owners,
            touched: HashSet::new(),
            released: false,
        }
    }

    /// Number of values in the snapshot
    pub fn len(&self) -> usize {
        self.copy.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.copy.is_empty()
    }

    /// Read the copied value at `index` without marking it touched
    pub fn get(&self, index: usize) -> Option<&T> {
        self.copy.get(index)
    }

    /// Mutable access to the copied value at `index`, marking it touched
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let value = self.copy.get_mut(index)?;
        self.touched.insert(index);
        Some(value)
    }

    /// Entity currently owning slot `index` in the live store
    pub fn entity_at(&self, index: usize) -> Option<Entity> {
        self.world.store::<T>().and_then(|store| store.entity_at(index))
    }

    /// Number of distinct indices touched so far
    pub fn touched_count(&self) -> usize {
        self.touched.len()
    }

    /// Apply `f` to every copied value together with the entity it was copied
    /// from, marking every index touched
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(Entity, &mut T),
    {
        for (value, &entity) in self.copy.iter_mut().zip(self.copied_owners.iter()) {
            f(entity, value);
        }
        self.touched.extend(0..self.copy.len());
    }

    /// Parallel version of [`for_each_mut`](Self::for_each_mut) on the rayon pool
    #[cfg(feature = "parallel")]
    pub fn par_for_each_mut<F>(&mut self, f: F)
    where
        F: Fn(Entity, &mut T) + Send + Sync,
    {
        self.copy
            .par_iter_mut()
            .zip(self.copied_owners.par_iter())
            .for_each(|(value, &entity)| f(entity, value));
        self.touched.extend(0..self.copy.len());
    }

    /// Shared access to the world while the view is open
    pub fn world(&self) -> &World {
        &*self.world
    }

    /// Mutable access to the world while the view is open
    ///
    /// Structural changes made here are safe: the view only touches the live
    /// store on release, and then only slots that still match.
    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    /// Write every touched value back into the live store
    pub fn release(mut self) -> Writeback {
        self.flush()
    }

    fn flush(&mut self) -> Writeback {
        if self.released {
            return Writeback::default();
        }
        self.released = true;

        let mut indices: Vec<usize> = self.touched.drain().collect();
        indices.sort_unstable();

        let copy = std::mem::take(&mut self.copy);
        let mut report = Writeback::default();
        let Some(store) = self.world.registry_mut().store_mut::<T>() else {
            report.dropped = indices.len();
            return report;
        };
        for index in indices {
            let in_bounds = index < copy.len() && index < store.len();
            if in_bounds && store.entity_at(index) == self.copied_owners.get(index).copied() {
                store.set_at(index, copy[index].clone());
                report.applied += 1;
            } else {
                report.dropped += 1;
            }
        }

        if report.dropped > 0 {
            warn!(
                "Dropped {} deferred {} writes: store changed while the view was open",
                report.dropped,
                T::name()
            );
        }
        report
    }
}

impl<T: Component> Index<usize> for DeferredView<'_, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.copy[index]
    }
}

impl<T: Component> IndexMut<usize> for DeferredView<'_, T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.touched.insert(index);
        &mut self.copy[index]
    }
}

impl<T: Component> Drop for DeferredView<'_, T> {
    fn drop(&mut self) {
        self.flush();
    }
}
