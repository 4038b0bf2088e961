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
//! Entity allocation
//!
//! Each world owns an [`EntityAllocator`] that issues, recycles and retires
//! handles. Fresh ids come from an [`IdSource`], which may be shared by many
//! worlds so that ids stay unique across all of them even when the worlds are
//! driven from different threads. Allocators built without an explicit source
//! share the process-wide [`IdSource::global`].

use crate::config::EcsConfig;
use crate::ecs::{Entity, EntityId};
use log::{debug, trace};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static GLOBAL_IDS: OnceLock<Arc<IdSource>> = OnceLock::new();

/// Monotonic counter handing out fresh entity ids
///
/// Reservation is a single atomic increment, so one source can back any
/// number of allocators on any number of threads.
#[derive(Debug, Default)]
pub struct IdSource {
    next: AtomicU64,
}

impl IdSource {
    /// Create a source starting at id 0
    pub fn new() -> Self {
        IdSource {
            next: AtomicU64::new(0),
        }
    }

    /// Create a source wrapped in an `Arc`, ready to be shared between worlds
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// The process-wide source behind every world that is not given one
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL_IDS.get_or_init(Self::shared))
    }

    /// Reserve `count` consecutive ids
    pub fn reserve(&self, count: u64) -> Range<u64> {
        let start = self.next.fetch_add(count, Ordering::Relaxed);
        start..start + count
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Per-world pool of entity handles
///
/// Retired ids go on a free stack and are handed out again with a bumped
/// generation. When the stack is empty the allocator draws from its pre-warmed
/// range and then from the shared [`IdSource`].
#[derive(Debug)]
pub struct EntityAllocator {
    source: Arc<IdSource>,
    slots: HashMap<EntityId, Slot>,
    free: Vec<EntityId>,
    reserved: Range<u64>,
    prewarm_batch: usize,
    warmed: bool,
    live: usize,
}

impl EntityAllocator {
    /// Create an allocator on the global id source with default capacities
    pub fn new() -> Self {
        Self::with_source(IdSource::global(), &EcsConfig::default())
    }

    /// Create an allocator drawing fresh ids from `source`
    pub fn with_source(source: Arc<IdSource>, config: &EcsConfig) -> Self {
        EntityAllocator {
            source,
            slots: HashMap::with_capacity(config.entity_capacity),
            free: Vec::with_capacity(config.entity_capacity),
            reserved: 0..0,
            prewarm_batch: config.prewarm_batch,
            warmed: false,
            live: 0,
        }
    }

    /// Issue a live handle
    pub fn allocate(&mut self) -> Entity {
        let id = match self.free.pop() {
            Some(id) => id,
            None => self.fresh_id(),
        };

        let slot = self.slots.entry(id).or_insert(Slot {
            generation: 0,
            alive: false,
        });
        debug_assert!(!slot.alive, "allocated id {} is already live", id);
        slot.alive = true;
        self.live += 1;

        Entity::new(id.raw(), slot.generation)
    }

    fn fresh_id(&mut self) -> EntityId {
        if self.reserved.is_empty() {
            let batch = if self.warmed { 1 } else { self.prewarm_batch.max(1) };
            self.warmed = true;
            self.reserved = self.source.reserve(batch as u64);
            trace!("Reserved entity ids {:?}", self.reserved);
        }
        // The range is non-empty here: it was either non-empty or just refilled.
        let raw = self.reserved.start;
        self.reserved.start += 1;
        EntityId::new(raw)
    }

    /// Retire a handle
    ///
    /// Returns `false` for the null handle and for handles that are stale,
    /// already retired or were never issued by this allocator.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_live(entity) {
            return false;
        }
        let id = entity.id();
        let Some(slot) = self.slots.get_mut(&id) else {
            return false;
        };
        slot.alive = false;
        self.live -= 1;

        match slot.generation.checked_add(1) {
            Some(next) => {
                slot.generation = next;
                self.free.push(id);
            }
            None => {
                // Reusing the id would wrap its generation and revive stale handles.
                debug!("Retiring {} permanently: generation exhausted", id);
            }
        }
        true
    }

    /// Check whether `entity` is the current live handle for its id
    pub fn is_live(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        self.slots
            .get(&entity.id())
            .map_or(false, |slot| slot.alive && slot.generation == entity.generation())
    }

    /// Number of live entities
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Number of retired ids waiting to be reused
    ///
    /// Ids reserved by pre-warming but never issued are not counted.
    pub fn available_count(&self) -> usize {
        self.free.len()
    }

    /// Number of pre-reserved ids not yet issued
    pub fn reserved_count(&self) -> usize {
        (self.reserved.end - self.reserved.start) as usize
    }

    /// Iterate over every live handle, in no particular order
    pub fn live_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.alive)
            .map(|(id, slot)| Entity::new(id.raw(), slot.generation))
    }

    /// Retire every live handle, returning how many were retired
    pub fn retire_all(&mut self) -> usize {
        let live: Vec<Entity> = self.live_entities().collect();
        live.into_iter().filter(|&e| self.deallocate(e)).count()
    }

    /// The id source this allocator draws fresh ids from
    pub fn source(&self) -> &Arc<IdSource> {
        &self.source
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_live() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        let e2 = alloc.allocate();

        assert_ne!(e1, e2);
        assert!(alloc.is_live(e1));
        assert!(alloc.is_live(e2));
        assert_eq!(alloc.live_count(), 2);
    }

    #[test]
    fn test_deallocate_bumps_generation_and_reuses_id() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();

        assert!(alloc.deallocate(e1));
        assert!(!alloc.is_live(e1));
        assert_eq!(alloc.available_count(), 1);

        let e2 = alloc.allocate();
        assert_eq!(e2.id(), e1.id());
        assert_eq!(e2.generation(), e1.generation() + 1);
        assert!(alloc.is_live(e2));
        assert!(!alloc.is_live(e1));
        assert_eq!(alloc.available_count(), 0);
    }

    #[test]
    fn test_deallocate_rejects_stale_and_foreign_handles() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();

        assert!(alloc.deallocate(e1));
        assert!(!alloc.deallocate(e1));
        assert!(!alloc.deallocate(Entity::NULL));
        assert!(!alloc.deallocate(Entity::new(9_999, 0)));
        assert_eq!(alloc.live_count(), 0);
    }

    #[test]
    fn test_freed_generation_is_not_live_before_reuse() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        alloc.deallocate(e1);

        let forged = Entity::new(e1.id().raw(), e1.generation() + 1);
        assert!(!alloc.is_live(forged));
    }

    #[test]
    fn test_prewarm_does_not_count_as_available() {
        let config = EcsConfig::default().with_prewarm_batch(16);
        let mut alloc = EntityAllocator::with_source(IdSource::shared(), &config);
        assert_eq!(alloc.available_count(), 0);

        alloc.allocate();
        assert_eq!(alloc.reserved_count(), 15);
        assert_eq!(alloc.available_count(), 0);
        assert_eq!(alloc.source().issued(), 16);
    }

    #[test]
    fn test_prewarm_disabled_draws_one_at_a_time() {
        let config = EcsConfig::default().with_prewarm_batch(0);
        let source = IdSource::shared();
        let mut alloc = EntityAllocator::with_source(Arc::clone(&source), &config);

        alloc.allocate();
        alloc.allocate();
        assert_eq!(source.issued(), 2);
        assert_eq!(alloc.reserved_count(), 0);
    }

    #[test]
    fn test_shared_source_keeps_ids_unique() {
        let source = IdSource::shared();
        let config = EcsConfig::default().with_prewarm_batch(4);
        let mut a = EntityAllocator::with_source(Arc::clone(&source), &config);
        let mut b = EntityAllocator::with_source(Arc::clone(&source), &config);

        let ids_a: Vec<_> = (0..10).map(|_| a.allocate().id()).collect();
        let ids_b: Vec<_> = (0..10).map(|_| b.allocate().id()).collect();
        for id in &ids_a {
            assert!(!ids_b.contains(id));
        }
    }

    #[test]
    fn test_exhausted_generation_retires_id() {
        let mut alloc = EntityAllocator::new();
        let first = alloc.allocate();
        alloc.slots.get_mut(&first.id()).unwrap().generation = u32::MAX;
        let last = Entity::new(first.id().raw(), u32::MAX);
        assert!(alloc.is_live(last));

        let available = alloc.available_count();
        assert!(alloc.deallocate(last));
        assert_eq!(alloc.available_count(), available);
        assert!(!alloc.is_live(last));

        for _ in 0..10 {
            let next = alloc.allocate();
            assert_ne!(next.id(), last.id());
            assert!(alloc.deallocate(next));
        }
        assert!(!alloc.is_live(last));
        assert!(!alloc.is_live(first));
        assert!(!alloc.deallocate(last));
    }

    #[test]
    fn test_retire_all() {
        let mut alloc = EntityAllocator::new();
        let handles: Vec<_> = (0..5).map(|_| alloc.allocate()).collect();

        assert_eq!(alloc.retire_all(), 5);
        assert_eq!(alloc.live_count(), 0);
        assert_eq!(alloc.available_count(), 5);
        assert!(handles.iter().all(|&e| !alloc.is_live(e)));
    }

    #[test]
    fn test_rapid_allocate_deallocate_cycles() {
        let mut alloc = EntityAllocator::new();
        let mut previous = alloc.allocate();
        for _ in 0..100 {
            assert!(alloc.deallocate(previous));
            let next = alloc.allocate();
            assert_eq!(next.id(), previous.id());
            assert!(next.generation() > previous.generation());
            previous = next;
        }
        assert_eq!(alloc.live_count(), 1);
    }
}
