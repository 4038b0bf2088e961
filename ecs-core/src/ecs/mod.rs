//! Entity Component System (ECS) core implementation
//!
//! This module provides the in-memory data engine:
//! - Generational entity handles and per-world allocation
//! - Dense, swap-remove component stores
//! - A per-world store registry with set-based multi-type queries
//! - An immutable query builder
//! - Deferred, batched mutation for iterate-while-mutating

mod allocator;
mod component;
mod deferred;
mod entity;
mod query;
mod registry;
mod universe;
mod world;

pub use allocator::{EntityAllocator, IdSource};
pub use component::{Component, ComponentKind, ComponentStore};
pub use deferred::{DeferredView, Writeback};
pub use entity::{Entity, EntityId};
pub use query::Query;
pub use registry::{ComponentRef, ComponentSet, ComponentTag, StoreRegistry};
pub use universe::{Universe, WorldId};
pub use world::World;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Position;
    impl Component for Position {}

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_entity_creation() {
        let mut world = World::new();
        let entity = world.create_entity();
        assert_eq!(world.entity_count(), 1);
        assert!(world.is_alive(entity));
    }

    #[test]
    fn test_world_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<World>();
        assert_send::<ComponentStore<Position>>();
    }
}
