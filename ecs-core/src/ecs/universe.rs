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
//! Multiple isolated worlds
//!
//! A [`Universe`] owns any number of worlds, addressed by [`WorldId`]. All
//! of its worlds draw entity ids from one shared [`IdSource`], so an entity
//! id is never issued twice across the whole universe. One world, addressed
//! by [`WorldId::DEFAULT`], always exists and serves callers that do not name
//! a world.

use crate::config::EcsConfig;
use crate::ecs::{IdSource, World};
use crate::error::{EcsError, EcsResult};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque identifier of a world within a [`Universe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorldId(u32);

impl WorldId {
    /// The world that always exists
    pub const DEFAULT: WorldId = WorldId(0);
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "World({})", self.0)
    }
}

/// Collection of isolated worlds sharing the global entity id source
pub struct Universe {
    worlds: HashMap<WorldId, World>,
    ids: Arc<IdSource>,
    config: EcsConfig,
    next_world: u32,
}

impl Universe {
    /// Create a universe containing only the default world
    pub fn new() -> Self {
        Self::with_config(EcsConfig::default())
    }

    /// Create a universe whose worlds use `config`
    pub fn with_config(config: EcsConfig) -> Self {
        let ids = IdSource::global();
        let mut worlds = HashMap::new();
        worlds.insert(
            WorldId::DEFAULT,
            World::with_id_source(Arc::clone(&ids), &config),
        );
        Universe {
            worlds,
            ids,
            config,
            next_world: 1,
        }
    }

    /// Create a new empty world and return its id
    pub fn create_world(&mut self) -> WorldId {
        let id = WorldId(self.next_world);
        self.next_world += 1;
        self.worlds
            .insert(id, World::with_id_source(Arc::clone(&self.ids), &self.config));
        debug!("Created {}", id);
        id
    }

    /// Destroy a world and everything in it
    ///
    /// Returns `false` for unknown ids and for [`WorldId::DEFAULT`], which can
    /// only be cleared.
    pub fn destroy_world(&mut self, id: WorldId) -> bool {
        if id == WorldId::DEFAULT {
            return false;
        }
        let removed = self.worlds.remove(&id).is_some();
        if removed {
            debug!("Destroyed {}", id);
        }
        removed
    }

    /// Drop every component store of one world, leaving other worlds intact
    pub fn clear_world(&mut self, id: WorldId) -> EcsResult<()> {
        self.world_mut(id)?.clear_stores();
        debug!("Cleared {}", id);
        Ok(())
    }

    /// Shared access to a world
    pub fn world(&self, id: WorldId) -> EcsResult<&World> {
        self.worlds.get(&id).ok_or(EcsError::UnknownWorld(id))
    }

    /// Mutable access to a world
    pub fn world_mut(&mut self, id: WorldId) -> EcsResult<&mut World> {
        self.worlds.get_mut(&id).ok_or(EcsError::UnknownWorld(id))
    }

    /// The default world
    pub fn default_world(&self) -> &World {
        &self.worlds[&WorldId::DEFAULT]
    }

    /// Mutable access to the default world
    pub fn default_world_mut(&mut self) -> &mut World {
        self.worlds
            .entry(WorldId::DEFAULT)
            .or_insert_with(|| World::with_id_source(Arc::clone(&self.ids), &self.config))
    }

    /// Ids of every world, in ascending order
    pub fn world_ids(&self) -> Vec<WorldId> {
        let mut ids: Vec<WorldId> = self.worlds.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of worlds, including the default one
    pub fn world_count(&self) -> usize {
        self.worlds.len()
    }

    /// The id source shared by every world in this universe
    pub fn id_source(&self) -> &Arc<IdSource> {
        &self.ids
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}
