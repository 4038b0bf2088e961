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
//! Tunable capacities for worlds and component stores
//!
//! These values only affect performance. No observable behavior of the
//! ECS depends on them.

use log::warn;

/// Environment variable overriding [`EcsConfig::entity_capacity`]
pub const ENTITY_CAPACITY_VAR: &str = "ECS_ENTITY_CAPACITY";
/// Environment variable overriding [`EcsConfig::store_capacity`]
pub const STORE_CAPACITY_VAR: &str = "ECS_STORE_CAPACITY";
/// Environment variable overriding [`EcsConfig::prewarm_batch`]
pub const PREWARM_BATCH_VAR: &str = "ECS_PREWARM_BATCH";

/// Configuration for entity allocation and component storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcsConfig {
    /// Initial capacity of the allocator's generation table and free stack
    pub entity_capacity: usize,
    /// Initial capacity of every newly created component store
    pub store_capacity: usize,
    /// Number of ids reserved from the shared id source on first allocation
    ///
    /// Zero disables pre-warming.
    pub prewarm_batch: usize,
}

impl Default for EcsConfig {
    fn default() -> Self {
        EcsConfig {
            entity_capacity: 64,
            store_capacity: 64,
            prewarm_batch: 32,
        }
    }
}

impl EcsConfig {
    /// Create a configuration with custom entity and store capacities
    pub fn new(entity_capacity: usize, store_capacity: usize) -> Self {
        EcsConfig {
            entity_capacity,
            store_capacity,
            ..EcsConfig::default()
        }
    }

    /// Set the initial entity capacity
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Set the initial capacity of new component stores
    pub fn with_store_capacity(mut self, capacity: usize) -> Self {
        self.store_capacity = capacity;
        self
    }

    /// Set the pre-warm batch size (0 disables pre-warming)
    pub fn with_prewarm_batch(mut self, batch: usize) -> Self {
        self.prewarm_batch = batch;
        self
    }

    /// Build a configuration from the defaults, overlaid with any of
    /// `ECS_ENTITY_CAPACITY`, `ECS_STORE_CAPACITY` and `ECS_PREWARM_BATCH`
    /// found in the environment
    ///
    /// Values that do not parse as unsigned integers are ignored with a warning.
    pub fn from_env() -> Self {
        Self::default().overlay(|name| std::env::var(name).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fields: [(&str, &mut usize); 3] = [
            (ENTITY_CAPACITY_VAR, &mut self.entity_capacity),
            (STORE_CAPACITY_VAR, &mut self.store_capacity),
            (PREWARM_BATCH_VAR, &mut self.prewarm_batch),
        ];
        for (name, slot) in fields {
            let Some(raw) = lookup(name) else { continue };
            match raw.trim().parse::<usize>() {
                Ok(value) => *slot = value,
                Err(_) => warn!("Ignoring {}={:?}: not an unsigned integer", name, raw),
            }
        }
        self
    }
}
