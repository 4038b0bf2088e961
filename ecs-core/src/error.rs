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
//! Error types for entity and component operations
//!
//! Every failure a caller can recover from is a variant of [`EcsError`].
//! Degenerate cases that are not errors (removing an absent component,
//! `try_get` on a missing component) are reported through `bool` and
//! `Option` return values instead.

use crate::ecs::{Entity, WorldId};
use thiserror::Error;

/// Errors returned by world, registry and store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle is the null sentinel, was never issued, or has been retired.
    #[error("invalid entity: {0}")]
    InvalidEntity(Entity),

    /// The entity does not currently have the requested component.
    #[error("{entity} has no {component} component")]
    ComponentNotFound {
        /// Entity that was queried.
        entity: Entity,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// The entity already has a component of this type.
    #[error("{entity} already has a {component} component")]
    DuplicateComponent {
        /// Entity the component was added to.
        entity: Entity,
        /// Type name of the duplicated component.
        component: &'static str,
    },

    /// A component type reported as present has no backing store.
    ///
    /// This indicates a registry bug, not a caller error.
    #[error("registry inconsistency: no store for component tag {tag}")]
    MissingStore {
        /// Tag whose store could not be resolved.
        tag: usize,
    },

    /// No world is registered under this id.
    #[error("unknown world: {0}")]
    UnknownWorld(WorldId),
}

/// Result type for ECS operations
pub type EcsResult<T> = Result<T, EcsError>;
