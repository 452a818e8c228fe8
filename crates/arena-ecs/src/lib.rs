//! Arena ECS -- slot-array entity storage and spatial indexing.
//!
//! This crate holds the game-agnostic half of the arena simulation:
//!
//! - [`EntityId`](entity::EntityId): generational weak handles.
//! - [`ComponentSet`](component::ComponentSet): per-slot capability bitmask.
//! - [`EntityStore`](store::EntityStore): fixed-capacity slots with a FIFO
//!   free list and two-phase (mark, then reclaim) deletion.
//! - [`SpatialHash`](spatial::SpatialHash): grid buckets for radius queries.
//!
//! # Quick Start
//!
//! ```
//! use arena_ecs::prelude::*;
//!
//! #[derive(Default)]
//! struct Body { x: f32, y: f32 }
//!
//! let mut store = EntityStore::<Body>::with_capacity(16);
//! let mut grid = SpatialHash::new(64.0);
//!
//! let (id, body) = store.alloc().unwrap();
//! body.x = 10.0;
//! store.add_component(id, Component::Physics);
//! grid.insert(id, 10.0, 0.0);
//!
//! assert_eq!(grid.query_ids(0.0, 0.0, 32.0, 32.0), vec![id]);
//!
//! store.request_delete(id);
//! assert!(store.exists(id));
//! for gone in store.reclaim() {
//!     grid.remove(gone);
//! }
//! assert!(!store.exists(id));
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod spatial;
pub mod store;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by store operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// Every slot is in use (pending-delete slots count until reclaimed).
    #[error("entity store full: all {capacity} slots in use")]
    CapacityExhausted { capacity: usize },

    /// The entity does not exist (stale generation or never allocated).
    #[error("entity {entity:?} does not exist (stale or never allocated)")]
    StaleEntity { entity: entity::EntityId },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{Component, ComponentSet};
    pub use crate::entity::EntityId;
    pub use crate::spatial::SpatialHash;
    pub use crate::store::EntityStore;
    pub use crate::EcsError;
}
