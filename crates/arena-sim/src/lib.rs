//! Arena Sim -- the authoritative server-side arena simulation.
//!
//! Flowers (players) orbit petals around themselves, mobs wander the zones,
//! and everything that touches trades contact damage. This crate owns all of
//! the game rules and drives them with a fixed-rate [`TickLoop`](tick::TickLoop):
//!
//! - [`data`]: immutable petal, mob and zone tables.
//! - [`sim`]: the [`Simulation`](sim::Simulation) context (entity store,
//!   spatial index, seeded RNG, config).
//! - [`damage`]: damage and heal resolution, including reflection, poison,
//!   revival and ant-hole waves.
//! - [`petal`], [`flower`], [`mob`], [`status`], [`motion`], [`collision`]:
//!   the per-tick systems.
//! - [`client`]: validated client commands.
//! - [`snapshot`]: read-only entity views and the state hash.
//!
//! # Quick Start
//!
//! ```
//! use arena_sim::prelude::*;
//!
//! let config = SimConfig { mob_spawning: false, ..Default::default() };
//! let mut tick_loop = TickLoop::new(Simulation::new(config).unwrap());
//!
//! let camera = spawn::alloc_camera(tick_loop.sim_mut(), Team(1)).unwrap();
//! tick_loop.queue_command(camera, ClientCommand::Spawn { name: "rose".into() });
//! tick_loop.run_ticks(3);
//!
//! let player = tick_loop.sim().get(camera).unwrap().player;
//! assert!(tick_loop.sim().ent_alive(player));
//! ```

#![deny(unsafe_code)]

pub mod client;
pub mod collision;
pub mod config;
pub mod consts;
pub mod damage;
pub mod data;
pub mod entity;
pub mod flower;
pub mod mob;
pub mod motion;
pub mod petal;
pub mod sim;
pub mod snapshot;
pub mod spawn;
pub mod status;
pub mod tick;

use arena_ecs::entity::EntityId;
use arena_ecs::EcsError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from building or configuring a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Ecs(#[from] EcsError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse failed: {0}")]
    Config(#[from] serde_json::Error),
}

/// A client command that failed validation. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("name is {len} characters, limit is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("petal slot {slot} out of range (limit {limit})")]
    SlotOutOfRange { slot: usize, limit: usize },

    #[error("input ({x}, {y}) out of bounds")]
    InputOutOfBounds { x: f32, y: f32 },

    #[error("camera {camera} does not exist")]
    UnknownCamera { camera: EntityId },
}

impl CommandError {
    /// Whether the connection that sent the command should be dropped.
    ///
    /// Malformed requests disconnect; an oversized input vector is only
    /// ignored.
    pub fn should_disconnect(&self) -> bool {
        match self {
            CommandError::NameTooLong { .. }
            | CommandError::SlotOutOfRange { .. }
            | CommandError::UnknownCamera { .. } => true,
            CommandError::InputOutOfBounds { .. } => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use arena_ecs::prelude::*;

    pub use crate::client::ClientCommand;
    pub use crate::config::SimConfig;
    pub use crate::damage::{inflict_damage, inflict_heal, DamageType};
    pub use crate::data::{MobId, PetalId};
    pub use crate::entity::{Entity, EntityFlags, InputFlags, Team};
    pub use crate::sim::Simulation;
    pub use crate::snapshot::EntityView;
    pub use crate::spawn;
    pub use crate::tick::{Rejection, TickLoop};
    pub use crate::{CommandError, SimError};
}
