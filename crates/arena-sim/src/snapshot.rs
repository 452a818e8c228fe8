//! Read-only entity views and the BLAKE3 state hash.
//!
//! [`EntityView`] is what the network layer serializes for clients: position,
//! size, health and type ids, nothing the client could act on. The same views
//! back [`Simulation::state_hash`], so two simulations with equal hashes look
//! identical to every client.

use arena_ecs::component::{Component, ComponentSet};
use arena_ecs::entity::EntityId;
use serde::{Deserialize, Serialize};

use crate::data::{MobId, PetalId};
use crate::entity::Entity;
use crate::sim::Simulation;

/// Which role an entity plays, by its most specific component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Camera,
    Flower,
    Petal,
    Mob,
    Other,
}

impl EntityKind {
    pub fn of(components: ComponentSet) -> Self {
        if components.contains(Component::Flower) {
            EntityKind::Flower
        } else if components.contains(Component::Petal) {
            EntityKind::Petal
        } else if components.contains(Component::Mob) {
            EntityKind::Mob
        } else if components.contains(Component::Camera) {
            EntityKind::Camera
        } else {
            EntityKind::Other
        }
    }
}

/// Serializable per-entity state for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub angle: f32,
    pub health_ratio: f32,
    pub team: u8,
    pub petal_id: PetalId,
    pub mob_id: MobId,
    /// [`EntityFlags`](crate::entity::EntityFlags) bits.
    pub flags: u8,
    pub pending_delete: bool,
}

impl EntityView {
    fn new(id: EntityId, components: ComponentSet, ent: &Entity, pending_delete: bool) -> Self {
        Self {
            id,
            kind: EntityKind::of(components),
            x: ent.pos.x,
            y: ent.pos.y,
            radius: ent.radius,
            angle: ent.angle,
            health_ratio: ent.health_ratio(),
            team: ent.team.0,
            petal_id: ent.petal_id,
            mob_id: ent.mob_id,
            flags: ent.flags.bits(),
            pending_delete,
        }
    }
}

impl Simulation {
    /// One view per existing entity, pending-delete included, in slot order.
    pub fn snapshot(&self) -> Vec<EntityView> {
        self.store()
            .iter()
            .map(|(id, components, ent)| {
                EntityView::new(id, components, ent, self.is_pending_delete(id))
            })
            .collect()
    }

    /// View of a single entity, if it exists.
    pub fn view(&self, id: EntityId) -> Option<EntityView> {
        let ent = self.get(id)?;
        Some(EntityView::new(
            id,
            self.components(id),
            ent,
            self.is_pending_delete(id),
        ))
    }

    /// BLAKE3 hex digest of [`snapshot`](Self::snapshot).
    pub fn state_hash(&self) -> String {
        let json_bytes = serde_json::to_vec(&self.snapshot())
            .expect("entity views should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
