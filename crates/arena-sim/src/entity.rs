//! The entity payload stored in every slot.
//!
//! [`Entity`] is a superset of every component's fields. Which fields mean
//! anything is decided by the slot's [`ComponentSet`](arena_ecs::component::ComponentSet):
//! a rock has a `loadout`, it is just never read.

use arena_ecs::entity::EntityId;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_SLOT_COUNT;
use crate::data::{MobId, PetalId, PoisonDamage};

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Lifecycle and per-tick state bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFlags(u8);

impl EntityFlags {
    /// In the terminal despawn countdown; movement is overridden.
    pub const DESPAWNING: EntityFlags = EntityFlags(1 << 0);
    /// Took damage this tick.
    pub const DAMAGED: EntityFlags = EntityFlags(1 << 1);
    /// Was revived this tick.
    pub const REVIVED: EntityFlags = EntityFlags(1 << 2);

    /// Bits cleared at the start of every tick.
    pub const PER_TICK: EntityFlags = EntityFlags(Self::DAMAGED.0 | Self::REVIVED.0);

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, other: EntityFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: EntityFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: EntityFlags) {
        self.0 &= !other.0;
    }
}

/// Buttons a client holds, as sent with each input message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFlags(pub u8);

impl InputFlags {
    pub const ATTACKING: u8 = 1 << 0;
    pub const DEFENDING: u8 = 1 << 1;

    #[inline]
    pub fn attacking(self) -> bool {
        self.0 & Self::ATTACKING != 0
    }

    #[inline]
    pub fn defending(self) -> bool {
        self.0 & Self::DEFENDING != 0
    }
}

/// Team membership. Entities on the same team never hurt each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team(pub u8);

impl Team {
    /// Wild mobs.
    pub const MOBS: Team = Team(0);
}

// ---------------------------------------------------------------------------
// Loadout
// ---------------------------------------------------------------------------

/// One petal instance belonging to a loadout slot.
#[derive(Debug, Clone, Default)]
pub struct LoadoutPetal {
    /// Spawned petal entity, or [`EntityId::NULL`] while reloading.
    pub ent_id: EntityId,
    pub reload_ticks: u32,
}

/// An active loadout slot and the petals it keeps in play.
#[derive(Debug, Clone, Default)]
pub struct LoadoutSlot {
    pub petal_id: PetalId,
    /// Set once any petal of this slot has been spawned since it was equipped.
    pub already_spawned: bool,
    pub petals: Vec<LoadoutPetal>,
}

impl LoadoutSlot {
    pub fn new(petal_id: PetalId) -> Self {
        let count = petal_id.data().count as usize;
        Self {
            petal_id,
            already_spawned: false,
            petals: vec![LoadoutPetal::default(); count],
        }
    }
}

/// Ring buffer of the most recently trashed petals.
///
/// Holds at most [`MAX_SLOT_COUNT`] ids; pushing into a full buffer evicts
/// the oldest entry.
#[derive(Debug, Clone, Default)]
pub struct DeletedPetals {
    ids: [PetalId; MAX_SLOT_COUNT],
    start: usize,
    len: usize,
}

impl DeletedPetals {
    /// Record `id`, returning the evicted oldest id if the buffer was full.
    pub fn push(&mut self, id: PetalId) -> Option<PetalId> {
        if self.len == MAX_SLOT_COUNT {
            let evicted = self.ids[self.start];
            self.ids[self.start] = id;
            self.start = (self.start + 1) % MAX_SLOT_COUNT;
            return Some(evicted);
        }
        self.ids[(self.start + self.len) % MAX_SLOT_COUNT] = id;
        self.len += 1;
        None
    }

    /// Oldest recorded id.
    pub fn oldest(&self) -> Option<PetalId> {
        (self.len > 0).then(|| self.ids[self.start])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_SLOT_COUNT
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = PetalId> + '_ {
        (0..self.len).map(move |i| self.ids[(self.start + i) % MAX_SLOT_COUNT])
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One simulation object. See the module docs for how fields are gated.
#[derive(Debug, Clone, Default)]
pub struct Entity {
    pub id: EntityId,
    /// Entity that receives reflected damage aimed at this one.
    pub base_entity: EntityId,
    pub flags: EntityFlags,

    // -- physics ------------------------------------------------------------
    pub pos: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub friction: f32,
    /// Zero mass never yields in collisions.
    pub mass: f32,
    pub radius: f32,
    pub angle: f32,

    // -- relations ----------------------------------------------------------
    /// Owning flower (petals), releasing hole (ant waves), or camera (flowers).
    pub parent: EntityId,
    pub team: Team,

    // -- health -------------------------------------------------------------
    pub health: f32,
    pub max_health: f32,
    pub armor: f32,
    pub poison_armor: f32,
    /// Body damage dealt on contact.
    pub damage: f32,
    pub damage_reflection: f32,
    /// Poison this entity inflicts on contact.
    pub poison_damage: PoisonDamage,
    /// Slow (in ticks) this entity inflicts on contact.
    pub slow_inflict: u32,
    pub poison_ticks: u32,
    /// Poison damage applied per tick while `poison_ticks > 0`.
    pub poison_inflicted: f32,
    pub poison_dealer: EntityId,
    pub slow_ticks: u32,
    /// Blocks healing while non-zero.
    pub dandy_ticks: u32,
    pub immunity_ticks: u32,
    /// Ticks left before a despawning entity is deleted.
    pub despawn_tick: u32,
    pub target: EntityId,
    pub last_damaged_by: EntityId,

    // -- petal --------------------------------------------------------------
    pub petal_id: PetalId,
    pub secondary_reload: u32,

    // -- mob ----------------------------------------------------------------
    pub mob_id: MobId,

    // -- flower -------------------------------------------------------------
    pub name: String,
    pub score: u32,
    pub input: InputFlags,
    /// Orbit phase of the flower's petals.
    pub heading: f32,
    pub loadout: Vec<LoadoutSlot>,
    /// `loadout_count` active slots followed by [`MAX_SLOT_COUNT`] secondary
    /// slots. Flowers and cameras both carry one.
    pub loadout_ids: [PetalId; 2 * MAX_SLOT_COUNT],
    pub loadout_count: usize,
    pub deleted_petals: DeletedPetals,

    // -- camera -------------------------------------------------------------
    /// Player currently driven by this camera.
    pub player: EntityId,
}

impl Entity {
    #[inline]
    pub fn is_despawning(&self) -> bool {
        self.flags.contains(EntityFlags::DESPAWNING)
    }

    /// Enter the despawning state; the entity is deleted `ticks` ticks from now.
    pub fn set_despawn_tick(&mut self, ticks: u32) {
        self.flags.insert(EntityFlags::DESPAWNING);
        self.despawn_tick = ticks;
    }

    /// `health / max_health`, or zero for an entity without max health.
    pub fn health_ratio(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Number of slot indices a client may address: active plus secondary.
    pub fn addressable_slots(&self) -> usize {
        self.loadout_count + MAX_SLOT_COUNT
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_petals_evicts_oldest_when_full() {
        let mut ring = DeletedPetals::default();
        for _ in 0..MAX_SLOT_COUNT - 1 {
            assert_eq!(ring.push(PetalId::Light), None);
        }
        assert_eq!(ring.push(PetalId::Rose), None);
        assert!(ring.is_full());
        assert_eq!(ring.oldest(), Some(PetalId::Light));

        assert_eq!(ring.push(PetalId::Missile), Some(PetalId::Light));
        assert_eq!(ring.len(), MAX_SLOT_COUNT);
        assert_eq!(ring.iter().last(), Some(PetalId::Missile));
    }

    #[test]
    fn deleted_petals_iterates_oldest_first() {
        let mut ring = DeletedPetals::default();
        ring.push(PetalId::Light);
        ring.push(PetalId::Heavy);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![PetalId::Light, PetalId::Heavy]);
        assert!(DeletedPetals::default().oldest().is_none());
    }

    #[test]
    fn flags_insert_remove() {
        let mut flags = EntityFlags::default();
        flags.insert(EntityFlags::DAMAGED);
        flags.insert(EntityFlags::DESPAWNING);
        flags.remove(EntityFlags::PER_TICK);
        assert!(flags.contains(EntityFlags::DESPAWNING));
        assert!(!flags.contains(EntityFlags::DAMAGED));
    }

    #[test]
    fn loadout_slot_sized_by_count() {
        assert_eq!(LoadoutSlot::new(PetalId::Triweb).petals.len(), 3);
        assert_eq!(LoadoutSlot::new(PetalId::Basic).petals.len(), 1);
        assert!(LoadoutSlot::new(PetalId::None).petals.is_empty());
    }

    #[test]
    fn input_flag_bits() {
        let input = InputFlags(InputFlags::ATTACKING | InputFlags::DEFENDING);
        assert!(input.attacking() && input.defending());
        assert!(!InputFlags::default().attacking());
    }

    #[test]
    fn health_ratio_without_max_is_zero() {
        let ent = Entity::default();
        assert_eq!(ent.health_ratio(), 0.0);
    }
}
