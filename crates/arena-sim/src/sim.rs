//! The simulation context.
//!
//! [`Simulation`] bundles everything one arena instance mutates during a
//! tick: the entity store, the spatial index, the seeded RNG and the petal
//! tracker. Every rule in this crate takes it explicitly as `&mut Simulation`;
//! there is no global state.
//!
//! Entity ids are weak. Every accessor returns `Option` or `bool`, and a stale
//! id simply reads as absent.

use arena_ecs::component::{Component, ComponentSet};
use arena_ecs::entity::EntityId;
use arena_ecs::spatial::SpatialHash;
use arena_ecs::store::EntityStore;
use arena_ecs::EcsError;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::SimConfig;
use crate::data::PetalId;
use crate::entity::{Entity, EntityFlags};
use crate::SimError;

// ---------------------------------------------------------------------------
// PetalTracker
// ---------------------------------------------------------------------------

/// Number of petals of each type currently held by cameras and players,
/// trashed petals still in a deleted-petal buffer included.
#[derive(Debug, Clone, Default)]
pub struct PetalTracker {
    counts: [u32; PetalId::COUNT],
}

impl PetalTracker {
    pub fn add(&mut self, id: PetalId) {
        if id != PetalId::None {
            self.counts[id as usize] += 1;
        }
    }

    pub fn remove(&mut self, id: PetalId) {
        if id != PetalId::None {
            let count = &mut self.counts[id as usize];
            debug_assert!(*count > 0, "releasing untracked petal {id:?}");
            *count = count.saturating_sub(1);
        }
    }

    pub fn count(&self, id: PetalId) -> u32 {
        self.counts[id as usize]
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// One arena instance.
#[derive(Debug)]
pub struct Simulation {
    store: EntityStore<Entity>,
    spatial: SpatialHash,
    rng: Pcg32,
    config: SimConfig,
    tracker: PetalTracker,
}

impl Simulation {
    /// Build an empty arena. Fails if `config` does not validate.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            store: EntityStore::with_capacity(config.max_entities),
            spatial: SpatialHash::new(config.spatial_cell_size),
            rng: Pcg32::seed_from_u64(config.rng_seed),
            config,
            tracker: PetalTracker::default(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Shorthand for [`SimConfig::ticks`].
    #[inline]
    pub fn ticks(&self, seconds: f32) -> u32 {
        self.config.ticks(seconds)
    }

    /// The simulation's seeded RNG. All randomness must be drawn from here.
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn tracker(&self) -> &PetalTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut PetalTracker {
        &mut self.tracker
    }

    pub fn spatial(&self) -> &SpatialHash {
        &self.spatial
    }

    // -- entities -----------------------------------------------------------

    /// Allocate a blank entity whose `id` and `base_entity` name itself.
    pub fn alloc(&mut self) -> Result<EntityId, EcsError> {
        let (id, ent) = self.store.alloc()?;
        ent.id = id;
        ent.base_entity = id;
        Ok(id)
    }

    /// Whether `id` names an allocated slot this tick (pending-delete included).
    #[inline]
    pub fn ent_exists(&self, id: EntityId) -> bool {
        self.store.exists(id)
    }

    /// Exists, is not pending delete, and has positive health if it has a
    /// health component.
    pub fn ent_alive(&self, id: EntityId) -> bool {
        if self.store.is_pending_delete(id) {
            return false;
        }
        let Some(ent) = self.store.get(id) else {
            return false;
        };
        !self.store.has_component(id, Component::Health) || ent.health > 0.0
    }

    #[inline]
    pub fn is_pending_delete(&self, id: EntityId) -> bool {
        self.store.is_pending_delete(id)
    }

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.store.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.store.get_mut(id)
    }

    /// Mark `id` for deletion at the end of the tick. Idempotent.
    pub fn request_delete(&mut self, id: EntityId) -> bool {
        self.store.request_delete(id)
    }

    #[inline]
    pub fn components(&self, id: EntityId) -> ComponentSet {
        self.store.components(id)
    }

    #[inline]
    pub fn has_component(&self, id: EntityId, component: Component) -> bool {
        self.store.has_component(id, component)
    }

    pub fn add_component(&mut self, id: EntityId, component: Component) -> bool {
        self.store.add_component(id, component)
    }

    /// Every existing id in slot order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.store.ids()
    }

    /// Existing ids carrying every component in `mask`, in slot order.
    pub fn ids_with(&self, mask: impl Into<ComponentSet>) -> Vec<EntityId> {
        self.store.ids_with(mask)
    }

    pub fn entity_count(&self) -> usize {
        self.store.len()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub(crate) fn store(&self) -> &EntityStore<Entity> {
        &self.store
    }

    // -- spatial ------------------------------------------------------------

    /// Spatial candidates around `(x, y)`, sorted by slot index so callers
    /// that act on them in order stay deterministic.
    pub fn query_ids(&self, x: f32, y: f32, half_width: f32, half_height: f32) -> Vec<EntityId> {
        let mut ids = self.spatial.query_ids(x, y, half_width, half_height);
        ids.sort_unstable_by_key(|id| id.index());
        ids
    }

    /// Re-bucket every physical entity at its current position.
    pub fn refresh_spatial(&mut self) {
        for (id, components, ent) in self.store.iter() {
            if components.contains(Component::Physics) {
                self.spatial.update(id, ent.pos.x, ent.pos.y);
            }
        }
    }

    // -- tick boundaries ----------------------------------------------------

    /// Clear the per-tick entity flags.
    pub fn begin_tick(&mut self) {
        for id in self.store.ids() {
            if let Some(ent) = self.store.get_mut(id) {
                ent.flags.remove(EntityFlags::PER_TICK);
            }
        }
    }

    /// Free every pending-delete entity and drop it from the spatial index.
    pub fn reclaim(&mut self) -> Vec<EntityId> {
        let reclaimed = self.store.reclaim();
        for &id in &reclaimed {
            self.spatial.remove(id);
        }
        if !reclaimed.is_empty() {
            tracing::debug!(count = reclaimed.len(), "reclaimed entities");
        }
        reclaimed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulation {
        Simulation::new(SimConfig {
            max_entities: 8,
            mob_spawning: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn alloc_sets_self_references() {
        let mut sim = sim();
        let id = sim.alloc().unwrap();
        let ent = sim.get(id).unwrap();
        assert_eq!(ent.id, id);
        assert_eq!(ent.base_entity, id);
    }

    #[test]
    fn alive_requires_positive_health_only_with_health_component() {
        let mut sim = sim();
        let rock = sim.alloc().unwrap();
        let camera = sim.alloc().unwrap();
        sim.add_component(rock, Component::Health);
        assert!(!sim.ent_alive(rock), "zero health with Health is dead");
        assert!(sim.ent_alive(camera), "no Health component means alive");

        sim.get_mut(rock).unwrap().health = 1.0;
        assert!(sim.ent_alive(rock));
    }

    #[test]
    fn pending_delete_exists_but_is_not_alive() {
        let mut sim = sim();
        let id = sim.alloc().unwrap();
        sim.request_delete(id);
        assert!(sim.ent_exists(id));
        assert!(!sim.ent_alive(id));
        assert!(sim.get(id).is_some());

        assert_eq!(sim.reclaim(), vec![id]);
        assert!(!sim.ent_exists(id));
    }

    #[test]
    fn reclaim_drops_spatial_entries() {
        let mut sim = sim();
        let id = sim.alloc().unwrap();
        sim.add_component(id, Component::Physics);
        sim.refresh_spatial();
        assert!(sim.spatial().contains(id));

        sim.request_delete(id);
        sim.reclaim();
        assert!(!sim.spatial().contains(id));
    }

    #[test]
    fn query_ids_sorted_by_index() {
        let mut sim = sim();
        let ids: Vec<_> = (0..5).map(|_| sim.alloc().unwrap()).collect();
        for (i, &id) in ids.iter().enumerate() {
            sim.add_component(id, Component::Physics);
            sim.get_mut(id).unwrap().pos.x = (4 - i) as f32 * 500.0;
        }
        sim.refresh_spatial();
        assert_eq!(sim.query_ids(1000.0, 0.0, 5000.0, 100.0), ids);
    }

    #[test]
    fn begin_tick_clears_per_tick_flags() {
        let mut sim = sim();
        let id = sim.alloc().unwrap();
        {
            let ent = sim.get_mut(id).unwrap();
            ent.flags.insert(EntityFlags::DAMAGED);
            ent.flags.insert(EntityFlags::DESPAWNING);
        }
        sim.begin_tick();
        let flags = sim.get(id).unwrap().flags;
        assert!(!flags.contains(EntityFlags::DAMAGED));
        assert!(flags.contains(EntityFlags::DESPAWNING));
    }

    #[test]
    fn tracker_counts_and_ignores_none() {
        let mut tracker = PetalTracker::default();
        tracker.add(PetalId::Rose);
        tracker.add(PetalId::Rose);
        tracker.add(PetalId::None);
        tracker.remove(PetalId::Rose);
        assert_eq!(tracker.count(PetalId::Rose), 1);
        assert_eq!(tracker.count(PetalId::None), 0);
    }

    #[test]
    fn invalid_config_rejected() {
        let result = Simulation::new(SimConfig {
            tps: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }
}
