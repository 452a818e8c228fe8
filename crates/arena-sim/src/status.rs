//! Status timers and the death/despawn lifecycle.
//!
//! Every timer is a tick counter that only ever counts down to zero. Poison is
//! applied through [`inflict_damage`] so it obeys immunity, armor and aggro
//! like any other hit.

use arena_ecs::component::Component;
use arena_ecs::entity::EntityId;

use crate::damage::{inflict_damage, DamageType};
use crate::sim::Simulation;

pub fn status_system(sim: &mut Simulation) {
    for id in sim.ids() {
        tick_status(sim, id);
    }
}

/// Advance every timer on `id` by one tick and delete it if it died or its
/// despawn countdown ran out.
pub fn tick_status(sim: &mut Simulation, id: EntityId) {
    if !sim.ent_exists(id) || sim.is_pending_delete(id) {
        return;
    }
    let has_health = sim.has_component(id, Component::Health);

    if has_health {
        let poison = sim
            .get(id)
            .filter(|ent| ent.poison_ticks > 0)
            .map(|ent| (ent.poison_dealer, ent.poison_inflicted));
        if let Some((dealer, amount)) = poison {
            inflict_damage(sim, dealer, id, amount, DamageType::Poison);
        }
    }

    let Some(ent) = sim.get_mut(id) else {
        return;
    };
    ent.poison_ticks = ent.poison_ticks.saturating_sub(1);
    ent.slow_ticks = ent.slow_ticks.saturating_sub(1);
    ent.dandy_ticks = ent.dandy_ticks.saturating_sub(1);
    ent.immunity_ticks = ent.immunity_ticks.saturating_sub(1);

    let mut expired = false;
    if ent.is_despawning() {
        ent.despawn_tick = ent.despawn_tick.saturating_sub(1);
        expired = ent.despawn_tick == 0;
    }
    let dead = has_health && ent.health <= 0.0;

    if dead {
        on_death(sim, id);
    }
    if dead || expired {
        sim.request_delete(id);
    }
}

/// Death side effects: xp for the killer of a mob, loadout hand-back for a
/// flower.
fn on_death(sim: &mut Simulation, id: EntityId) {
    let Some(ent) = sim.get(id) else {
        return;
    };
    let xp = ent.mob_id.data().xp;
    let (killer, camera_id, score) = (ent.last_damaged_by, ent.parent, ent.score);
    let (loadout_ids, loadout_count) = (ent.loadout_ids, ent.loadout_count);

    if sim.has_component(id, Component::Mob)
        && sim.ent_alive(killer)
        && sim.has_component(killer, Component::Flower)
    {
        if let Some(flower) = sim.get_mut(killer) {
            flower.score += xp;
        }
    }
    if sim.has_component(id, Component::Flower) {
        tracing::info!(player = %id, score, "player died");
        if sim.has_component(camera_id, Component::Camera) {
            if let Some(camera) = sim.get_mut(camera_id) {
                camera.loadout_ids = loadout_ids;
                camera.loadout_count = loadout_count;
                camera.score = score;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::data::{MobId, PetalId};
    use crate::entity::Team;
    use crate::spawn::{
        alloc_camera, alloc_mob, alloc_petal, alloc_player, entity_set_despawn_tick, player_spawn,
    };

    fn sim() -> Simulation {
        Simulation::new(SimConfig {
            max_entities: 32,
            mob_spawning: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn timers_count_down_and_stop_at_zero() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        {
            let ent = sim.get_mut(player).unwrap();
            ent.slow_ticks = 2;
            ent.dandy_ticks = 1;
            ent.immunity_ticks = 3;
        }
        for _ in 0..3 {
            tick_status(&mut sim, player);
        }
        let ent = sim.get(player).unwrap();
        assert_eq!((ent.slow_ticks, ent.dandy_ticks, ent.immunity_ticks), (0, 0, 0));
    }

    #[test]
    fn poison_ticks_damage_from_dealer() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        let bee = alloc_mob(&mut sim, MobId::Boulder, 0.0, 0.0, Team::MOBS).unwrap();
        {
            let ent = sim.get_mut(bee).unwrap();
            ent.poison_ticks = 2;
            ent.poison_inflicted = 3.0;
            ent.poison_dealer = player;
        }
        for _ in 0..4 {
            tick_status(&mut sim, bee);
        }
        let ent = sim.get(bee).unwrap();
        assert_eq!(ent.health, 34.0);
        assert_eq!(ent.poison_ticks, 0);
        assert_eq!(ent.last_damaged_by, player);
    }

    #[test]
    fn despawn_countdown_deletes_at_zero() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        let petal = alloc_petal(&mut sim, PetalId::Missile, player).unwrap();
        entity_set_despawn_tick(&mut sim, petal, 3);
        tick_status(&mut sim, petal);
        tick_status(&mut sim, petal);
        assert!(!sim.is_pending_delete(petal));
        tick_status(&mut sim, petal);
        assert!(sim.is_pending_delete(petal));
    }

    #[test]
    fn mob_death_awards_xp_to_killer() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        let beetle = alloc_mob(&mut sim, MobId::Beetle, 0.0, 0.0, Team::MOBS).unwrap();
        inflict_damage(&mut sim, player, beetle, 1000.0, DamageType::Contact);
        tick_status(&mut sim, beetle);
        assert!(sim.is_pending_delete(beetle));
        assert_eq!(sim.get(player).unwrap().score, MobId::Beetle.data().xp);
    }

    #[test]
    fn player_death_hands_loadout_back_to_camera() {
        let mut sim = sim();
        let camera = alloc_camera(&mut sim, Team(1)).unwrap();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        player_spawn(&mut sim, camera, player).unwrap();
        {
            let ent = sim.get_mut(player).unwrap();
            ent.loadout_ids[1] = PetalId::Rose;
            ent.score = 77;
            ent.health = 0.0;
        }
        tick_status(&mut sim, player);
        assert!(sim.is_pending_delete(player));
        let cam = sim.get(camera).unwrap();
        assert_eq!(cam.loadout_ids[1], PetalId::Rose);
        assert_eq!(cam.score, 77);
    }

    #[test]
    fn entities_without_health_never_die() {
        let mut sim = sim();
        let camera = alloc_camera(&mut sim, Team(1)).unwrap();
        tick_status(&mut sim, camera);
        assert!(!sim.is_pending_delete(camera));
    }
}
