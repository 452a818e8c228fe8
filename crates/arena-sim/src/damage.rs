//! Damage and heal resolution.
//!
//! [`inflict_damage`] is the single entry point for every health loss in the
//! arena: contact, poison ticks and reflected damage all go through it. It
//! mutates the simulation in place and observes every earlier mutation of the
//! same tick, so one hit can chain into another (a hit reflecting back at the
//! attacker, a killing blow releasing an ant-hole wave).
//!
//! The order of effects is fixed:
//!
//! 1. Guards: non-positive amount, dead or health-less defender, immunity.
//! 2. Armor for the damage type; nothing happens if it absorbs the hit.
//! 3. Health loss, clamped at zero.
//! 4. Ant-hole waves for every health band crossed.
//! 5. Revival roll for a flower brought to zero.
//! 6. Reflection back at the attacker's base entity (depth-capped).
//! 7. Poison and slow, unless the defender was revived.
//! 8. Dandelion heal block on the attacker.
//! 9. Aggro: sticky target, unconditional last-damaged-by.

use arena_ecs::component::Component;
use arena_ecs::entity::EntityId;
use rand::Rng;

use crate::consts::{DANDELION_SECONDS, REVIVAL_IMMUNITY_SECONDS};
use crate::data::{MobId, PetalId, ANTHOLE_SPAWNS};
use crate::entity::EntityFlags;
use crate::sim::Simulation;
use crate::spawn::alloc_mob;

/// Which armor applies, and whether the hit may reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageType {
    /// Body or petal contact. Reduced by `armor`; applies poison.
    Contact,
    /// Poison tick. Reduced by `poison_armor`.
    Poison,
    /// Reflected damage. Ignores armor and never reflects again.
    Reflect,
}

/// Apply `amount` of `ty` damage from `attacker` to `defender`.
pub fn inflict_damage(
    sim: &mut Simulation,
    attacker: EntityId,
    defender: EntityId,
    amount: f32,
    ty: DamageType,
) {
    inflict_damage_at_depth(sim, attacker, defender, amount, ty, 0);
}

fn inflict_damage_at_depth(
    sim: &mut Simulation,
    atk_id: EntityId,
    def_id: EntityId,
    amount: f32,
    ty: DamageType,
    depth: u32,
) {
    // Written so that NaN also bails out.
    if !(amount > 0.0) {
        return;
    }
    if !sim.ent_alive(def_id) || !sim.has_component(def_id, Component::Health) {
        return;
    }
    let is_flower = sim.has_component(def_id, Component::Flower);
    let is_mob = sim.has_component(def_id, Component::Mob);
    let is_petal = sim.has_component(def_id, Component::Petal);
    let max_reflection_depth = sim.config().max_reflection_depth;

    let Some(defender) = sim.get_mut(def_id) else {
        return;
    };
    if defender.immunity_ticks > 0 {
        return;
    }
    let amount = match ty {
        DamageType::Contact => amount - defender.armor,
        DamageType::Poison => amount - defender.poison_armor,
        DamageType::Reflect => amount,
    };
    if !(amount > 0.0) {
        return;
    }

    let old_health = defender.health;
    defender.flags.insert(EntityFlags::DAMAGED);
    defender.health = (defender.health - amount).clamp(0.0, defender.health);
    let new_health = defender.health;
    let damage_dealt = old_health - new_health;
    let reflection = defender.damage_reflection;
    let petal_id = defender.petal_id;
    let mob_id = defender.mob_id;

    if is_mob && mob_id == MobId::AntHole {
        release_anthole_waves(sim, def_id, old_health, new_health);
    }

    if new_health <= 0.0 && is_flower && try_revive(sim, def_id) {
        tracing::debug!(flower = %def_id, "revived");
    }

    if !sim.ent_exists(atk_id) {
        return;
    }
    let (attacker_base, attacker_is_petal, attacker_parent) = match sim.get(atk_id) {
        Some(attacker) => (
            attacker.base_entity,
            sim.has_component(atk_id, Component::Petal),
            attacker.parent,
        ),
        None => return,
    };

    if ty != DamageType::Reflect && reflection > 0.0 {
        if depth < max_reflection_depth {
            inflict_damage_at_depth(
                sim,
                def_id,
                attacker_base,
                damage_dealt * reflection,
                DamageType::Reflect,
                depth + 1,
            );
        } else {
            tracing::trace!(depth, defender = %def_id, "reflection chain capped");
        }
    }

    if !sim.ent_alive(atk_id) {
        return;
    }
    let Some(attacker) = sim.get(atk_id) else {
        return;
    };
    let poison = attacker.poison_damage;
    let slow_inflict = attacker.slow_inflict;
    let poison_ticks = sim.ticks(poison.time);
    let tps = sim.config().tps as f32;

    if let Some(defender) = sim.get_mut(def_id) {
        if !defender.flags.contains(EntityFlags::REVIVED) {
            if ty == DamageType::Contact && defender.poison_ticks < poison_ticks {
                defender.poison_ticks = poison_ticks;
                defender.poison_inflicted = poison.damage / tps;
                defender.poison_dealer = atk_id;
            }
            if defender.slow_ticks < slow_inflict {
                defender.slow_ticks = slow_inflict;
            }
        }
    }

    if is_petal && petal_id == PetalId::Dandelion {
        let dandy_ticks = sim.ticks(DANDELION_SECONDS);
        if let Some(attacker) = sim.get_mut(atk_id) {
            attacker.dandy_ticks = dandy_ticks;
        }
    }

    let owner = if attacker_is_petal {
        attacker_parent
    } else {
        atk_id
    };
    let current_target = sim.get(def_id).map_or(EntityId::NULL, |d| d.target);
    let retarget = !sim.ent_alive(current_target);
    if let Some(defender) = sim.get_mut(def_id) {
        if retarget {
            defender.target = owner;
        }
        defender.last_damaged_by = owner;
    }
}

/// Release every wave whose health band the hole crossed going from
/// `old_health` to `new_health`. A dead hole releases all remaining waves.
fn release_anthole_waves(sim: &mut Simulation, hole_id: EntityId, old_health: f32, new_health: f32) {
    let Some(hole) = sim.get(hole_id) else {
        return;
    };
    let (pos, team, target, max_health) = (hole.pos, hole.team, hole.target, hole.max_health);
    if !(max_health > 0.0) {
        return;
    }
    let (start, end) = wave_range(max_health, old_health, new_health);
    for wave in start..end {
        tracing::debug!(hole = %hole_id, wave, "ant hole wave released");
        for &mob_id in ANTHOLE_SPAWNS[wave] {
            let Ok(child_id) = alloc_mob(sim, mob_id, pos.x, pos.y, team) else {
                return;
            };
            if let Some(child) = sim.get_mut(child_id) {
                child.parent = hole_id;
                child.target = target;
            }
        }
    }
}

/// Half-open range of wave indices released by a drop from `old` to `new`.
///
/// The first `len - 1` waves map onto equal bands of missing health; the last
/// wave only fires on death.
pub(crate) fn wave_range(max_health: f32, old: f32, new: f32) -> (usize, usize) {
    let bands = (ANTHOLE_SPAWNS.len() - 1) as f32;
    let start = ((max_health - old) / max_health * bands).ceil() as usize;
    let end = if new <= 0.0 {
        ANTHOLE_SPAWNS.len()
    } else {
        ((max_health - new) / max_health * bands).ceil() as usize
    };
    (start.min(ANTHOLE_SPAWNS.len()), end.min(ANTHOLE_SPAWNS.len()))
}

/// Roll once per spawned revival petal in loadout order; the first success
/// restores the flower.
fn try_revive(sim: &mut Simulation, flower_id: EntityId) -> bool {
    let chance = sim.config().revival_chance;
    let immunity = sim.ticks(REVIVAL_IMMUNITY_SECONDS);
    let candidates = match sim.get(flower_id) {
        Some(flower) => flower
            .loadout
            .iter()
            .filter(|slot| slot.already_spawned && slot.petal_id.data().attributes.revival)
            .count(),
        None => return false,
    };

    let revived = (0..candidates).any(|_| sim.rng().gen::<f32>() < chance);
    if !revived {
        return false;
    }
    if let Some(flower) = sim.get_mut(flower_id) {
        flower.flags.insert(EntityFlags::REVIVED);
        flower.health = flower.max_health;
        flower.poison_ticks = 0;
        flower.slow_ticks = 0;
        flower.dandy_ticks = 0;
        flower.immunity_ticks = immunity;
    }
    true
}

/// Restore up to `amount` health, capped at max health.
///
/// No effect on an entity that is pending delete, already dead, or under the
/// dandelion heal block.
pub fn inflict_heal(sim: &mut Simulation, id: EntityId, amount: f32) {
    if sim.is_pending_delete(id) || !sim.has_component(id, Component::Health) {
        return;
    }
    let Some(ent) = sim.get_mut(id) else {
        return;
    };
    if ent.health <= 0.0 || ent.dandy_ticks > 0 || !(amount > 0.0) {
        return;
    }
    ent.health = (ent.health + amount).min(ent.max_health);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::{LoadoutSlot, Team};
    use crate::spawn::{alloc_mob, alloc_petal, alloc_player};

    fn sim() -> Simulation {
        Simulation::new(SimConfig {
            max_entities: 64,
            mob_spawning: false,
            ..Default::default()
        })
        .unwrap()
    }

    fn health(sim: &Simulation, id: EntityId) -> f32 {
        sim.get(id).unwrap().health
    }

    #[test]
    fn contact_damage_subtracts_armor() {
        let mut sim = sim();
        let rock = alloc_mob(&mut sim, MobId::Rock, 0.0, 0.0, Team::MOBS).unwrap();
        let hole = alloc_mob(&mut sim, MobId::AntHole, 0.0, 0.0, Team::MOBS).unwrap();
        // Keep the hole out of its wave logic.
        sim.get_mut(hole).unwrap().mob_id = MobId::Boulder;

        inflict_damage(&mut sim, rock, hole, 12.0, DamageType::Contact);
        assert_eq!(health(&sim, hole), 493.0);

        inflict_damage(&mut sim, rock, hole, 5.0, DamageType::Contact);
        assert_eq!(health(&sim, hole), 493.0, "armor absorbs the hit");
    }

    #[test]
    fn poison_uses_poison_armor_and_reflect_ignores_armor() {
        let mut sim = sim();
        let a = alloc_player(&mut sim, Team(1)).unwrap();
        let b = alloc_player(&mut sim, Team(2)).unwrap();
        {
            let ent = sim.get_mut(b).unwrap();
            ent.armor = 100.0;
            ent.poison_armor = 2.0;
        }
        inflict_damage(&mut sim, a, b, 5.0, DamageType::Poison);
        assert_eq!(health(&sim, b), 97.0);
        inflict_damage(&mut sim, a, b, 5.0, DamageType::Reflect);
        assert_eq!(health(&sim, b), 92.0);
    }

    #[test]
    fn health_clamps_at_zero() {
        let mut sim = sim();
        let a = alloc_player(&mut sim, Team(1)).unwrap();
        let b = alloc_player(&mut sim, Team(2)).unwrap();
        inflict_damage(&mut sim, a, b, 1e6, DamageType::Contact);
        assert_eq!(health(&sim, b), 0.0);
        assert!(!sim.ent_alive(b));
    }

    #[test]
    fn wave_ranges_follow_health_bands() {
        assert_eq!(wave_range(1000.0, 1000.0, 600.0), (0, 2));
        assert_eq!(wave_range(1000.0, 600.0, 500.0), (2, 2));
        assert_eq!(wave_range(1000.0, 500.0, 499.0), (2, 3));
        assert_eq!(wave_range(1000.0, 100.0, 0.0), (4, 5));
        assert_eq!(wave_range(1000.0, 1000.0, 0.0), (0, 5));
    }

    #[test]
    fn killing_an_anthole_releases_every_remaining_wave() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        let hole = alloc_mob(&mut sim, MobId::AntHole, 50.0, 50.0, Team::MOBS).unwrap();
        sim.get_mut(hole).unwrap().armor = 0.0;

        let before = sim.entity_count();
        inflict_damage(&mut sim, player, hole, 10_000.0, DamageType::Contact);
        let spawned: usize = ANTHOLE_SPAWNS.iter().map(|wave| wave.len()).sum();
        assert_eq!(sim.entity_count() - before, spawned);

        for id in sim.ids_with(Component::Mob) {
            if id != hole {
                assert_eq!(sim.get(id).unwrap().parent, hole);
            }
        }
    }

    #[test]
    fn poison_only_refreshes_when_longer() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        let iris = alloc_petal(&mut sim, PetalId::Iris, player).unwrap();
        let rock = alloc_mob(&mut sim, MobId::Boulder, 0.0, 0.0, Team::MOBS).unwrap();

        inflict_damage(&mut sim, iris, rock, 5.0, DamageType::Contact);
        let ent = sim.get(rock).unwrap();
        assert_eq!(ent.poison_ticks, sim.ticks(6.0));
        assert_eq!(ent.poison_dealer, iris);
        assert!((ent.poison_inflicted - 60.0 / 20.0).abs() < 1e-6);

        sim.get_mut(rock).unwrap().poison_ticks = 500;
        inflict_damage(&mut sim, iris, rock, 5.0, DamageType::Contact);
        assert_eq!(sim.get(rock).unwrap().poison_ticks, 500);
    }

    #[test]
    fn poison_ticks_do_not_apply_poison() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        let iris = alloc_petal(&mut sim, PetalId::Iris, player).unwrap();
        let rock = alloc_mob(&mut sim, MobId::Boulder, 0.0, 0.0, Team::MOBS).unwrap();
        inflict_damage(&mut sim, iris, rock, 5.0, DamageType::Poison);
        assert_eq!(sim.get(rock).unwrap().poison_ticks, 0);
    }

    #[test]
    fn slow_applies_from_any_damage_type() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        let web = alloc_petal(&mut sim, PetalId::Web, player).unwrap();
        let rock = alloc_mob(&mut sim, MobId::Boulder, 0.0, 0.0, Team::MOBS).unwrap();
        inflict_damage(&mut sim, web, rock, 5.0, DamageType::Poison);
        assert_eq!(sim.get(rock).unwrap().slow_ticks, sim.ticks(1.0));
    }

    #[test]
    fn petal_hits_credit_the_owner() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        let petal = alloc_petal(&mut sim, PetalId::Basic, player).unwrap();
        let bee = alloc_mob(&mut sim, MobId::Bee, 0.0, 0.0, Team::MOBS).unwrap();
        inflict_damage(&mut sim, petal, bee, 5.0, DamageType::Contact);
        let ent = sim.get(bee).unwrap();
        assert_eq!(ent.target, player);
        assert_eq!(ent.last_damaged_by, player);
    }

    #[test]
    fn target_is_sticky_while_alive() {
        let mut sim = sim();
        let first = alloc_player(&mut sim, Team(1)).unwrap();
        let second = alloc_player(&mut sim, Team(2)).unwrap();
        let bee = alloc_mob(&mut sim, MobId::Bee, 0.0, 0.0, Team::MOBS).unwrap();

        inflict_damage(&mut sim, first, bee, 1.0, DamageType::Contact);
        inflict_damage(&mut sim, second, bee, 1.0, DamageType::Contact);
        let ent = sim.get(bee).unwrap();
        assert_eq!(ent.target, first);
        assert_eq!(ent.last_damaged_by, second);
    }

    #[test]
    fn hitting_a_dandelion_blocks_attacker_heals() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        let dandelion = alloc_petal(&mut sim, PetalId::Dandelion, player).unwrap();
        let enemy = alloc_player(&mut sim, Team(2)).unwrap();

        inflict_damage(&mut sim, enemy, dandelion, 1.0, DamageType::Contact);
        assert_eq!(sim.get(enemy).unwrap().dandy_ticks, sim.ticks(10.0));

        sim.get_mut(enemy).unwrap().health = 50.0;
        inflict_heal(&mut sim, enemy, 10.0);
        assert_eq!(health(&sim, enemy), 50.0);
    }

    #[test]
    fn reflection_hits_attacker_base_entity() {
        let mut sim = sim();
        let salty = alloc_player(&mut sim, Team(1)).unwrap();
        sim.get_mut(salty).unwrap().damage_reflection = 0.5;
        let owner = alloc_player(&mut sim, Team(2)).unwrap();
        let petal = alloc_petal(&mut sim, PetalId::Basic, owner).unwrap();

        inflict_damage(&mut sim, petal, salty, 20.0, DamageType::Contact);
        assert_eq!(health(&sim, salty), 80.0);
        assert_eq!(health(&sim, owner), 90.0);
        assert_eq!(health(&sim, petal), 10.0);
    }

    #[test]
    fn zero_reflection_depth_disables_reflection() {
        let mut sim = Simulation::new(SimConfig {
            max_entities: 64,
            mob_spawning: false,
            max_reflection_depth: 0,
            ..Default::default()
        })
        .unwrap();
        let a = alloc_player(&mut sim, Team(1)).unwrap();
        let b = alloc_player(&mut sim, Team(2)).unwrap();
        sim.get_mut(b).unwrap().damage_reflection = 1.0;

        inflict_damage(&mut sim, a, b, 30.0, DamageType::Contact);
        assert_eq!(health(&sim, b), 70.0);
        assert_eq!(health(&sim, a), 100.0);
        assert!(sim.get(a).unwrap().last_damaged_by.is_null());
    }

    #[test]
    fn revival_needs_a_spawned_revival_petal() {
        let mut sim = Simulation::new(SimConfig {
            revival_chance: 1.0,
            mob_spawning: false,
            ..Default::default()
        })
        .unwrap();
        let flower = alloc_player(&mut sim, Team(1)).unwrap();
        let enemy = alloc_player(&mut sim, Team(2)).unwrap();
        sim.get_mut(flower).unwrap().loadout = vec![LoadoutSlot::new(PetalId::Yggdrasil)];

        inflict_damage(&mut sim, enemy, flower, 500.0, DamageType::Contact);
        assert_eq!(health(&sim, flower), 0.0, "unspawned petal never revives");
    }

    #[test]
    fn heal_caps_at_max_health() {
        let mut sim = sim();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        sim.get_mut(player).unwrap().health = 95.0;
        inflict_heal(&mut sim, player, 11.0);
        assert_eq!(health(&sim, player), 100.0);
    }

    #[test]
    fn heal_ignores_dead_and_pending() {
        let mut sim = sim();
        let dead = alloc_player(&mut sim, Team(1)).unwrap();
        sim.get_mut(dead).unwrap().health = 0.0;
        inflict_heal(&mut sim, dead, 10.0);
        assert_eq!(health(&sim, dead), 0.0);

        let pending = alloc_player(&mut sim, Team(1)).unwrap();
        sim.get_mut(pending).unwrap().health = 10.0;
        sim.request_delete(pending);
        inflict_heal(&mut sim, pending, 10.0);
        assert_eq!(health(&sim, pending), 10.0);
    }
}
