//! Mob AI.

use arena_ecs::component::Component;
use arena_ecs::entity::EntityId;
use glam::Vec2;

use crate::consts::{LOSE_AGGRO_RADIUS, PLAYER_ACCELERATION};
use crate::data::MobAi;
use crate::entity::Team;
use crate::sim::Simulation;

pub fn mob_system(sim: &mut Simulation) {
    for id in sim.ids_with(Component::Mob) {
        tick_mob_ai(sim, id);
    }
}

/// Pick or drop a target and set pursuit acceleration.
pub fn tick_mob_ai(sim: &mut Simulation, id: EntityId) {
    if !sim.ent_alive(id) {
        return;
    }
    let Some(mob) = sim.get(id) else {
        return;
    };
    let data = mob.mob_id.data();
    let (pos, team, mut target) = (mob.pos, mob.team, mob.target);

    if data.ai == MobAi::Static {
        if let Some(mob) = sim.get_mut(id) {
            mob.acceleration = Vec2::ZERO;
        }
        return;
    }

    let mut target_pos = sim
        .get(target)
        .filter(|_| sim.ent_alive(target))
        .map(|t| t.pos)
        .filter(|&p| p.distance(pos) <= LOSE_AGGRO_RADIUS);
    if target_pos.is_none() {
        target = EntityId::NULL;
    }

    if target.is_null() && data.ai == MobAi::Aggressive {
        if let Some((found, found_pos)) = nearest_enemy_flower(sim, pos, team, data.aggro_radius) {
            target = found;
            target_pos = Some(found_pos);
        }
    }

    let acceleration = match target_pos {
        Some(to) => (to - pos).normalize_or_zero() * (PLAYER_ACCELERATION * data.speed),
        None => Vec2::ZERO,
    };
    if let Some(mob) = sim.get_mut(id) {
        mob.target = target;
        mob.acceleration = acceleration;
    }
}

/// Closest live flower not on `team` within `radius` of `pos`.
fn nearest_enemy_flower(
    sim: &Simulation,
    pos: Vec2,
    team: Team,
    radius: f32,
) -> Option<(EntityId, Vec2)> {
    if radius <= 0.0 {
        return None;
    }
    let mut best: Option<(EntityId, Vec2, f32)> = None;
    for id in sim.query_ids(pos.x, pos.y, radius, radius) {
        if !sim.ent_alive(id) || !sim.has_component(id, Component::Flower) {
            continue;
        }
        let Some(ent) = sim.get(id) else {
            continue;
        };
        if ent.team == team {
            continue;
        }
        let dist = ent.pos.distance(pos);
        if dist > radius || best.is_some_and(|(_, _, d)| d <= dist) {
            continue;
        }
        best = Some((id, ent.pos, dist));
    }
    best.map(|(id, pos, _)| (id, pos))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
