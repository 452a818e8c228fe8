//! Per-tick petal behavior.
//!
//! A petal is either active (orbiting, driven by the flower system) or
//! despawning (flying off on its own until its countdown ends). Behavior is a
//! dispatch over the petal's attribute row:
//!
//! | state      | attribute          | effect                                   |
//! |------------|--------------------|------------------------------------------|
//! | any        | `rotation_style`   | passive spin or face away from owner     |
//! | despawning | `despawn_motion`   | halt, launch along facing, home to owner |
//! | active     | `secondary_reload` | arm, then burst heal and/or `ability`    |
//!
//! Abilities read the owner's input flags; nothing here reads client input
//! directly.

use arena_ecs::component::Component;
use arena_ecs::entity::EntityId;
use glam::Vec2;
use rand::Rng;

use crate::consts::{DEFAULT_FRICTION, PLAYER_ACCELERATION, TEAMMATE_HEAL_RADIUS};
use crate::damage::inflict_heal;
use crate::data::{Ability, DespawnMotion, RotationStyle};
use crate::entity::InputFlags;
use crate::sim::Simulation;
use crate::spawn::entity_set_despawn_tick;

/// Run [`tick_petal_behavior`] for every petal.
pub fn petal_system(sim: &mut Simulation) {
    for id in sim.ids_with(Component::Petal) {
        tick_petal_behavior(sim, id);
    }
}

/// Advance one petal by one tick.
pub fn tick_petal_behavior(sim: &mut Simulation, petal_id: EntityId) {
    if !sim.ent_exists(petal_id) || sim.is_pending_delete(petal_id) {
        return;
    }
    let Some(petal) = sim.get(petal_id) else {
        return;
    };
    let owner_id = petal.parent;
    if !sim.ent_alive(owner_id) {
        sim.request_delete(petal_id);
        return;
    }
    let Some(owner) = sim.get(owner_id) else {
        return;
    };
    let (owner_pos, owner_input) = (owner.pos, owner.input);
    let attrs = &petal.petal_id.data().attributes;
    let tps = sim.config().tps as f32;
    let despawning = petal.is_despawning();

    let angle = match attrs.rotation_style {
        RotationStyle::Passive => {
            let step = attrs.passive_rotation / tps;
            if petal_id.index() % 2 == 1 {
                petal.angle + step
            } else {
                petal.angle - step
            }
        }
        RotationStyle::Follow if !despawning => {
            let delta = petal.pos - owner_pos;
            delta.y.atan2(delta.x)
        }
        _ => petal.angle,
    };
    if let Some(petal) = sim.get_mut(petal_id) {
        petal.angle = angle;
    }

    if despawning {
        despawn_motion(sim, petal_id, owner_pos, attrs.despawn_motion, angle);
        return;
    }

    if attrs.secondary_reload <= 0.0 {
        return;
    }
    let threshold = sim.ticks(attrs.secondary_reload);
    let armed = match sim.get_mut(petal_id) {
        Some(petal) if petal.secondary_reload > threshold => true,
        Some(petal) => {
            petal.secondary_reload += 1;
            false
        }
        None => false,
    };
    if !armed {
        return;
    }

    if attrs.burst_heal > 0.0 && burst_heal(sim, petal_id, owner_id, attrs.burst_heal) {
        return;
    }
    if run_ability(sim, petal_id, owner_id, owner_pos, owner_input, attrs.ability) {
        if let Some(petal) = sim.get_mut(petal_id) {
            petal.secondary_reload = 0;
        }
    }
}

fn despawn_motion(
    sim: &mut Simulation,
    petal_id: EntityId,
    owner_pos: Vec2,
    motion: DespawnMotion,
    angle: f32,
) {
    let Some(petal) = sim.get_mut(petal_id) else {
        return;
    };
    petal.acceleration = match motion {
        DespawnMotion::Halt => Vec2::ZERO,
        DespawnMotion::Launch => Vec2::from_angle(angle) * (4.0 * PLAYER_ACCELERATION),
        DespawnMotion::Home => homing_pull(owner_pos - petal.pos),
    };
}

/// Inverse-square pull along `delta`, capped at one player acceleration.
pub(crate) fn homing_pull(delta: Vec2) -> Vec2 {
    let dist_sq = delta.length_squared();
    if dist_sq == 0.0 {
        return Vec2::ZERO;
    }
    let magnitude = (20_000.0 * PLAYER_ACCELERATION / dist_sq).min(PLAYER_ACCELERATION);
    delta.normalize_or_zero() * magnitude
}

/// Steer toward the most deserving heal target, healing and deleting the
/// petal on arrival. Returns `true` if the petal was consumed.
fn burst_heal(sim: &mut Simulation, petal_id: EntityId, owner_id: EntityId, amount: f32) -> bool {
    let Some(target_id) = heal_target(sim, owner_id) else {
        return false;
    };
    let (Some(petal), Some(target)) = (sim.get(petal_id), sim.get(target_id)) else {
        return false;
    };
    let delta = target.pos - petal.pos;
    if delta.length() < petal.radius {
        inflict_heal(sim, target_id, amount);
        sim.request_delete(petal_id);
        return true;
    }
    if let Some(petal) = sim.get_mut(petal_id) {
        petal.acceleration = delta.normalize_or_zero() * (4.0 * PLAYER_ACCELERATION);
    }
    false
}

/// The owner if it is wounded and not heal-blocked, otherwise the teammate
/// flower with the lowest health ratio within [`TEAMMATE_HEAL_RADIUS`].
/// Ties keep the first candidate found.
pub fn heal_target(sim: &Simulation, owner_id: EntityId) -> Option<EntityId> {
    let owner = sim.get(owner_id)?;
    if owner.health < owner.max_health && owner.dandy_ticks == 0 {
        return Some(owner_id);
    }
    let mut best = None;
    let mut min_ratio = 1.0;
    for id in sim.query_ids(
        owner.pos.x,
        owner.pos.y,
        TEAMMATE_HEAL_RADIUS,
        TEAMMATE_HEAL_RADIUS,
    ) {
        if !sim.ent_alive(id) || !sim.has_component(id, Component::Flower) {
            continue;
        }
        let Some(ent) = sim.get(id) else {
            continue;
        };
        if ent.team != owner.team || ent.dandy_ticks > 0 {
            continue;
        }
        let ratio = ent.health_ratio();
        if ratio >= min_ratio || ent.pos.distance(owner.pos) > TEAMMATE_HEAL_RADIUS {
            continue;
        }
        best = Some(id);
        min_ratio = ratio;
    }
    best
}

/// Fire the petal's ability if the owner's input calls for it. Returns
/// `true` if it fired.
fn run_ability(
    sim: &mut Simulation,
    petal_id: EntityId,
    owner_id: EntityId,
    owner_pos: Vec2,
    input: InputFlags,
    ability: Ability,
) -> bool {
    let jitter = match ability {
        Ability::Web { spread: true } if input.attacking() => sim.rng().gen::<f32>() - 0.5,
        _ => 0.0,
    };
    let Some(petal) = sim.get(petal_id) else {
        return false;
    };
    let (petal_pos, facing) = (petal.pos, petal.angle);
    let outward = (petal_pos - owner_pos).to_angle();

    let despawn_after = match ability {
        Ability::Missile if input.attacking() => {
            if let Some(petal) = sim.get_mut(petal_id) {
                petal.acceleration = Vec2::from_angle(facing) * (4.0 * PLAYER_ACCELERATION);
            }
            sim.ticks(3.0)
        }
        Ability::Web { .. } if input.attacking() => {
            if let Some(petal) = sim.get_mut(petal_id) {
                petal.friction = DEFAULT_FRICTION;
                petal.acceleration =
                    Vec2::from_angle(outward + jitter) * (30.0 * PLAYER_ACCELERATION);
            }
            sim.ticks(0.6)
        }
        Ability::Web { .. } if input.defending() => sim.ticks(0.6),
        Ability::Bubble if input.defending() => {
            let push = (owner_pos - petal_pos).normalize_or_zero() * (30.0 * PLAYER_ACCELERATION);
            if let Some(owner) = sim.get_mut(owner_id) {
                owner.velocity += push;
            }
            sim.request_delete(petal_id);
            return true;
        }
        Ability::Pollen if input.attacking() || input.defending() => {
            if let Some(petal) = sim.get_mut(petal_id) {
                petal.friction = DEFAULT_FRICTION;
            }
            sim.ticks(4.0)
        }
        Ability::Peas if input.attacking() => {
            if let Some(petal) = sim.get_mut(petal_id) {
                petal.friction = DEFAULT_FRICTION;
                petal.acceleration = Vec2::from_angle(outward) * (25.0 * PLAYER_ACCELERATION);
            }
            sim.ticks(0.25)
        }
        Ability::Moon if input.attacking() => {
            if let Some(petal) = sim.get_mut(petal_id) {
                petal.friction = 0.0;
                petal.acceleration = Vec2::from_angle(outward + std::f32::consts::FRAC_PI_3)
                    * (3.0 * PLAYER_ACCELERATION);
            }
            sim.ticks(10.0)
        }
        _ => return false,
    };
    entity_set_despawn_tick(sim, petal_id, despawn_after);
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
