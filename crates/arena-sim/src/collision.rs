//! Circle collision: separation and contact damage.
//!
//! Candidates come from the spatial index with a reach of the entity's own
//! radius plus the largest radius in play, so no overlapping pair is missed.
//! Each unordered pair is resolved once, from its lower slot index.

use arena_ecs::component::Component;
use arena_ecs::entity::EntityId;
use glam::Vec2;

use crate::damage::{inflict_damage, DamageType};
use crate::sim::Simulation;

pub fn collision_system(sim: &mut Simulation) {
    let ids = sim.ids_with(Component::Physics);
    let max_radius = ids
        .iter()
        .filter_map(|&id| sim.get(id))
        .map(|ent| ent.radius)
        .fold(0.0, f32::max);

    for &id in &ids {
        let Some(ent) = sim.get(id).filter(|_| sim.ent_alive(id)) else {
            continue;
        };
        let (pos, reach) = (ent.pos, ent.radius + max_radius);
        for other in sim.query_ids(pos.x, pos.y, reach, reach) {
            if other.index() <= id.index() {
                continue;
            }
            if !sim.ent_alive(id) {
                break;
            }
            if sim.ent_alive(other) && can_collide(sim, id, other) {
                resolve_pair(sim, id, other);
            }
        }
    }
}

/// Petals pass through everything on their own team, owner included.
pub fn can_collide(sim: &Simulation, a: EntityId, b: EntityId) -> bool {
    let (Some(ea), Some(eb)) = (sim.get(a), sim.get(b)) else {
        return false;
    };
    let petal_involved =
        sim.has_component(a, Component::Petal) || sim.has_component(b, Component::Petal);
    !(petal_involved && ea.team == eb.team)
}

fn inverse_mass(mass: f32) -> f32 {
    if mass > 0.0 {
        1.0 / mass
    } else {
        0.0
    }
}

/// Push `a` and `b` apart by their overlap, weighted by inverse mass, and
/// trade contact damage if they are enemies.
fn resolve_pair(sim: &mut Simulation, a: EntityId, b: EntityId) {
    let (Some(ea), Some(eb)) = (sim.get(a), sim.get(b)) else {
        return;
    };
    let delta = eb.pos - ea.pos;
    let dist = delta.length();
    let overlap = ea.radius + eb.radius - dist;
    if overlap <= 0.0 {
        return;
    }
    let normal = if dist > 0.0 { delta / dist } else { Vec2::X };
    let (inv_a, inv_b) = (inverse_mass(ea.mass), inverse_mass(eb.mass));
    let enemies = ea.team != eb.team
        && sim.has_component(a, Component::Health)
        && sim.has_component(b, Component::Health);
    let (damage_a, damage_b) = (ea.damage, eb.damage);

    let total = inv_a + inv_b;
    if total > 0.0 {
        let push = normal * overlap;
        if let Some(ea) = sim.get_mut(a) {
            ea.pos -= push * (inv_a / total);
        }
        if let Some(eb) = sim.get_mut(b) {
            eb.pos += push * (inv_b / total);
        }
    }

    if enemies {
        inflict_damage(sim, a, b, damage_a, DamageType::Contact);
        inflict_damage(sim, b, a, damage_b, DamageType::Contact);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
