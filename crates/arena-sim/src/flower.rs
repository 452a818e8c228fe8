//! Flower (player) behavior: loadout upkeep and petal orbits.
//!
//! Each tick a flower:
//!
//! 1. Resyncs its active slots with `loadout_ids`. A slot whose id changed
//!    (delete, swap) drops its petals and starts over.
//! 2. Runs reload timers and spawns petals whose reload completed. A petal
//!    that died since last tick restarts its slot's reload.
//! 3. Recomputes petal-granted stats: reflection, constant heal and orbit
//!    speed.
//! 4. Sets orbit acceleration for every petal still in orbit.

use std::f32::consts::TAU;

use arena_ecs::component::Component;
use arena_ecs::entity::EntityId;
use glam::Vec2;

use crate::consts::{ATTACK_ORBIT_RADIUS, BASE_ROTATION_SPEED, DEFEND_ORBIT_RADIUS, ORBIT_RADIUS};
use crate::damage::inflict_heal;
use crate::data::PetalId;
use crate::entity::{InputFlags, LoadoutSlot};
use crate::sim::Simulation;
use crate::spawn::alloc_petal;

/// Fraction of the gap to its orbit slot a petal closes per tick, as
/// acceleration.
const ORBIT_STIFFNESS: f32 = 0.5;

pub fn flower_system(sim: &mut Simulation) {
    for id in sim.ids_with(Component::Flower) {
        tick_flower(sim, id);
    }
}

pub fn tick_flower(sim: &mut Simulation, id: EntityId) {
    if !sim.ent_alive(id) {
        return;
    }
    let Some(player) = sim.get_mut(id) else {
        return;
    };
    let mut loadout = std::mem::take(&mut player.loadout);
    let loadout_ids = player.loadout_ids;
    let loadout_count = player.loadout_count;

    resync_loadout(sim, &mut loadout, &loadout_ids[..loadout_count]);
    reload_petals(sim, id, &mut loadout);
    apply_petal_stats(sim, id, &loadout);
    set_orbits(sim, id, &loadout);

    if let Some(player) = sim.get_mut(id) {
        player.loadout = loadout;
    }
    follow_with_camera(sim, id);
}

/// Make `loadout` match `ids` slot for slot, deleting petals of every slot
/// that changed or disappeared.
fn resync_loadout(sim: &mut Simulation, loadout: &mut Vec<LoadoutSlot>, ids: &[PetalId]) {
    for slot in loadout.iter().skip(ids.len()) {
        delete_slot_petals(sim, slot);
    }
    loadout.truncate(ids.len());
    for (i, &petal_id) in ids.iter().enumerate() {
        match loadout.get_mut(i) {
            Some(slot) if slot.petal_id == petal_id => {}
            Some(slot) => {
                delete_slot_petals(sim, slot);
                *slot = LoadoutSlot::new(petal_id);
            }
            None => loadout.push(LoadoutSlot::new(petal_id)),
        }
    }
}

fn delete_slot_petals(sim: &mut Simulation, slot: &LoadoutSlot) {
    for petal in &slot.petals {
        sim.request_delete(petal.ent_id);
    }
}

fn reload_petals(sim: &mut Simulation, owner: EntityId, loadout: &mut [LoadoutSlot]) {
    for slot in loadout.iter_mut() {
        let reload = sim.ticks(slot.petal_id.data().reload);
        for petal in slot.petals.iter_mut() {
            if sim.ent_alive(petal.ent_id) {
                continue;
            }
            if !petal.ent_id.is_null() {
                petal.ent_id = EntityId::NULL;
                petal.reload_ticks = 0;
            }
            if petal.reload_ticks < reload {
                petal.reload_ticks += 1;
                continue;
            }
            if let Ok(ent_id) = alloc_petal(sim, slot.petal_id, owner) {
                petal.ent_id = ent_id;
                petal.reload_ticks = 0;
                slot.already_spawned = true;
            }
        }
    }
}

/// Alive petals of `loadout` that are not despawning, in slot order.
fn orbiting_petals<'a>(
    sim: &'a Simulation,
    loadout: &'a [LoadoutSlot],
) -> impl Iterator<Item = (&'a LoadoutSlot, EntityId)> + 'a {
    loadout.iter().flat_map(move |slot| {
        slot.petals.iter().filter_map(move |petal| {
            let ent = sim.get(petal.ent_id)?;
            (sim.ent_alive(petal.ent_id) && !ent.is_despawning()).then_some((slot, petal.ent_id))
        })
    })
}

fn apply_petal_stats(sim: &mut Simulation, id: EntityId, loadout: &[LoadoutSlot]) {
    let tps = sim.config().tps as f32;
    let mut reflection = 0.0;
    let mut heal = 0.0;
    let mut rotation = BASE_ROTATION_SPEED;
    for slot in loadout {
        let attrs = &slot.petal_id.data().attributes;
        for petal in &slot.petals {
            if !sim.ent_alive(petal.ent_id) {
                continue;
            }
            reflection += attrs.damage_reflection;
            heal += attrs.constant_heal;
            rotation += attrs.rotation_bonus;
        }
    }
    if heal > 0.0 {
        inflict_heal(sim, id, heal / tps);
    }
    if let Some(player) = sim.get_mut(id) {
        player.damage_reflection = reflection;
        player.heading = (player.heading + rotation / tps) % TAU;
    }
}

/// Orbit radius for a petal given its owner's input.
pub fn orbit_radius(input: InputFlags, defend_only: bool) -> f32 {
    if input.attacking() && !defend_only {
        ATTACK_ORBIT_RADIUS
    } else if input.defending() {
        DEFEND_ORBIT_RADIUS
    } else {
        ORBIT_RADIUS
    }
}

fn set_orbits(sim: &mut Simulation, id: EntityId, loadout: &[LoadoutSlot]) {
    let Some(player) = sim.get(id) else {
        return;
    };
    let (center, heading, input) = (player.pos, player.heading, player.input);
    let orbit: Vec<_> = orbiting_petals(sim, loadout)
        .map(|(slot, ent_id)| {
            let defend_only = slot.petal_id.data().attributes.defend_only;
            (ent_id, orbit_radius(input, defend_only))
        })
        .collect();
    let spacing = TAU / orbit.len().max(1) as f32;
    for (k, (ent_id, radius)) in orbit.into_iter().enumerate() {
        let target = center + Vec2::from_angle(heading + k as f32 * spacing) * radius;
        if let Some(petal) = sim.get_mut(ent_id) {
            petal.acceleration = (target - petal.pos) * ORBIT_STIFFNESS;
        }
    }
}

fn follow_with_camera(sim: &mut Simulation, id: EntityId) {
    let Some(player) = sim.get(id) else {
        return;
    };
    let (camera_id, pos) = (player.parent, player.pos);
    if sim.has_component(camera_id, Component::Camera) {
        if let Some(camera) = sim.get_mut(camera_id) {
            camera.pos = pos;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
