//! Entity construction.
//!
//! Every `alloc_*` function returns the new id or [`EcsError::CapacityExhausted`]
//! when the store is full. Callers inside the tick treat exhaustion as "skip
//! this spawn"; it is logged here once.

use arena_ecs::component::Component;
use arena_ecs::entity::EntityId;
use arena_ecs::EcsError;
use glam::Vec2;
use rand::Rng;

use crate::consts::{
    BASE_BODY_DAMAGE, BASE_FLOWER_RADIUS, BASE_HEALTH, DEFAULT_FRICTION, MAX_SLOT_COUNT,
    STARTING_LOADOUT,
};
use crate::data::{
    hp_at_level, loadout_slots_at_level, score_to_level, MobAi, MobId, PetalId, ZoneDefinition,
    ZONES,
};
use crate::entity::{LoadoutSlot, Team};
use crate::sim::Simulation;

fn alloc_logged(sim: &mut Simulation, what: &'static str) -> Result<EntityId, EcsError> {
    sim.alloc().inspect_err(|err| {
        tracing::warn!(kind = what, error = %err, "entity allocation failed, spawn skipped");
    })
}

/// Random point inside `zone`.
pub fn random_point_in(sim: &mut Simulation, zone: &ZoneDefinition) -> Vec2 {
    let rng = sim.rng();
    let x = zone.x + rng.gen_range(-0.5f32..0.5) * zone.w;
    let y = zone.y + rng.gen_range(-0.5f32..0.5) * zone.h;
    Vec2::new(x, y)
}

/// A camera: the persistent per-client entity that owns the loadout between
/// lives.
pub fn alloc_camera(sim: &mut Simulation, team: Team) -> Result<EntityId, EcsError> {
    let id = alloc_logged(sim, "camera")?;
    sim.add_component(id, Component::Camera);
    sim.add_component(id, Component::Relations);
    for &petal_id in &STARTING_LOADOUT {
        sim.tracker_mut().add(petal_id);
    }
    if let Some(camera) = sim.get_mut(id) {
        camera.team = team;
        camera.pos = Vec2::new(ZONES[0].x, ZONES[0].y);
        camera.loadout_ids[..STARTING_LOADOUT.len()].copy_from_slice(&STARTING_LOADOUT);
        camera.loadout_count = STARTING_LOADOUT.len();
    }
    Ok(id)
}

/// A bare flower. [`player_spawn`] binds it to a camera.
pub fn alloc_player(sim: &mut Simulation, team: Team) -> Result<EntityId, EcsError> {
    let id = alloc_logged(sim, "player")?;
    for component in [
        Component::Physics,
        Component::Relations,
        Component::Health,
        Component::Flower,
    ] {
        sim.add_component(id, component);
    }
    if let Some(player) = sim.get_mut(id) {
        player.team = team;
        player.radius = BASE_FLOWER_RADIUS;
        player.mass = 1.0;
        player.friction = DEFAULT_FRICTION;
        player.health = BASE_HEALTH;
        player.max_health = BASE_HEALTH;
        player.damage = BASE_BODY_DAMAGE;
    }
    Ok(id)
}

/// Bind `player` to `camera`, copy the camera's loadout and score, scale
/// health to the player's level and drop it at a random point in the first
/// zone.
pub fn player_spawn(
    sim: &mut Simulation,
    camera_id: EntityId,
    player_id: EntityId,
) -> Result<(), EcsError> {
    let Some(camera) = sim.get(camera_id) else {
        return Err(EcsError::StaleEntity { entity: camera_id });
    };
    let (loadout_ids, camera_count, score, name) = (
        camera.loadout_ids,
        camera.loadout_count,
        camera.score,
        camera.name.clone(),
    );
    if !sim.ent_exists(player_id) {
        return Err(EcsError::StaleEntity { entity: player_id });
    }

    let pos = random_point_in(sim, &ZONES[0]);
    let level = score_to_level(score);
    let loadout_count = camera_count.max(loadout_slots_at_level(level)).min(MAX_SLOT_COUNT);

    if let Some(camera) = sim.get_mut(camera_id) {
        camera.player = player_id;
        camera.pos = pos;
    }
    if let Some(player) = sim.get_mut(player_id) {
        player.parent = camera_id;
        player.pos = pos;
        player.name = name;
        player.score = score;
        player.loadout_ids = loadout_ids;
        player.loadout_count = loadout_count;
        player.loadout = loadout_ids[..loadout_count]
            .iter()
            .map(|&petal_id| LoadoutSlot::new(petal_id))
            .collect();
        player.max_health = hp_at_level(level);
        player.health = player.max_health;
        tracing::info!(player = %player_id, name = %player.name, level, "player spawned");
    }
    Ok(())
}

/// A mob of type `mob_id` at `(x, y)`.
pub fn alloc_mob(
    sim: &mut Simulation,
    mob_id: MobId,
    x: f32,
    y: f32,
    team: Team,
) -> Result<EntityId, EcsError> {
    let id = alloc_logged(sim, "mob")?;
    for component in [
        Component::Physics,
        Component::Relations,
        Component::Health,
        Component::Mob,
    ] {
        sim.add_component(id, component);
    }
    let data = mob_id.data();
    let slow_inflict = sim.ticks(data.slow_inflict);
    let angle = sim.rng().gen_range(0.0..std::f32::consts::TAU);
    if let Some(mob) = sim.get_mut(id) {
        mob.mob_id = mob_id;
        mob.team = team;
        mob.pos = Vec2::new(x, y);
        mob.angle = angle;
        mob.radius = data.radius;
        mob.mass = match data.ai {
            MobAi::Static => 0.0,
            _ => data.radius / 10.0,
        };
        mob.friction = DEFAULT_FRICTION;
        mob.health = data.health;
        mob.max_health = data.health;
        mob.armor = data.armor;
        mob.damage = data.damage;
        mob.poison_damage = data.poison_damage;
        mob.slow_inflict = slow_inflict;
    }
    Ok(id)
}

/// A petal of type `petal_id` orbiting `owner`.
///
/// The petal inherits the owner's team, and damage reflected at it lands on
/// the owner.
pub fn alloc_petal(
    sim: &mut Simulation,
    petal_id: PetalId,
    owner_id: EntityId,
) -> Result<EntityId, EcsError> {
    let Some(owner) = sim.get(owner_id) else {
        return Err(EcsError::StaleEntity { entity: owner_id });
    };
    let (owner_pos, team) = (owner.pos, owner.team);

    let id = alloc_logged(sim, "petal")?;
    for component in [
        Component::Physics,
        Component::Relations,
        Component::Health,
        Component::Petal,
    ] {
        sim.add_component(id, component);
    }
    let data = petal_id.data();
    let attrs = &data.attributes;
    let slow_inflict = sim.ticks(attrs.slow_inflict);
    if let Some(petal) = sim.get_mut(id) {
        petal.petal_id = petal_id;
        petal.parent = owner_id;
        petal.base_entity = owner_id;
        petal.team = team;
        petal.pos = owner_pos;
        petal.radius = data.radius;
        petal.mass = 0.1;
        petal.friction = 0.4;
        petal.health = data.health;
        petal.max_health = data.health;
        petal.damage = data.damage;
        petal.armor = attrs.armor;
        petal.poison_damage = attrs.poison_damage;
        petal.slow_inflict = slow_inflict;
    }
    Ok(id)
}

/// Start the despawn countdown on `id`.
pub fn entity_set_despawn_tick(sim: &mut Simulation, id: EntityId, ticks: u32) {
    if let Some(ent) = sim.get_mut(id) {
        ent.set_despawn_tick(ticks);
    }
}

/// Spawn one weighted-random mob from `zone` at a random point inside it.
pub fn spawn_zone_mob(sim: &mut Simulation, zone: &ZoneDefinition) -> Result<EntityId, EcsError> {
    let total = zone.total_weight();
    let roll = sim.rng().gen_range(0..total.max(1));
    let mob_id = zone.pick(roll).unwrap_or_default();
    let pos = random_point_in(sim, zone);
    alloc_mob(sim, mob_id, pos.x, pos.y, Team::MOBS)
}

/// Top up every zone to its mob density.
///
/// A zone's quota is `max_mobs_per_zone * density`; only live mobs on the
/// mob team standing inside the zone count toward it. At most one mob is
/// added per zone per tick.
pub fn zone_spawn_system(sim: &mut Simulation) {
    if !sim.config().mob_spawning {
        return;
    }
    let max_mobs = sim.config().max_mobs_per_zone as f32;
    for zone in &ZONES {
        let quota = (max_mobs * zone.density) as usize;
        let count = sim
            .ids_with(Component::Mob)
            .into_iter()
            .filter(|&id| sim.ent_alive(id))
            .filter_map(|id| sim.get(id))
            .filter(|mob| mob.team == Team::MOBS && zone.contains(mob.pos.x, mob.pos.y))
            .count();
        if count < quota {
            // Exhaustion is already logged by the allocator.
            let _ = spawn_zone_mob(sim, zone);
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

    fn sim(max_entities: usize) -> Simulation {
        Simulation::new(SimConfig {
            max_entities,
            mob_spawning: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn camera_starts_with_basic_loadout() {
        let mut sim = sim(16);
        let camera = alloc_camera(&mut sim, Team(1)).unwrap();
        let ent = sim.get(camera).unwrap();
        assert_eq!(ent.loadout_count, 5);
        assert_eq!(&ent.loadout_ids[..5], &[PetalId::Basic; 5]);
        assert_eq!(ent.loadout_ids[5], PetalId::None);
        assert_eq!(sim.tracker().count(PetalId::Basic), 5);
    }

    #[test]
    fn player_spawn_links_camera_and_player() {
        let mut sim = sim(16);
        let camera = alloc_camera(&mut sim, Team(1)).unwrap();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        player_spawn(&mut sim, camera, player).unwrap();

        assert_eq!(sim.get(camera).unwrap().player, player);
        let ent = sim.get(player).unwrap();
        assert_eq!(ent.parent, camera);
        assert_eq!(ent.loadout.len(), 5);
        assert_eq!(ent.health, BASE_HEALTH);
        assert!(ZONES[0].contains(ent.pos.x, ent.pos.y));
        assert!(sim.has_component(player, Component::Flower));
    }

    #[test]
    fn player_spawn_rejects_stale_camera() {
        let mut sim = sim(16);
        let camera = alloc_camera(&mut sim, Team(1)).unwrap();
        let player = alloc_player(&mut sim, Team(1)).unwrap();
        sim.request_delete(camera);
        sim.reclaim();
        let err = player_spawn(&mut sim, camera, player).unwrap_err();
        assert!(matches!(err, EcsError::StaleEntity { entity } if entity == camera));
    }

    #[test]
    fn mob_takes_table_stats() {
        let mut sim = sim(16);
        let hole = alloc_mob(&mut sim, MobId::AntHole, 10.0, 20.0, Team::MOBS).unwrap();
        let ent = sim.get(hole).unwrap();
        assert_eq!(ent.max_health, 500.0);
        assert_eq!(ent.armor, 5.0);
        assert_eq!(ent.mass, 0.0);
        assert_eq!(ent.pos, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn petal_reflects_onto_owner() {
        let mut sim = sim(16);
        let player = alloc_player(&mut sim, Team(3)).unwrap();
        let petal = alloc_petal(&mut sim, PetalId::Web, player).unwrap();
        let ent = sim.get(petal).unwrap();
        assert_eq!(ent.base_entity, player);
        assert_eq!(ent.team, Team(3));
        assert_eq!(ent.slow_inflict, sim.ticks(1.0));
    }

    #[test]
    fn capacity_exhaustion_is_an_error_not_a_panic() {
        let mut sim = sim(1);
        alloc_mob(&mut sim, MobId::Rock, 0.0, 0.0, Team::MOBS).unwrap();
        let err = alloc_mob(&mut sim, MobId::Rock, 0.0, 0.0, Team::MOBS).unwrap_err();
        assert!(matches!(err, EcsError::CapacityExhausted { capacity: 1 }));
    }

    #[test]
    fn zone_mob_spawns_inside_zone() {
        let mut sim = sim(16);
        for zone in &ZONES {
            let id = spawn_zone_mob(&mut sim, zone).unwrap();
            let ent = sim.get(id).unwrap();
            assert!(zone.contains(ent.pos.x, ent.pos.y));
            assert_eq!(ent.team, Team::MOBS);
        }
    }

    #[test]
    fn zone_spawner_respects_switch_and_quota() {
        let mut sim = sim(256);
        zone_spawn_system(&mut sim);
        assert_eq!(sim.entity_count(), 0);

        let mut sim = Simulation::new(SimConfig {
            max_entities: 256,
            mob_spawning: true,
            max_mobs_per_zone: 2,
            ..Default::default()
        })
        .unwrap();
        for _ in 0..20 {
            zone_spawn_system(&mut sim);
        }
        for zone in &ZONES {
            let quota = (2.0 * zone.density) as usize;
            let inside = sim
                .ids_with(Component::Mob)
                .into_iter()
                .filter(|&id| {
                    let pos = sim.get(id).unwrap().pos;
                    zone.contains(pos.x, pos.y)
                })
                .count();
            assert_eq!(inside, quota);
        }
    }

    #[test]
    fn despawn_tick_sets_flag() {
        let mut sim = sim(4);
        let rock = alloc_mob(&mut sim, MobId::Rock, 0.0, 0.0, Team::MOBS).unwrap();
        entity_set_despawn_tick(&mut sim, rock, 7);
        let ent = sim.get(rock).unwrap();
        assert!(ent.is_despawning());
        assert_eq!(ent.despawn_tick, 7);
    }
}
